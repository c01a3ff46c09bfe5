#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

use crate::{
    AppState, DEFAULT_BUSY_TIMEOUT, Database, NewUser, NewWallet, PasswordHash, User, UserID,
    Wallet, WalletName, build_router, configure_connection, create_user, create_wallet,
    initialize_db,
};

/// An in-memory database with the application schema and foreign keys enabled.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory database");
    configure_connection(&conn, DEFAULT_BUSY_TIMEOUT).expect("Could not configure connection");
    initialize_db(&conn).expect("Could not initialize database");
    conn
}

#[track_caller]
pub(crate) fn create_user_with_email(email: &str, conn: &Connection) -> User {
    let new_user = NewUser::new("Test User", email).expect("Could not validate test user");

    create_user(new_user, PasswordHash::MIN_COST, conn).expect("Could not create test user")
}

#[track_caller]
pub(crate) fn create_test_user(conn: &Connection) -> User {
    create_user_with_email("test@example.com", conn)
}

#[track_caller]
pub(crate) fn create_test_wallet(user_id: UserID, conn: &Connection) -> Wallet {
    let new_wallet = NewWallet {
        user_id,
        name: WalletName::new_unchecked("Test Wallet"),
    };

    create_wallet(new_wallet, conn).expect("Could not create test wallet")
}

/// A test server backed by a database file in a temporary directory.
///
/// The directory is deleted when the returned [TempDir] is dropped, so keep it
/// alive for as long as the server is used.
pub(crate) fn get_test_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().expect("Could not create temporary directory");
    let database = Database::open(dir.path().join("test.db"), DEFAULT_BUSY_TIMEOUT)
        .expect("Could not open test database");
    let state = AppState::new(database).with_password_hash_cost(PasswordHash::MIN_COST);
    let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

    (server, dir)
}

pub(crate) async fn post_test_user(server: &TestServer, email: &str) -> User {
    let response = server
        .post("/users")
        .json(&json!({ "name": "Test User", "email": email }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<User>()
}

pub(crate) async fn post_test_wallet(server: &TestServer, user_id: UserID, name: &str) -> Wallet {
    let response = server
        .post("/wallets")
        .json(&json!({ "user_id": user_id, "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Wallet>()
}
