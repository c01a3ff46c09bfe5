//! A small personal finance service for tracking money across wallets.
//!
//! Clients create users, open wallets for a user, record income and expense
//! transactions against a wallet and view a profile that totals the user's
//! wallet balances.
//!
//! This library provides a JSON REST API. Every balance change goes through
//! [record_transaction], which appends the transaction and updates the
//! wallet's running balance in a single SQLite transaction.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::{StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod logging;
mod money;
mod password;
mod profile;
mod routing;
mod transaction;
mod user;
mod validation;
mod wallet;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::{DEFAULT_BUSY_TIMEOUT, Database, configure_connection, initialize as initialize_db};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{Money, MoneyError};
pub use password::PasswordHash;
pub use profile::{ProfileSummary, get_profile_summary};
pub use routing::build_router;
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionType, count_transactions_for_wallet,
    record_transaction,
};
pub use user::{Email, NewUser, User, UserID, UserName, count_users, create_user, get_user_by_id};
pub use validation::ValidationError;
pub use wallet::{
    NewWallet, Wallet, WalletId, WalletName, WalletWithHistory, create_wallet, get_wallet,
    get_wallet_with_history, get_wallets_for_user,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent malformed, missing or out-of-range input.
    ///
    /// Nothing has been written to the database when this error is returned.
    #[error("invalid input: {0}")]
    Validation(ValidationError),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows or when
    /// an insert refers to a row that does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A user with the same email address already exists.
    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// The database stayed locked by another writer for longer than the busy
    /// timeout.
    ///
    /// The unit of work was rolled back and the client may retry.
    #[error("the database is busy, try again later")]
    DatabaseBusy,

    /// Applying a transaction would overflow the wallet balance.
    #[error("the wallet balance is out of range")]
    BalanceOverflow,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A blocking database task panicked or was cancelled.
    #[error("a database task failed: {0}")]
    TaskFailed(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::Validation(value)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked,
                    extended_code: _,
                },
                _,
            ) => {
                tracing::warn!("the database stayed locked for longer than the busy timeout");
                Error::DatabaseBusy
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": error.message,
                    "field": error.field,
                })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            Error::DatabaseBusy => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(RETRY_AFTER, "1")],
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
