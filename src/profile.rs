//! The profile summary: a user, their wallets and the total of the balances.

use axum::extract::State;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::{
    Database, Error, Money, User, UserID, Wallet,
    user::get_user_by_id,
    validation::{ApiJson, ApiPath},
    wallet::select_wallets_for_user,
};

/// A user together with their wallets and the sum of all wallet balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// The user the profile belongs to.
    pub user: User,
    /// Every wallet owned by the user, oldest first.
    pub wallets: Vec<Wallet>,
    /// The sum of the balances of `wallets`.
    pub total_balance: Money,
}

/// Build the profile summary for `user_id`.
///
/// The user and wallets are read in one transaction so the total always
/// matches the listed balances.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to an existing user,
/// - [Error::BalanceOverflow] if the total does not fit,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_profile_summary(
    user_id: UserID,
    connection: &Connection,
) -> Result<ProfileSummary, Error> {
    let snapshot = Transaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let user = get_user_by_id(user_id, &snapshot)?;
    let wallets = select_wallets_for_user(user_id, &snapshot)?;

    snapshot.commit()?;

    let total_balance = wallets
        .iter()
        .try_fold(Money::ZERO, |total, wallet| total.checked_add(wallet.balance))
        .ok_or(Error::BalanceOverflow)?;

    Ok(ProfileSummary {
        user,
        wallets,
        total_balance,
    })
}

/// A route handler that responds with a user's profile summary.
pub async fn get_profile_endpoint(
    State(database): State<Database>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<ApiJson<ProfileSummary>, Error> {
    let user_id = UserID::new(user_id);

    database
        .run(move |connection| get_profile_summary(user_id, connection))
        .await
        .map(ApiJson)
}

#[cfg(test)]
mod profile_summary_tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::{
        Error, Money, NewTransaction, TransactionType, UserID, record_transaction,
        test_utils::{create_test_user, create_test_wallet, get_test_connection},
    };

    use super::get_profile_summary;

    fn deposit(wallet_id: i64, amount: &str, connection: &mut rusqlite::Connection) {
        let new_transaction = NewTransaction::new(
            wallet_id,
            TransactionType::Income,
            Decimal::from_str(amount).unwrap(),
            None,
        )
        .unwrap();

        record_transaction(new_transaction, connection).unwrap();
    }

    #[test]
    fn totals_wallet_balances() {
        let mut conn = get_test_connection();
        let user = create_test_user(&conn);
        let first = create_test_wallet(user.id, &conn);
        let second = create_test_wallet(user.id, &conn);
        deposit(first.id, "500", &mut conn);
        deposit(second.id, "300", &mut conn);

        let summary = get_profile_summary(user.id, &conn).unwrap();

        assert_eq!(summary.user, user);
        assert_eq!(summary.wallets.len(), 2);
        assert_eq!(summary.total_balance, Money::from_cents(80_000));
    }

    #[test]
    fn user_without_wallets_has_zero_total() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let summary = get_profile_summary(user.id, &conn).unwrap();

        assert!(summary.wallets.is_empty());
        assert_eq!(summary.total_balance, Money::ZERO);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(
            get_profile_summary(UserID::new(42), &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        for _ in 0..2 {
            let wallet = create_test_wallet(user.id, &conn);
            conn.execute(
                "UPDATE wallet SET balance = ?1 WHERE id = ?2",
                (i64::MAX, wallet.id),
            )
            .unwrap();
        }

        assert_eq!(
            get_profile_summary(user.id, &conn),
            Err(Error::BalanceOverflow)
        );
    }
}

#[cfg(test)]
mod profile_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        Money,
        profile::ProfileSummary,
        test_utils::{get_test_server, post_test_user, post_test_wallet},
    };

    #[tokio::test]
    async fn returns_profile_with_total() {
        let (server, _dir) = get_test_server();
        let user = post_test_user(&server, "test@example.com").await;
        for (name, amount) in [("Wallet 1", 500), ("Wallet 2", 300)] {
            let wallet = post_test_wallet(&server, user.id, name).await;
            server
                .post("/transactions")
                .json(&json!({ "wallet_id": wallet.id, "type": "income", "amount": amount }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get(&format!("/profile/{}", user.id)).await;

        response.assert_status_ok();
        let summary = response.json::<ProfileSummary>();
        assert_eq!(summary.user, user);
        assert_eq!(summary.wallets.len(), 2);
        assert_eq!(summary.total_balance, Money::from_cents(80_000));
        assert!(
            response.text().contains("\"total_balance\":800.00"),
            "got {}",
            response.text()
        );
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (server, _dir) = get_test_server();

        let response = server.get("/profile/42").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
