//! Defines the core data models and database queries for wallets.

use std::fmt::Display;

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Money, UserID,
    transaction::{Transaction as LedgerEntry, get_transactions_for_wallet},
    user::get_user_by_id,
    validation::{ValidationError, validate_required_text},
};

/// Database identifier for a wallet.
pub type WalletId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-empty wallet name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct WalletName(String);

impl WalletName {
    /// Create a wallet name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] on the field "name" if the name is blank
    /// or longer than 255 characters.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_required_text("name", name).map(Self)
    }

    /// Create a wallet name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for WalletName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for WalletName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named container of money owned by a user.
///
/// `balance` always equals the sum of the signed amounts of the wallet's
/// transactions, income counting as positive and expenses as negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// The id for the wallet.
    pub id: WalletId,
    /// The user who owns the wallet.
    pub user_id: UserID,
    /// The name of the wallet.
    pub name: WalletName,
    /// The running balance, which may be negative.
    pub balance: Money,
    /// When the wallet was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the balance was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated input for [create_wallet].
#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    /// The user who will own the wallet.
    pub user_id: UserID,
    /// The name of the wallet.
    pub name: WalletName,
}

/// A wallet together with every transaction recorded against it.
///
/// Serialized as the wallet's own fields plus a `transactions` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WalletWithHistoryFields", into = "WalletWithHistoryFields")]
pub struct WalletWithHistory {
    /// The wallet, including its current balance.
    pub wallet: Wallet,
    /// The wallet's transactions in the order they were recorded.
    pub transactions: Vec<LedgerEntry>,
}

/// The JSON layout of [WalletWithHistory].
#[derive(Serialize, Deserialize)]
struct WalletWithHistoryFields {
    id: WalletId,
    user_id: UserID,
    name: WalletName,
    balance: Money,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    transactions: Vec<LedgerEntry>,
}

impl From<WalletWithHistoryFields> for WalletWithHistory {
    fn from(fields: WalletWithHistoryFields) -> Self {
        Self {
            wallet: Wallet {
                id: fields.id,
                user_id: fields.user_id,
                name: fields.name,
                balance: fields.balance,
                created_at: fields.created_at,
                updated_at: fields.updated_at,
            },
            transactions: fields.transactions,
        }
    }
}

impl From<WalletWithHistory> for WalletWithHistoryFields {
    fn from(history: WalletWithHistory) -> Self {
        let WalletWithHistory {
            wallet,
            transactions,
        } = history;

        Self {
            id: wallet.id,
            user_id: wallet.user_id,
            name: wallet.name,
            balance: wallet.balance,
            created_at: wallet.created_at,
            updated_at: wallet.updated_at,
            transactions,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the wallet table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_wallet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS wallet (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            balance INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_wallet_user ON wallet(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Wallet].
pub fn map_row_to_wallet(row: &Row) -> Result<Wallet, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = WalletName::new_unchecked(&row.get::<_, String>(2)?);
    let balance = row.get(3)?;
    let created_at = row.get(4)?;
    let updated_at = row.get(5)?;

    Ok(Wallet {
        id,
        user_id,
        name,
        balance,
        created_at,
        updated_at,
    })
}

/// Create a new, empty wallet for a user.
///
/// The balance of a new wallet is always exactly zero.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to an existing user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_wallet(new_wallet: NewWallet, connection: &Connection) -> Result<Wallet, Error> {
    let now = OffsetDateTime::now_utc();

    let wallet = connection
        .prepare(
            "INSERT INTO wallet (user_id, name, balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             RETURNING id, user_id, name, balance, created_at, updated_at",
        )?
        .query_row(
            (
                new_wallet.user_id.as_i64(),
                new_wallet.name.as_ref(),
                Money::ZERO,
                now,
            ),
            map_row_to_wallet,
        )?;

    tracing::info!(
        "created wallet {} \"{}\" for user {}",
        wallet.id,
        wallet.name,
        wallet.user_id
    );

    Ok(wallet)
}

/// Retrieve a wallet from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid wallet,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_wallet(id: WalletId, connection: &Connection) -> Result<Wallet, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, created_at, updated_at FROM wallet WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_wallet)
        .map_err(|error| error.into())
}

/// Retrieve the wallets owned by `user_id`, oldest first.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to an existing user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_wallets_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Wallet>, Error> {
    // Distinguish "no such user" from "user without wallets".
    get_user_by_id(user_id, connection)?;

    select_wallets_for_user(user_id, connection)
}

pub(crate) fn select_wallets_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Wallet>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, created_at, updated_at
             FROM wallet WHERE user_id = :user_id ORDER BY id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_wallet)?
        .map(|maybe_wallet| maybe_wallet.map_err(Error::from))
        .collect()
}

/// Retrieve a wallet and its full transaction history.
///
/// Both are read in one transaction, so the balance always matches the
/// returned history even while other sessions record transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid wallet,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_wallet_with_history(
    id: WalletId,
    connection: &Connection,
) -> Result<WalletWithHistory, Error> {
    let snapshot = Transaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let wallet = get_wallet(id, &snapshot)?;
    let transactions = get_transactions_for_wallet(id, &snapshot)?;

    snapshot.commit()?;

    Ok(WalletWithHistory {
        wallet,
        transactions,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_wallet_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_wallet_table(&connection));
    }
}
