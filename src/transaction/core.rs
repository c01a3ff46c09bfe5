//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Money, MoneyError,
    validation::{ValidationError, validate_optional_text},
    wallet::WalletId,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds money to or removes money from a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, increases the wallet balance.
    Income,
    /// Money spent, decreases the wallet balance.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in requests, responses and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The change to a wallet balance caused by a transaction of this type.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => Money::from_cents(-amount.cents()),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::new(
                "type",
                "the type field must be either \"income\" or \"expense\"",
            )),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense recorded against a wallet.
///
/// Transactions are immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The wallet the transaction was recorded against.
    pub wallet_id: WalletId,
    /// Whether money came in or went out.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money, always greater than zero.
    pub amount: Money,
    /// An optional note about what the transaction was for.
    pub description: Option<String>,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated transaction that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The wallet to record the transaction against.
    pub wallet_id: WalletId,
    /// Whether money came in or went out.
    pub transaction_type: TransactionType,
    /// The amount of money, always greater than zero.
    pub amount: Money,
    /// An optional, trimmed, non-empty description.
    pub description: Option<String>,
}

impl NewTransaction {
    /// Validate the parts of a new transaction.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] on the field "amount" if `amount` is not
    /// positive, has fractions of a cent or is too large, and on the field
    /// "description" if the description is too long.
    pub fn new(
        wallet_id: WalletId,
        transaction_type: TransactionType,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let amount = Money::from_decimal(amount).map_err(|error| match error {
            MoneyError::TooPrecise => ValidationError::new(
                "amount",
                "the amount field must not have more than two decimal places",
            ),
            MoneyError::OutOfRange => {
                ValidationError::new("amount", format!("the amount field is invalid: {error}"))
            }
        })?;

        if !amount.is_positive() {
            return Err(ValidationError::new(
                "amount",
                "the amount field must be at least 0.01",
            ));
        }

        Ok(Self {
            wallet_id,
            transaction_type,
            amount,
            description: validate_optional_text("description", description)?,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount INTEGER NOT NULL CHECK (amount > 0),
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // History is always read per wallet in insertion order.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_wallet ON \"transaction\"(wallet_id, id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        wallet_id: row.get(1)?,
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Retrieve the transactions for a wallet in the order they were recorded.
///
/// An unknown wallet has no transactions, so this returns an empty list
/// rather than an error.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_wallet(
    wallet_id: WalletId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, wallet_id, type, amount, description, created_at
             FROM \"transaction\" WHERE wallet_id = :wallet_id ORDER BY id ASC",
        )?
        .query_map(&[(":wallet_id", &wallet_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the number of transactions recorded against a wallet.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_transactions_for_wallet(
    wallet_id: WalletId,
    connection: &Connection,
) -> Result<usize, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE wallet_id = ?1",
        [wallet_id],
        |row| row.get(0),
    )?;

    Ok(count as usize)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod new_transaction_tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::{
        Money,
        transaction::{NewTransaction, TransactionType},
    };

    fn decimal(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn accepts_positive_amount() {
        let got = NewTransaction::new(1, TransactionType::Income, decimal("12.50"), Some(" Pay "))
            .unwrap();

        assert_eq!(got.amount, Money::from_cents(1250));
        assert_eq!(got.description.as_deref(), Some("Pay"));
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        for amount in ["0", "0.00", "-5"] {
            let error =
                NewTransaction::new(1, TransactionType::Expense, decimal(amount), None).unwrap_err();

            assert_eq!(error.field, "amount", "amount {amount} should be rejected");
        }
    }

    #[test]
    fn rejects_fractions_of_a_cent() {
        let error = NewTransaction::new(1, TransactionType::Income, decimal("0.001"), None)
            .unwrap_err();

        assert_eq!(error.field, "amount");
    }

    #[test]
    fn blank_description_is_absent() {
        let got =
            NewTransaction::new(1, TransactionType::Income, decimal("1"), Some("   ")).unwrap();

        assert_eq!(got.description, None);
    }

    #[test]
    fn rejects_overlong_description() {
        let description = "a".repeat(256);

        let error =
            NewTransaction::new(1, TransactionType::Income, decimal("1"), Some(&description))
                .unwrap_err();

        assert_eq!(error.field, "description");
    }

    #[test]
    fn parses_transaction_type() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
        assert_eq!(
            "transfer".parse::<TransactionType>().unwrap_err().field,
            "type"
        );
    }

    #[test]
    fn expense_is_signed_negative() {
        let amount = Money::from_cents(200);

        assert_eq!(TransactionType::Income.signed(amount), amount);
        assert_eq!(
            TransactionType::Expense.signed(amount),
            Money::from_cents(-200)
        );
    }
}
