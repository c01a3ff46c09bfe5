//! Recording a transaction against a wallet.

use rusqlite::{Connection, TransactionBehavior};
use time::OffsetDateTime;

use crate::{
    Error, Money,
    transaction::{NewTransaction, Transaction, map_transaction_row},
};

/// Append `new_transaction` to its wallet and apply it to the wallet balance.
///
/// The balance read, the insert and the balance update happen inside one
/// `BEGIN IMMEDIATE` transaction, which holds SQLite's write lock from the
/// start. Concurrent callers therefore apply their changes one after another
/// and no update is lost. If any step fails, nothing is written.
///
/// The write lock covers the whole database, not one wallet row, so writers
/// to different wallets also wait for each other for the length of one call.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the wallet does not exist,
/// - [Error::BalanceOverflow] if the new balance does not fit,
/// - [Error::DatabaseBusy] if the write lock could not be taken within the
///   connection's busy timeout,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_transaction(
    new_transaction: NewTransaction,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let balance: Money = tx.query_row(
        "SELECT balance FROM wallet WHERE id = ?1",
        [new_transaction.wallet_id],
        |row| row.get(0),
    )?;

    let new_balance = balance
        .checked_add(
            new_transaction
                .transaction_type
                .signed(new_transaction.amount),
        )
        .ok_or_else(|| {
            tracing::warn!(
                "rejected {} of {} for wallet {}: balance would overflow",
                new_transaction.transaction_type,
                new_transaction.amount,
                new_transaction.wallet_id
            );
            Error::BalanceOverflow
        })?;

    let now = OffsetDateTime::now_utc();

    let transaction = tx
        .prepare(
            "INSERT INTO \"transaction\" (wallet_id, type, amount, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, wallet_id, type, amount, description, created_at",
        )?
        .query_row(
            (
                new_transaction.wallet_id,
                new_transaction.transaction_type,
                new_transaction.amount,
                new_transaction.description.as_deref(),
                now,
            ),
            map_transaction_row,
        )?;

    tx.execute(
        "UPDATE wallet SET balance = ?1, updated_at = ?2 WHERE id = ?3",
        (new_balance, now, new_transaction.wallet_id),
    )?;

    tx.commit()?;

    tracing::info!(
        "recorded {} {} of {} for wallet {}, balance {} -> {}",
        transaction.transaction_type,
        transaction.id,
        transaction.amount,
        transaction.wallet_id,
        balance,
        new_balance
    );

    Ok(transaction)
}
