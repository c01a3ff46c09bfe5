//! Transactions are the only way money moves in or out of a wallet.
//!
//! This module contains:
//! - The `Transaction` model and the validated `NewTransaction` input
//! - [record_transaction], which appends a transaction and updates the wallet
//!   balance as one unit of work
//! - The endpoint for recording transactions over HTTP

mod core;
mod create_endpoint;
mod record;

pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionType, count_transactions_for_wallet,
    create_transaction_table, get_transactions_for_wallet, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use record::record_transaction;
