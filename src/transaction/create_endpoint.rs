//! Defines the endpoint for recording a new transaction.

use axum::{
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    Database, Error, endpoints,
    money::DecimalInput,
    transaction::{NewTransaction, TransactionType, record_transaction},
    validation::{ApiJson, require},
};

/// The request body for recording a transaction.
///
/// Every field is optional here so that a missing field is reported against
/// its own name instead of as a malformed body.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The wallet to record the transaction against.
    #[serde(default)]
    pub wallet_id: Option<i64>,
    /// Either "income" or "expense".
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    /// The amount as a decimal number, e.g. `12.50`.
    #[serde(default)]
    pub amount: Option<DecimalInput>,
    /// An optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for recording a transaction, responds with the recorded
/// transaction.
///
/// The `Location` header points at the wallet, whose balance now includes the
/// transaction.
pub async fn create_transaction_endpoint(
    State(database): State<Database>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    let wallet_id = require("wallet_id", form.wallet_id)?;
    let transaction_type: TransactionType = require("type", form.transaction_type)?.parse()?;
    let amount = require("amount", form.amount)?;

    let new_transaction = NewTransaction::new(
        wallet_id,
        transaction_type,
        amount.0,
        form.description.as_deref(),
    )?;

    let transaction = database
        .run(move |connection| record_transaction(new_transaction, connection))
        .await?;

    let location = endpoints::format_endpoint(endpoints::WALLET, transaction.wallet_id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], ApiJson(transaction)).into_response())
}
