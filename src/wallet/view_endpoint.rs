//! Defines the endpoint for viewing a wallet and its transaction history.

use axum::extract::State;

use crate::{
    Database, Error,
    validation::{ApiJson, ApiPath},
    wallet::{WalletId, WalletWithHistory, get_wallet_with_history},
};

/// A route handler that responds with a wallet and all of its transactions.
pub async fn get_wallet_endpoint(
    State(database): State<Database>,
    ApiPath(wallet_id): ApiPath<WalletId>,
) -> Result<ApiJson<WalletWithHistory>, Error> {
    database
        .run(move |connection| get_wallet_with_history(wallet_id, connection))
        .await
        .map(ApiJson)
}
