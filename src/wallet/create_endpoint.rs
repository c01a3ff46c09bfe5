//! Defines the endpoint for creating a new wallet.

use axum::{
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    Database, Error, UserID, endpoints,
    validation::{ApiJson, require},
    wallet::{NewWallet, WalletName, create_wallet},
};

/// The request body for creating a wallet.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletForm {
    /// The id of the user who will own the wallet.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// The wallet name.
    #[serde(default)]
    pub name: String,
}

/// A route handler for creating a new wallet, responds with the created wallet.
pub async fn create_wallet_endpoint(
    State(database): State<Database>,
    ApiJson(form): ApiJson<WalletForm>,
) -> Result<Response, Error> {
    let new_wallet = NewWallet {
        user_id: UserID::new(require("user_id", form.user_id)?),
        name: WalletName::new(&form.name)?,
    };

    let wallet = database
        .run(move |connection| create_wallet(new_wallet, connection))
        .await?;

    let location = endpoints::format_endpoint(endpoints::WALLET, wallet.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], ApiJson(wallet)).into_response())
}
