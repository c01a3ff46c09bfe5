//! Application router configuration.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    profile::get_profile_endpoint,
    transaction::create_transaction_endpoint,
    user::create_user_endpoint,
    wallet::{create_wallet_endpoint, get_wallet_endpoint, list_wallets_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(
            endpoints::WALLETS,
            post(create_wallet_endpoint).get(list_wallets_endpoint),
        )
        .route(endpoints::WALLET, get(get_wallet_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::PROFILE, get(get_profile_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no route for {}", uri.path()) })),
    )
        .into_response()
}
