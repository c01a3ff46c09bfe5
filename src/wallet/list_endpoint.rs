//! Defines the endpoint for listing a user's wallets.

use axum::extract::State;
use serde::Deserialize;

use crate::{
    Database, Error, UserID,
    validation::{ApiJson, ApiQuery, require},
    wallet::{Wallet, get_wallets_for_user},
};

/// The query string for listing wallets.
#[derive(Debug, Deserialize)]
pub struct ListWalletsQuery {
    /// The id of the user whose wallets should be listed.
    pub user_id: Option<i64>,
}

/// A route handler that responds with every wallet owned by a user.
pub async fn list_wallets_endpoint(
    State(database): State<Database>,
    ApiQuery(query): ApiQuery<ListWalletsQuery>,
) -> Result<ApiJson<Vec<Wallet>>, Error> {
    let user_id = UserID::new(require("user_id", query.user_id)?);

    database
        .run(move |connection| get_wallets_for_user(user_id, connection))
        .await
        .map(ApiJson)
}

#[cfg(test)]
mod list_wallets_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        Wallet,
        test_utils::{get_test_server, post_test_user, post_test_wallet},
    };

    #[tokio::test]
    async fn lists_wallets_of_user() {
        let (server, _dir) = get_test_server();
        let user = post_test_user(&server, "test@example.com").await;
        let other = post_test_user(&server, "other@example.com").await;
        let first = post_test_wallet(&server, user.id, "Wallet 1").await;
        let second = post_test_wallet(&server, user.id, "Wallet 2").await;
        post_test_wallet(&server, other.id, "Not mine").await;

        let response = server
            .get("/wallets")
            .add_query_param("user_id", user.id)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Wallet>>(), vec![first, second]);
    }

    #[tokio::test]
    async fn user_without_wallets_gets_empty_list() {
        let (server, _dir) = get_test_server();
        let user = post_test_user(&server, "test@example.com").await;

        let response = server
            .get("/wallets")
            .add_query_param("user_id", user.id)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Wallet>>(), vec![]);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (server, _dir) = get_test_server();

        let response = server.get("/wallets").add_query_param("user_id", 42).await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_user_id_reports_field() {
        let (server, _dir) = get_test_server();

        let response = server.get("/wallets").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["field"], "user_id");
    }

    #[tokio::test]
    async fn malformed_user_id_is_rejected() {
        let (server, _dir) = get_test_server();

        let response = server
            .get("/wallets")
            .add_query_param("user_id", "abc")
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["field"], "query");
    }
}
