//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/wallets/{wallet_id}', use [format_endpoint].

/// The route for creating users.
pub const USERS: &str = "/users";
/// The route for creating and listing wallets.
pub const WALLETS: &str = "/wallets";
/// The route for a single wallet and its history.
pub const WALLET: &str = "/wallets/{wallet_id}";
/// The route for recording transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for a user's profile summary.
pub const PROFILE: &str = "/profile/{user_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{user_id}' in '/profile/{user_id}'. Only the first parameter is
/// replaced. If there is no parameter, `endpoint_path` is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::WALLETS);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::WALLET, 1));
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::PROFILE, 1));
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::WALLET, 12);

        assert_eq!(formatted_path, "/wallets/12");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint(endpoints::USERS, 1), "/users");
    }

    #[test]
    fn parameter_in_middle() {
        assert_eq!(format_endpoint("/hello/{world}/bye", 1), "/hello/1/bye");
    }
}
