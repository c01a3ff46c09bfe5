//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::{Database, PasswordHash};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database that every request opens its own session on.
    pub database: Database,

    /// The bcrypt cost used when hashing generated credentials.
    pub password_hash_cost: u32,
}

impl AppState {
    /// Create a new [AppState] using the default password hashing cost.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }

    /// Use `cost` when hashing generated credentials.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.database.clone()
    }
}
