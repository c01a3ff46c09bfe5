//! Server-side credentials for new users.
//!
//! Clients never choose a password when creating a user. Instead a random
//! credential is generated and only its salted hash is stored.

use bcrypt::hash;
use rand::{Rng, distributions::Alphanumeric};

use crate::Error;

/// The number of characters in a generated credential.
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

/// Generate a random alphanumeric string of `length` characters.
pub fn generate_random_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// The cheapest cost accepted by bcrypt, only suitable for tests.
    pub const MIN_COST: u32 = 4;

    /// Hash `raw_password` with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::HashingError] if the password could not be hashed.
    pub fn new(raw_password: &str, cost: u32) -> Result<Self, Error> {
        hash(raw_password, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Generate a random credential and hash it.
    ///
    /// The raw credential is discarded, it is never shown to anyone.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::HashingError] if the password could not be hashed.
    pub fn generate(cost: u32) -> Result<Self, Error> {
        Self::new(&generate_random_password(GENERATED_PASSWORD_LENGTH), cost)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
