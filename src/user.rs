//! Code for creating the user table, creating users and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use axum::{
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Database, Error, PasswordHash, endpoints,
    validation::{ApiJson, ValidationError, validate_required_text},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated, non-empty user name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserName(String);

impl UserName {
    /// Create a user name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] on the field "name" if the name is blank
    /// or longer than 255 characters.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_required_text("name", name).map(Self)
    }

    /// Create a user name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A syntactically valid email address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] on the field "email" if `raw_email` is
    /// blank, longer than 255 characters or not a valid address.
    pub fn new(raw_email: &str) -> Result<Self, ValidationError> {
        let raw_email = validate_required_text("email", raw_email)?;

        match EmailAddress::from_str(&raw_email) {
            Ok(email) => Ok(Self(email.to_string())),
            Err(error) => Err(ValidationError::new(
                "email",
                format!("the email field must be a valid email address: {error}"),
            )),
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// The caller should ensure that `raw_email` is a correctly formatted email address.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_string())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
///
/// The stored credential is not part of this type and is never sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: UserName,
    /// The user's email address, unique across all users.
    pub email: Email,
    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated input for [create_user].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's display name.
    pub name: UserName,
    /// The user's email address.
    pub email: Email,
}

impl NewUser {
    /// Validate the raw name and email for a new user.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] for the first field that is invalid.
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            email: Email::new(email)?,
        })
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// A random credential is generated and hashed with `password_hash_cost`,
/// the caller never supplies a password.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user already has the same email address,
/// - [Error::HashingError] if the credential could not be hashed,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(
    new_user: NewUser,
    password_hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let password_hash = PasswordHash::generate(password_hash_cost)?;

    let user = connection
        .prepare(
            "INSERT INTO user (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, email, created_at",
        )?
        .query_row(
            (
                new_user.name.as_ref(),
                new_user.email.as_ref(),
                password_hash.as_ref(),
                OffsetDateTime::now_utc(),
            ),
            map_user_row,
        )?;

    tracing::info!("created user {} <{}>", user.id, user.email);

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))?;

    Ok(count as usize)
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let name = UserName::new_unchecked(&row.get::<_, String>(1)?);
    let email = Email::new_unchecked(&row.get::<_, String>(2)?);
    let created_at = row.get(3)?;

    Ok(User {
        id,
        name,
        email,
        created_at,
    })
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUserState {
    /// The database to store the user in.
    pub database: Database,
    /// The bcrypt cost for hashing the generated credential.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for CreateUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The request body for creating a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserForm {
    /// The user's display name.
    #[serde(default)]
    pub name: String,
    /// The user's email address.
    #[serde(default)]
    pub email: String,
}

/// A route handler for creating a new user, responds with the created user.
pub async fn create_user_endpoint(
    State(state): State<CreateUserState>,
    ApiJson(form): ApiJson<UserForm>,
) -> Result<Response, Error> {
    let new_user = NewUser::new(&form.name, &form.email)?;
    let cost = state.password_hash_cost;

    let user = state
        .database
        .run(move |connection| create_user(new_user, cost, connection))
        .await?;

    let location = endpoints::format_endpoint(endpoints::PROFILE, user.id.as_i64());

    Ok((StatusCode::CREATED, [(LOCATION, location)], ApiJson(user)).into_response())
}
