//! Field-level input validation and the JSON extractors that report request
//! rejections in the same shape as validation failures.

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// The maximum number of characters allowed in names, emails and descriptions.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Input that failed validation, along with the field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The name of the offending request field, e.g. "amount".
    pub field: &'static str,
    /// A human readable explanation of what is wrong with the field.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// The error for a field that is missing from the request.
    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("the {field} field is required"))
    }
}

/// Unwrap a required field.
///
/// # Errors
///
/// Returns [ValidationError::required] if `value` is `None`.
pub fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::required(field))
}

/// Trim `value` and check that it is not empty and no longer than
/// [MAX_TEXT_LENGTH] characters.
///
/// # Errors
///
/// Returns a [ValidationError] for `field` if the trimmed text is empty or too long.
pub fn validate_required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    check_length(field, value)?;

    Ok(value.to_owned())
}

/// Trim optional text, treating blank text as absent.
///
/// # Errors
///
/// Returns a [ValidationError] for `field` if the text is longer than
/// [MAX_TEXT_LENGTH] characters.
pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            check_length(field, value)?;
            Ok(Some(value.to_owned()))
        }
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        Err(ValidationError::new(
            field,
            format!("the {field} field must not be longer than {MAX_TEXT_LENGTH} characters"),
        ))
    } else {
        Ok(())
    }
}

/// A JSON body extractor and response whose rejections are [Error::Validation].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl<T> IntoResponse for ApiJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// A query string extractor whose rejections are [Error::Validation].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// A path parameter extractor whose rejections are [Error::Validation].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(ValidationError::new("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(ValidationError::new("query", rejection.body_text()))
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(ValidationError::new("path", rejection.body_text()))
    }
}
