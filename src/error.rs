//! Error types for the IG REST client.
//!
//! Every remote call either returns its reshaped payload or one of the
//! variants below. A non-200 status is always an error; nothing is
//! retried.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for IG operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all IG API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a status other than 200.
    #[error("API error: endpoint={endpoint}, status={status}, code={error_code:?}")]
    Api {
        /// Endpoint path that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// IG `errorCode`, when the body carried one
        error_code: Option<String>,
        /// Parsed response body, or the raw text as a JSON string
        body: Value,
    },

    /// `POST /session` answered with a status other than 200.
    #[error("Authentication failed ({status}): {body}")]
    Authentication {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A security header was absent from a successful login while strict
    /// authentication is enabled.
    #[error("Missing security header on login response: {0}")]
    MissingSecurityToken(&'static str),

    /// A confirmed deal was rejected. Only produced by
    /// [`DealOutcome::into_accepted`](crate::models::DealOutcome::into_accepted).
    #[error("Deal {reference} rejected: {reason}")]
    DealRejected {
        /// Deal reference
        reference: String,
        /// Rejection reason reported by IG
        reason: String,
    },

    /// The response was 200 but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A header value could not be encoded
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` for failures below HTTP: the remote side never answered.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Returns `true` if this is an authentication-related error.
    ///
    /// Covers failed logins as well as calls rejected for a missing or
    /// expired security token.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Authentication { .. } | Error::MissingSecurityToken(_) => true,
            Error::Api {
                status, error_code, ..
            } => {
                *status == 401
                    || error_code
                        .as_deref()
                        .is_some_and(|c| c.starts_with("error.security"))
            }
            _ => false,
        }
    }

    /// Returns `true` for a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } | Error::Authentication { status, .. } => {
                (400..500).contains(status)
            }
            Error::InvalidInput(_) | Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } | Error::Authentication { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Build an API error from a non-200 response body.
    pub(crate) fn from_api_response(endpoint: &str, status: u16, raw: &str) -> Self {
        let body = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));

        let error_code = body
            .get("errorCode")
            .and_then(|c| c.as_str())
            .map(String::from);

        Error::Api {
            endpoint: endpoint.to_string(),
            status,
            error_code,
            body,
        }
    }
}
