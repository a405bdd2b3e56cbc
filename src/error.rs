//! Error handling utilities for the crate
use thiserror::Error;

use reqwest::Error as ReqwestError;

/// All errors raised by this crate will be instances of CdnError
#[derive(Error, Debug)]
pub enum CdnError {
    /// The request never produced a usable response (connection refused,
    /// DNS failure, timeout).  Raised client-side, not server-reported.
    #[error("Transport error: {0}")]
    Transport(#[from] ReqwestError),
    /// The server rejected the call and returned a structured error body
    #[error("Server error {code}: {message} @ HttpStatus {status}")]
    Protocol {
        code: i32,
        message: String,
        status: u16,
    },
    /// The server rejected the credentials attached to the call.  The
    /// session has already cleared its token and downgraded to
    /// `NotAuthenticated` by the time this error is observed.
    #[error("Authentication rejected ({status}): {message}")]
    Auth {
        code: Option<i32>,
        message: String,
        status: u16,
    },
    /// Non-2xx response whose body could not be parsed as structured
    /// error info.  Carries the raw body text.
    #[error("Unexpected server response ({status}): {body}")]
    Server { status: u16, body: String },
    /// A 2xx body that failed to parse as the expected result type.
    /// Usually indicates a version mismatch between client and server.
    #[error("Failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server answered with an incompatible API version
    #[error("API version mismatch: client speaks {client}, server answered with {server}")]
    VersionMismatch { client: u32, server: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The blocking wrapper could not start its runtime
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl CdnError {
    pub fn required(field_name: &str) -> Self {
        CdnError::InvalidInput(format!("{} is required", field_name))
    }

    pub fn invalid_path(path: &str) -> Self {
        CdnError::InvalidInput(format!(
            "'{}' is not a valid blob path, separators are not allowed",
            path
        ))
    }

    /// True if the error reports that the session's credentials were
    /// rejected and the session fell back to `NotAuthenticated`.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CdnError::Auth { .. })
    }
}

pub(crate) type Result<T> = std::result::Result<T, CdnError>;
