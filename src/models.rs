//! Wire models for the CDN HTTP+JSON contract
//!
//! Every type here mirrors a JSON payload owned by the server.  Field
//! names on the wire are camelCase; the structs keep rust naming and let
//! serde do the renaming.
use serde::{Deserialize, Serialize};

/// Response to a ping request
#[derive(Debug, Deserialize, Serialize)]
pub struct PingResult {
    /// The liveness answer, conventionally the string "pong"
    pub pong: String,
}

/// Credentials sent to the login endpoint
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Unique username
    pub user_name: String,
    /// Password, may be empty depending on server policy
    pub password: String,
}

/// Response of the login endpoint, carrying the session token
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResult {
    /// Opaque token replayed on subsequent calls, absent or empty when
    /// the credentials were rejected
    #[serde(default)]
    pub token: Option<String>,
}

/// JSON-mode payload for storing a blob
#[derive(Debug, Deserialize, Serialize)]
pub struct SaveBlobRequest {
    /// Flat blob key, no path separators allowed
    pub path: String,
    /// Base64 encoded payload
    pub data: String,
}

/// Outcome of a blob write
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBlobResult {
    /// True if the blob was stored
    pub saved_successfully: bool,
}

/// A server-side account record, exposed through the user admin endpoints
///
/// The server owns these records; the client only marshals them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Unique username
    pub user_name: String,
    /// Password, omitted by the server when listing accounts
    #[serde(default)]
    pub password: Option<String>,
    /// Password salt, omitted by the server when listing accounts
    #[serde(default)]
    pub salt: Option<String>,
    /// Role names assigned to the account
    #[serde(default)]
    pub roles: Vec<String>,
}

/// One server log line with its severity
#[derive(Debug, Deserialize, Serialize)]
pub struct LogEntry {
    pub message: String,
    /// Numeric severity as defined by the server
    pub level: i32,
}

/// Snapshot of the server log
#[derive(Debug, Deserialize, Serialize)]
pub struct LogContent {
    #[serde(default)]
    pub messages: Vec<LogEntry>,
}

/// Server-side indexing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// Whether the server indexes stored blobs at all
    pub enabled: bool,
    /// Seconds between index rebuild runs
    pub rebuild_interval: u32,
    /// Blobs processed per rebuild batch
    pub batch_size: u32,
}

/// Server-side HTTP endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationConfig {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
}

/// Structured failure payload returned by the server on non-2xx responses
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Server-defined error code
    pub error_code: i32,
    /// Human readable description
    pub message: String,
    /// Message of the underlying server-side exception, if any
    #[serde(default)]
    pub exception_message: Option<String>,
}
