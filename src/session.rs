//! The CDN session type and the typed operations it exposes
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{CdnError, Result},
    models::{
        AdminUser, CommunicationConfig, ErrorInfo, IndexConfig, LogContent, LoginRequest,
        LoginResult, PingResult, SaveBlobRequest, SaveBlobResult,
    },
};

/// API version stamped on every request and checked against the
/// `x-api-version` header of 2xx responses
pub const CDN_API_VERSION: u32 = 1;

static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// The authentication status of a [`CdnSession`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No valid token is held.  Privileged calls will be rejected by the
    /// server until [`CdnApi::connect`] succeeds.
    #[default]
    NotAuthenticated,
    /// A token obtained from a successful login is attached to every
    /// request until the server rejects it or the session disconnects.
    Authenticated,
}

/// How blob payloads are encoded on upload
///
/// The choice is made once at construction time and applies to every
/// [`CdnApi::write_data`] call made through the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// POST the payload as a JSON body with the bytes base64 encoded
    #[default]
    Json,
    /// POST the payload as a multipart form with one binary part named
    /// by the blob path
    Multipart,
}

/// Options for constructing a session
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// Upload encoding, see [`TransferMode`]
    pub transfer_mode: TransferMode,
    /// Overall timeout applied to every request made through the
    /// session.  No timeout is applied when unset.
    pub request_timeout: Option<Duration>,
}

/// A session against one CDN endpoint
///
/// The session owns the base URL, the authentication token, and the
/// connection state.  Every operation is a single request/response
/// cycle; the only calls that mutate session state are
/// [`CdnApi::connect`], [`CdnSession::disconnect`], and the automatic
/// downgrade performed when the server answers 401 or 203.
///
/// Operations take `&mut self`, so one session cannot be shared between
/// concurrent tasks.  Callers that need concurrency should create one
/// session per task; sessions are independent and cheap to construct.
pub struct CdnSession {
    base_url: String,
    token: Option<String>,
    state: ConnectionState,
    transfer_mode: TransferMode,
    http: Client,
}

impl CdnSession {
    /// Creates a session for the CDN service at `base_url`
    ///
    /// The session starts out [`ConnectionState::NotAuthenticated`] and
    /// uses JSON uploads with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            state: ConnectionState::NotAuthenticated,
            transfer_mode: TransferMode::default(),
            http: GLOBAL_CLIENT.clone(),
        }
    }

    /// Creates a session with explicit [`SessionOptions`]
    ///
    /// Fails only if the underlying HTTP client cannot be constructed
    /// for the requested timeout.
    pub fn with_options(base_url: impl Into<String>, options: SessionOptions) -> Result<Self> {
        let http = match options.request_timeout {
            Some(timeout) => Client::builder().timeout(timeout).build()?,
            None => GLOBAL_CLIENT.clone(),
        };
        Ok(Self {
            base_url: base_url.into(),
            token: None,
            state: ConnectionState::NotAuthenticated,
            transfer_mode: options.transfer_mode,
            http,
        })
    }

    /// The base URL this session talks to
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// The current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True if the session currently holds a login token
    pub fn is_authenticated(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }

    /// Drops the login token and resets the session to
    /// [`ConnectionState::NotAuthenticated`].  Purely local, the server
    /// is not notified.
    pub fn disconnect(&mut self) {
        self.reset_auth();
    }

    // Token and state only ever change together, through these two.
    fn set_authenticated(&mut self, token: String) {
        self.token = Some(token);
        self.state = ConnectionState::Authenticated;
    }

    fn reset_auth(&mut self) {
        self.token = None;
        self.state = ConnectionState::NotAuthenticated;
    }

    fn endpoint_url(&self, controller: &str, action: &str) -> String {
        url_join(self.base_url.clone(), format!("{}/{}", controller, action))
    }

    fn build_request(&self, method: Method, controller: &str, action: &str) -> RequestBuilder {
        debug!("{} {}/{}", method, controller, action);
        let mut request = self
            .http
            .request(method, self.endpoint_url(controller, action))
            .header("x-api-version", CDN_API_VERSION.to_string());
        if let Some(token) = &self.token {
            request = request.header("authorization", format!("jwt {}", token));
        }
        request
    }

    fn check_api_version(response: &Response) -> Result<()> {
        match response.headers().get("x-api-version") {
            Some(version) if version.as_bytes() != CDN_API_VERSION.to_string().as_bytes() => {
                Err(CdnError::VersionMismatch {
                    client: CDN_API_VERSION,
                    server: String::from_utf8_lossy(version.as_bytes()).into_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Turns a non-2xx response into the matching error variant
    ///
    /// A 401 or 203 status downgrades the session before anything else.
    /// The body is parsed as [`ErrorInfo`] on a best-effort basis; when
    /// that fails the raw text is carried instead.
    async fn failure_from_response(&mut self, response: Response) -> CdnError {
        let status = response.status();
        let auth_failed = status == StatusCode::UNAUTHORIZED
            || status == StatusCode::NON_AUTHORITATIVE_INFORMATION;
        if auth_failed {
            if self.is_authenticated() {
                warn!("server rejected session token, dropping it");
            }
            self.reset_auth();
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return CdnError::Transport(err),
        };
        match serde_json::from_str::<ErrorInfo>(&body) {
            Ok(info) => {
                let message = match info.exception_message {
                    Some(inner) if !inner.is_empty() => format!("{}\r\n{}", info.message, inner),
                    _ => info.message,
                };
                if auth_failed {
                    CdnError::Auth {
                        code: Some(info.error_code),
                        message,
                        status: status.as_u16(),
                    }
                } else {
                    CdnError::Protocol {
                        code: info.error_code,
                        message,
                        status: status.as_u16(),
                    }
                }
            }
            Err(_) => {
                if auth_failed {
                    CdnError::Auth {
                        code: None,
                        message: body,
                        status: status.as_u16(),
                    }
                } else {
                    CdnError::Server {
                        status: status.as_u16(),
                        body,
                    }
                }
            }
        }
    }

    async fn execute_json<R: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<R> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.failure_from_response(response).await);
        }
        Self::check_api_version(&response)?;
        let body = response.text().await?;
        Ok(serde_json::from_str::<R>(&body)?)
    }

    /// Like [`Self::execute_json`] but discards the response body
    async fn execute_empty(&mut self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.failure_from_response(response).await);
        }
        Self::check_api_version(&response)
    }

    async fn execute_raw(&mut self, request: RequestBuilder) -> Result<Bytes> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.failure_from_response(response).await);
        }
        Self::check_api_version(&response)?;
        Ok(response.bytes().await?)
    }

    async fn get_json<R: DeserializeOwned>(
        &mut self,
        controller: &str,
        action: &str,
        query: &[(&str, &str)],
    ) -> Result<R> {
        let request = self
            .build_request(Method::GET, controller, action)
            .header("accept", "application/json")
            .query(query);
        self.execute_json(request).await
    }

    async fn post_json<R: DeserializeOwned, I: Serialize>(
        &mut self,
        controller: &str,
        action: &str,
        query: &[(&str, &str)],
        model: &I,
    ) -> Result<R> {
        let request = self
            .build_request(Method::POST, controller, action)
            .header("accept", "application/json")
            .query(query)
            .json(model);
        self.execute_json(request).await
    }

    async fn post_empty<I: Serialize>(
        &mut self,
        controller: &str,
        action: &str,
        query: &[(&str, &str)],
        model: &I,
    ) -> Result<()> {
        let request = self
            .build_request(Method::POST, controller, action)
            .header("accept", "application/json")
            .query(query)
            .json(model);
        self.execute_empty(request).await
    }
}

// Custom implementation of Debug to avoid printing the token
impl std::fmt::Debug for CdnSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdnSession")
            .field("base_url", &self.base_url)
            .field("state", &self.state)
            .field("token", &self.token.as_ref().map(|_| "**********"))
            .finish()
    }
}

fn url_join(left: String, right: String) -> String {
    if left.ends_with('/') {
        if let Some(stripped) = right.strip_prefix('/') {
            left + stripped
        } else {
            left + &right
        }
    } else if right.starts_with('/') {
        left + &right
    } else {
        left + "/" + &right
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CdnError::required("path"));
    }
    if path.contains('/') || path.contains('\\') {
        return Err(CdnError::invalid_path(path));
    }
    Ok(())
}

/// Operations defined by the CDN service
///
/// Each method performs exactly one HTTP request/response cycle.
/// Dropping the returned future abandons the exchange, which is the
/// only cancellation mechanism offered.
#[async_trait]
pub trait CdnApi {
    /// Sends a ping request to the service
    ///
    /// # Returns
    ///
    /// The liveness answer reported by the server
    async fn ping(&mut self) -> Result<String>;

    /// Logs in and stores the returned token on the session
    ///
    /// Any previously held token is dropped before the attempt.
    ///
    /// # Arguments
    ///
    /// * `user_name` - Unique username, must not be empty
    /// * `password` - Password, may be empty depending on server policy
    ///
    /// # Returns
    ///
    /// True if the server accepted the credentials and returned a
    /// usable token.  Rejected credentials yield `Ok(false)`, never an
    /// error; errors are reserved for transport and protocol failures.
    async fn connect(&mut self, user_name: &str, password: &str) -> Result<bool>;

    /// Stores a blob under a flat path key
    ///
    /// # Arguments
    ///
    /// * `path` - Blob key, must not be empty or contain `/` or `\`
    /// * `data` - Payload, the empty payload is allowed
    ///
    /// # Returns
    ///
    /// The server's verdict on whether the blob was stored
    async fn write_data(
        &mut self,
        path: &str,
        data: impl Into<Bytes> + Send,
    ) -> Result<SaveBlobResult>;

    /// Reads back the blob stored under `path`
    ///
    /// # Returns
    ///
    /// The raw payload bytes.  A missing blob surfaces as the typed
    /// error the server reports for it.
    async fn read_data(&mut self, path: &str) -> Result<Bytes>;

    /// Fetches a snapshot of the server log
    async fn get_log(&mut self) -> Result<LogContent>;

    /// Lists all accounts known to the server.  Admin scoped.
    async fn get_all_users(&mut self) -> Result<Vec<AdminUser>>;

    /// Creates an account.  Admin scoped.
    async fn add_user(&mut self, user: &AdminUser) -> Result<()>;

    /// Updates the account named by `user.user_name`.  Admin scoped.
    async fn update_user(&mut self, user: &AdminUser) -> Result<()>;

    /// Deletes an account.  Admin scoped.
    async fn remove_user(&mut self, user: &AdminUser) -> Result<()>;

    /// Reads the server's indexing settings.  Admin scoped.
    async fn get_index_config(&mut self) -> Result<IndexConfig>;

    /// Replaces the server's indexing settings.  Admin scoped.
    async fn set_index_config(&mut self, config: &IndexConfig) -> Result<()>;

    /// Reads the server's HTTP endpoint settings.  Admin scoped.
    async fn get_communication_config(&mut self) -> Result<CommunicationConfig>;

    /// Replaces the server's HTTP endpoint settings.  Admin scoped.
    async fn set_communication_config(&mut self, config: &CommunicationConfig) -> Result<()>;
}

#[async_trait]
impl CdnApi for CdnSession {
    async fn ping(&mut self) -> Result<String> {
        let result: PingResult = self.get_json("cdn", "ping", &[]).await?;
        Ok(result.pong)
    }

    async fn connect(&mut self, user_name: &str, password: &str) -> Result<bool> {
        if user_name.is_empty() {
            return Err(CdnError::required("user_name"));
        }
        self.reset_auth();

        let request = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        let result: LoginResult = self.post_json("auth", "login", &[], &request).await?;

        match result.token {
            Some(token) if !token.trim().is_empty() => {
                debug!("login accepted for '{}'", user_name);
                self.set_authenticated(token);
                Ok(true)
            }
            _ => {
                debug!("login rejected for '{}'", user_name);
                Ok(false)
            }
        }
    }

    async fn write_data(
        &mut self,
        path: &str,
        data: impl Into<Bytes> + Send,
    ) -> Result<SaveBlobResult> {
        validate_path(path)?;
        let data = data.into();

        match self.transfer_mode {
            TransferMode::Json => {
                let model = SaveBlobRequest {
                    path: path.to_string(),
                    data: BASE64.encode(&data),
                };
                self.post_json("cdn", "set", &[], &model).await
            }
            TransferMode::Multipart => {
                let part = multipart::Part::bytes(data.to_vec()).file_name(path.to_string());
                let form = multipart::Form::new().part(path.to_string(), part);
                let request = self
                    .build_request(Method::POST, "cdn", "set")
                    .header("accept", "application/json")
                    .multipart(form);
                self.execute_json(request).await
            }
        }
    }

    async fn read_data(&mut self, path: &str) -> Result<Bytes> {
        validate_path(path)?;
        let request = self
            .build_request(Method::GET, "cdn", "getraw")
            .query(&[("path", path)]);
        self.execute_raw(request).await
    }

    async fn get_log(&mut self) -> Result<LogContent> {
        self.get_json("log", "get", &[]).await
    }

    async fn get_all_users(&mut self) -> Result<Vec<AdminUser>> {
        self.get_json("UserAdmin", "GetAllUsers", &[]).await
    }

    async fn add_user(&mut self, user: &AdminUser) -> Result<()> {
        self.post_empty("UserAdmin", "AddUser", &[], user).await
    }

    async fn update_user(&mut self, user: &AdminUser) -> Result<()> {
        self.post_empty(
            "UserAdmin",
            "UpdateUser",
            &[("userName", user.user_name.as_str())],
            user,
        )
        .await
    }

    async fn remove_user(&mut self, user: &AdminUser) -> Result<()> {
        self.post_empty("UserAdmin", "RemoveUser", &[], user).await
    }

    async fn get_index_config(&mut self) -> Result<IndexConfig> {
        self.get_json("IndexAdmin", "GetConfig", &[]).await
    }

    async fn set_index_config(&mut self, config: &IndexConfig) -> Result<()> {
        self.post_empty("IndexAdmin", "SaveConfig", &[], config).await
    }

    async fn get_communication_config(&mut self) -> Result<CommunicationConfig> {
        self.get_json("CommunicationAdmin", "GetConfig", &[]).await
    }

    async fn set_communication_config(&mut self, config: &CommunicationConfig) -> Result<()> {
        self.post_empty("CommunicationAdmin", "SetHttpConfig", &[], config)
            .await
    }
}
