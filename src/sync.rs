//! A synchronous convenience tier over the async session
//!
//! Every method drives the corresponding [`CdnApi`] operation to
//! completion on a runtime dedicated to this session and therefore
//! blocks the calling thread for the full duration of the HTTP
//! exchange.  Do not use this tier from within an async context; use
//! [`CdnSession`] directly there.
use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};

use crate::{
    error::Result,
    models::{AdminUser, CommunicationConfig, IndexConfig, LogContent, SaveBlobResult},
    session::{CdnApi, CdnSession, ConnectionState, SessionOptions},
};

/// Blocking counterpart of [`CdnSession`]
///
/// Holds its own current-thread runtime, so constructing one is
/// noticeably heavier than constructing a [`CdnSession`].
pub struct BlockingCdnSession {
    inner: CdnSession,
    runtime: Runtime,
}

impl BlockingCdnSession {
    /// Creates a blocking session for the CDN service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            inner: CdnSession::new(base_url),
            runtime: build_runtime()?,
        })
    }

    /// Creates a blocking session with explicit [`SessionOptions`]
    pub fn with_options(base_url: impl Into<String>, options: SessionOptions) -> Result<Self> {
        Ok(Self {
            inner: CdnSession::with_options(base_url, options)?,
            runtime: build_runtime()?,
        })
    }

    /// The base URL this session talks to
    pub fn url(&self) -> &str {
        self.inner.url()
    }

    /// The current connection state
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// True if the session currently holds a login token
    pub fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    /// See [`CdnSession::disconnect`]
    pub fn disconnect(&mut self) {
        self.inner.disconnect();
    }

    /// See [`CdnApi::ping`]
    pub fn ping(&mut self) -> Result<String> {
        self.runtime.block_on(self.inner.ping())
    }

    /// See [`CdnApi::connect`]
    pub fn connect(&mut self, user_name: &str, password: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.connect(user_name, password))
    }

    /// See [`CdnApi::write_data`]
    pub fn write_data(
        &mut self,
        path: &str,
        data: impl Into<Bytes> + Send,
    ) -> Result<SaveBlobResult> {
        self.runtime.block_on(self.inner.write_data(path, data))
    }

    /// See [`CdnApi::read_data`]
    pub fn read_data(&mut self, path: &str) -> Result<Bytes> {
        self.runtime.block_on(self.inner.read_data(path))
    }

    /// See [`CdnApi::get_log`]
    pub fn get_log(&mut self) -> Result<LogContent> {
        self.runtime.block_on(self.inner.get_log())
    }

    /// See [`CdnApi::get_all_users`]
    pub fn get_all_users(&mut self) -> Result<Vec<AdminUser>> {
        self.runtime.block_on(self.inner.get_all_users())
    }

    /// See [`CdnApi::add_user`]
    pub fn add_user(&mut self, user: &AdminUser) -> Result<()> {
        self.runtime.block_on(self.inner.add_user(user))
    }

    /// See [`CdnApi::update_user`]
    pub fn update_user(&mut self, user: &AdminUser) -> Result<()> {
        self.runtime.block_on(self.inner.update_user(user))
    }

    /// See [`CdnApi::remove_user`]
    pub fn remove_user(&mut self, user: &AdminUser) -> Result<()> {
        self.runtime.block_on(self.inner.remove_user(user))
    }

    /// See [`CdnApi::get_index_config`]
    pub fn get_index_config(&mut self) -> Result<IndexConfig> {
        self.runtime.block_on(self.inner.get_index_config())
    }

    /// See [`CdnApi::set_index_config`]
    pub fn set_index_config(&mut self, config: &IndexConfig) -> Result<()> {
        self.runtime.block_on(self.inner.set_index_config(config))
    }

    /// See [`CdnApi::get_communication_config`]
    pub fn get_communication_config(&mut self) -> Result<CommunicationConfig> {
        self.runtime.block_on(self.inner.get_communication_config())
    }

    /// See [`CdnApi::set_communication_config`]
    pub fn set_communication_config(&mut self, config: &CommunicationConfig) -> Result<()> {
        self.runtime
            .block_on(self.inner.set_communication_config(config))
    }
}

impl std::fmt::Debug for BlockingCdnSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingCdnSession")
            .field("inner", &self.inner)
            .finish()
    }
}

fn build_runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
