//! A client for a CDN blob storage service.
//!
//! The service stores opaque binary blobs under flat path keys (no
//! directory hierarchy) and exposes a small HTTP+JSON API for
//! authentication, health checks, blob upload/download, and a handful
//! of administrative endpoints.  This crate supplies a typed rust
//! client for that API.
//!
//! The entry point is a [`CdnSession`]: it owns the endpoint URL, the
//! login token, and the connection state, and implements every
//! operation through the [`CdnApi`] trait.
//!
//! [`CdnSession`]: crate::session::CdnSession
//! [`CdnApi`]: crate::session::CdnApi
//!
//! ```ignore
//! use cdn_blob::session::{CdnApi, CdnSession};
//!
//! let mut session = CdnSession::new("http://localhost:5000/");
//!
//! if session.connect("admin", "secret").await? {
//!     session.write_data("invoice-4711.pdf", pdf_bytes).await?;
//!     let data = session.read_data("invoice-4711.pdf").await?;
//! }
//! ```
//!
//! Every operation is async and performs exactly one request/response
//! cycle.  Code without an async runtime can use the blocking tier
//! instead, which drives the same operations on a dedicated runtime:
//!
//! ```ignore
//! use cdn_blob::sync::BlockingCdnSession;
//!
//! let mut session = BlockingCdnSession::new("http://localhost:5000/")?;
//! println!("{}", session.ping()?);
//! ```
//!
//! Failures are reported through the [`CdnError`] enum: transport
//! problems, structured server errors (carrying the server's error
//! code), auth rejections, and decode failures are all distinct
//! variants, so callers can match on exactly the cases they care
//! about.  When the server answers 401 or 203 the session drops its
//! token and falls back to `NotAuthenticated` before the error is
//! surfaced; the next privileged call must go through
//! [`CdnApi::connect`] again.
//!
//! [`CdnError`]: crate::error::CdnError
//! [`CdnApi::connect`]: crate::session::CdnApi::connect
//!
//! A session must not be shared between concurrent tasks (operations
//! take `&mut self`, so the compiler enforces this).  Use one session
//! per task instead; sessions are independent and cheap to construct.

pub mod error;
pub mod models;
pub mod session;
pub mod sync;
