#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Resilient request pipeline for the Asana REST API
//!
//! Every remote call passes through [`AsanaClient::execute`], which:
//! - Attaches `Authorization: Bearer`, `Accept` and (with a body) `Content-Type`
//! - Dispatches over hyper + rustls (HTTPS only by default)
//! - Retries only on HTTP 429, with exponential backoff and jitter, honoring
//!   a `Retry-After` seconds hint
//! - Observes a caller-supplied [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   during every dispatch and every backoff wait
//! - Maps transport failures and non-2xx statuses onto
//!   [`CliError`](asana_errors::CliError)
//! - Optionally writes a redacted `[DEBUG]` trace to a caller-provided sink
//!
//! # Example
//!
//! ```ignore
//! use asana_http::{AsanaClient, ClientConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = AsanaClient::builder(ClientConfig::new(token))
//!     .debug_sink(std::io::stderr())
//!     .build()?;
//!
//! let me = client.get_me(&CancellationToken::new()).await?;
//! ```

mod backoff;
mod classify;
mod client;
mod config;
mod envelope;
pub mod models;
mod request;
mod resources;
mod response;
mod tls;
mod trace;
mod transport;

#[cfg(test)]
mod testing;

pub use backoff::BackoffPolicy;
pub use classify::classify;
pub use client::{AsanaClient, AsanaClientBuilder};
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT, TlsRootConfig,
    TransportSecurity,
};
pub use envelope::{DataEnvelope, ListResponse, PageInfo};
pub use request::{DEFAULT_RESOURCE, RequestDescriptor};
pub use response::parse_retry_after;
pub use trace::{BODY_TRACE_LIMIT, redact_token, truncate_body};
pub use transport::{HyperTransport, Transport, TransportError};
