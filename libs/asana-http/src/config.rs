use std::time::Duration;

use secrecy::SecretString;

use crate::backoff::BackoffPolicy;

/// Production API origin plus version prefix.
pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// Per-dispatch timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response body limit used when none is configured (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// TLS root certificate strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsRootConfig {
    /// Use Mozilla's root certificates (webpki-roots, no OS dependency)
    #[default]
    WebPki,
    /// Use OS native root certificate store
    Native,
}

/// Transport security configuration
///
/// Controls whether the client enforces TLS or allows insecure HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Require TLS for all connections (HTTPS only)
    #[default]
    TlsOnly,
    /// Allow plain HTTP, for local mock servers only
    AllowInsecureHttp,
}

/// Immutable client configuration, shared by every call made through one client.
///
/// `Debug` never prints the token.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin plus version prefix; paths are appended verbatim
    pub base_url: String,

    /// Bearer token sent on every request
    pub token: SecretString,

    /// Timeout for each individual dispatch (default: 30 seconds)
    ///
    /// A timeout while waiting on the network is reported as a network error.
    /// Backoff sleeps are not counted against it.
    pub timeout: Duration,

    /// Rate-limit backoff policy
    pub backoff: BackoffPolicy,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// TLS root certificate strategy (default: `WebPki`)
    pub tls_roots: TlsRootConfig,

    /// Maximum response body size in bytes (default: 10 MiB)
    pub max_body_size: usize,
}

impl ClientConfig {
    /// Configuration for the production API with the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: SecretString::from(token.into()),
            timeout: DEFAULT_TIMEOUT,
            backoff: BackoffPolicy::default(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Configuration pointing at a local mock server over plain HTTP.
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::new(token)
        }
    }
}
