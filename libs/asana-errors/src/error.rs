use crate::catalog::ErrorKind;

/// Boxed cause attached to a [`CliError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The single error type returned by the request pipeline and the CLI.
///
/// Immutable once built. `Display` renders `"<message>: <cause>"` when a
/// cause is attached, otherwise just the message.
#[derive(Debug, thiserror::Error)]
#[error("{message}{}", cause_suffix(.source.as_ref()))]
pub struct CliError {
    kind: ErrorKind,
    message: String,
    source: Option<BoxError>,
}

fn cause_suffix(source: Option<&BoxError>) -> String {
    source
        .map(|cause| format!(": {cause}"))
        .unwrap_or_default()
}

impl CliError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        self.source = Some(cause.into());
        self
    }

    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }

    #[must_use]
    pub fn general_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::general(message).with_source(cause)
    }

    #[must_use]
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgs, message)
    }

    #[must_use]
    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailure, message)
    }

    /// `"<resource> not found"`
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} not found"))
    }

    /// `"rate limited"`, or `"rate limited, retry after <hint>"` when the
    /// server supplied a wait hint.
    #[must_use]
    pub fn rate_limited(retry_after: Option<&str>) -> Self {
        let message = match retry_after {
            Some(hint) if !hint.is_empty() => format!("rate limited, retry after {hint}"),
            _ => "rate limited".to_owned(),
        };
        Self::new(ErrorKind::RateLimited, message)
    }

    #[must_use]
    pub fn network(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Network, message).with_source(cause)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}
