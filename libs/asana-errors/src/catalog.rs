//! Error catalog: one static definition per error kind

use serde::{Deserialize, Serialize};

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub code: &'static str,
    pub exit_code: u8,
    pub title: &'static str,
}

const GENERAL: ErrDef = ErrDef {
    code: "GENERAL_ERROR",
    exit_code: 1,
    title: "General error",
};

const INVALID_ARGS: ErrDef = ErrDef {
    code: "INVALID_ARGS",
    exit_code: 2,
    title: "Invalid arguments",
};

const AUTH_FAILURE: ErrDef = ErrDef {
    code: "AUTH_FAILURE",
    exit_code: 3,
    title: "Authentication failure",
};

const NOT_FOUND: ErrDef = ErrDef {
    code: "NOT_FOUND",
    exit_code: 4,
    title: "Not found",
};

const RATE_LIMITED: ErrDef = ErrDef {
    code: "RATE_LIMITED",
    exit_code: 5,
    title: "Rate limited",
};

const NETWORK: ErrDef = ErrDef {
    code: "NETWORK_ERROR",
    exit_code: 6,
    title: "Network error",
};

/// The closed set of error categories.
///
/// Every failure path of the CLI ends up as exactly one of these kinds, and
/// the kind alone decides the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Catch-all: encode/decode failures, unclassified non-2xx, local construction failures
    General,
    /// Invalid combination of inputs, detected before any network call
    InvalidArgs,
    /// HTTP 401/403
    AuthFailure,
    /// HTTP 404
    NotFound,
    /// HTTP 429 after the retry budget is spent
    RateLimited,
    /// Transport failure, response-read failure, timeout or cancellation
    Network,
}

impl ErrorKind {
    /// All kinds, in exit-code order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::General,
        ErrorKind::InvalidArgs,
        ErrorKind::AuthFailure,
        ErrorKind::NotFound,
        ErrorKind::RateLimited,
        ErrorKind::Network,
    ];

    /// Catalog entry for this kind.
    #[must_use]
    pub const fn def(self) -> &'static ErrDef {
        match self {
            ErrorKind::General => &GENERAL,
            ErrorKind::InvalidArgs => &INVALID_ARGS,
            ErrorKind::AuthFailure => &AUTH_FAILURE,
            ErrorKind::NotFound => &NOT_FOUND,
            ErrorKind::RateLimited => &RATE_LIMITED,
            ErrorKind::Network => &NETWORK,
        }
    }

    /// Machine-readable code, e.g. `NOT_FOUND`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.def().code
    }

    /// Process exit code.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self.def().exit_code
    }
}
