//! Structured JSON error envelope printed at the CLI boundary.
//!
//! ```json
//! {
//!   "error": {
//!     "message": "task not found",
//!     "code": "NOT_FOUND",
//!     "exit_code": 4
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
    pub exit_code: u8,
}

impl From<&CliError> for ErrorEnvelope {
    fn from(err: &CliError) -> Self {
        Self {
            error: ErrorDetail {
                message: err.to_string(),
                code: err.code().to_owned(),
                exit_code: err.exit_code(),
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_expected_shape() {
        let env = ErrorEnvelope::from(&CliError::not_found("task"));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": {
                    "message": "task not found",
                    "code": "NOT_FOUND",
                    "exit_code": 4
                }
            })
        );
    }

    #[test]
    fn envelope_message_includes_cause() {
        let err = CliError::network("request cancelled", "operation was cancelled");
        let env = ErrorEnvelope::from(&err);
        assert_eq!(env.error.message, "request cancelled: operation was cancelled");
        assert_eq!(env.error.code, "NETWORK_ERROR");
        assert_eq!(env.error.exit_code, 6);
    }
}
