use std::io::Write;

use asana_errors::{CliError, ErrorEnvelope};
use serde::Serialize;

/// Pretty-print `value` as JSON (two-space indent) followed by a newline.
///
/// # Errors
///
/// `GeneralError` when encoding or writing fails.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| CliError::general_with("failed to write output", e))?;
    writeln!(out).map_err(|e| CliError::general_with("failed to write output", e))
}

/// Print the error envelope for `err`. Failures to write are dropped since
/// there is nowhere left to report them.
pub fn write_error(out: &mut impl Write, err: &CliError) {
    write_json(out, &ErrorEnvelope::from(err)).ok();
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_with_trailing_newline() {
        let mut out = Vec::new();
        write_json(&mut out, &json!({"version": "1.0.0"})).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"version\": \"1.0.0\"\n}\n"
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let mut out = Vec::new();
        write_error(&mut out, &CliError::not_found("task"));

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            printed,
            json!({"error": {"message": "task not found", "code": "NOT_FOUND", "exit_code": 4}})
        );
    }
}
