//! Mapping from a non-2xx status and raw body to a [`CliError`].

use asana_errors::CliError;
use http::StatusCode;
use serde::Deserialize;

use crate::trace::truncate_utf8;

/// Raw-body snippet length used when the error body is not JSON.
const SNIPPET_LIMIT: usize = 200;

const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    message: String,
}

/// Classify a terminal non-2xx response.
///
/// `resource` names the thing that was looked up; it is the whole message of
/// a 404, whatever the server said.
#[must_use]
pub fn classify(status: StatusCode, body: &[u8], resource: &str) -> CliError {
    let message = extract_message(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CliError::auth_failure(message),
        StatusCode::NOT_FOUND => CliError::not_found(resource),
        StatusCode::TOO_MANY_REQUESTS => CliError::rate_limited(None),
        other => CliError::general(format!("API error {}: {message}", other.as_u16())),
    }
}

/// First `errors[].message` of a JSON error envelope, or a raw-body snippet.
fn extract_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Option<ApiErrorBody>>(body) {
        Ok(parsed) => parsed
            .and_then(|b| b.errors.into_iter().next())
            .map_or_else(|| UNKNOWN_ERROR.to_owned(), |item| item.message),
        Err(_) if body.is_empty() => UNKNOWN_ERROR.to_owned(),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let snippet = truncate_utf8(&text, SNIPPET_LIMIT);
            if snippet.len() < text.len() {
                format!("API error (non-JSON): {snippet}...")
            } else {
                format!("API error (non-JSON): {snippet}")
            }
        }
    }
}
