use std::time::Duration;

use http::HeaderMap;

/// Parse `Retry-After` as a whole number of seconds.
///
/// Returns `None` if:
/// - Header is missing
/// - Value is not a plain integer (HTTP-dates are not honored)
/// - Value is zero or negative
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;
    let seconds = value.trim().parse::<i64>().ok()?;
    let seconds = u64::try_from(seconds).ok().filter(|s| *s > 0)?;
    Some(Duration::from_secs(seconds))
}

/// Human rendering of a wait hint, e.g. `30s` or `2m 5s`.
#[must_use]
pub fn format_retry_after(hint: Duration) -> String {
    humantime::format_duration(hint).to_string()
}
