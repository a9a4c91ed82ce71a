//! Opt-in diagnostic side channel.
//!
//! Writes `[DEBUG]`-prefixed lines describing each exchange to a caller-owned
//! sink. Token material is redacted and bodies are truncated before they are
//! written. Write failures are ignored.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use http::{Method, StatusCode};
use parking_lot::Mutex;

/// Bodies longer than this many bytes are cut and marked with `...`.
pub const BODY_TRACE_LIMIT: usize = 500;

/// Token characters shown before the ellipsis.
const TOKEN_PREFIX_LEN: usize = 8;

const ELLIPSIS: &str = "...";

/// Longest prefix of `s` that fits in `max` bytes without splitting a character.
#[must_use]
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Tokens longer than 8 characters become their first 8 characters plus `...`.
/// Shorter tokens are returned whole.
#[must_use]
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(TOKEN_PREFIX_LEN) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &token[..cut]),
        None => token.to_owned(),
    }
}

/// Bodies longer than [`BODY_TRACE_LIMIT`] bytes are cut and suffixed with `...`.
#[must_use]
pub fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let cut = truncate_utf8(&text, BODY_TRACE_LIMIT);
    if cut.len() < text.len() {
        format!("{cut}{ELLIPSIS}")
    } else {
        cut.to_owned()
    }
}

/// Diagnostic sink shared by every call made through one client.
pub struct DebugTracer {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for DebugTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugTracer").finish_non_exhaustive()
    }
}

impl DebugTracer {
    #[must_use]
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    fn line(&self, args: fmt::Arguments<'_>) {
        let mut sink = self.sink.lock();
        // Sink failures never affect the request.
        writeln!(sink, "[DEBUG] {args}").ok();
        sink.flush().ok();
    }

    pub fn request(&self, method: &Method, url: &str, token: &str, body: Option<&[u8]>) {
        self.line(format_args!("{method} {url}"));
        self.line(format_args!("Authorization: Bearer {}", redact_token(token)));
        if let Some(body) = body {
            self.line(format_args!("Request Body: {}", truncate_body(body)));
        }
    }

    pub fn response(&self, status: StatusCode, elapsed: Duration, body: &[u8]) {
        self.line(format_args!(
            "Response: {} {} ({})",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            humantime::format_duration(elapsed)
        ));
        self.line(format_args!("Body: {}", truncate_body(body)));
    }

    pub fn retry(&self, wait: Duration, attempt: u32, max_attempts: u32) {
        self.line(format_args!(
            "Rate limited, retrying in {} (attempt {attempt}/{max_attempts})",
            humantime::format_duration(wait)
        ));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::SharedBuf;

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("sink closed"))
        }
    }

    #[test]
    fn test_long_token_shows_prefix_only() {
        let token = "0123456789abcdefghij";
        assert_eq!(token.len(), 20);
        assert_eq!(redact_token(token), "01234567...");
    }

    #[test]
    fn test_short_token_shown_whole() {
        assert_eq!(redact_token("abcd"), "abcd");
        assert_eq!(redact_token("12345678"), "12345678");
        assert_eq!(redact_token(""), "");
    }

    #[test]
    fn test_body_truncated_at_500_bytes() {
        let body = vec![b'a'; 600];
        let out = truncate_body(&body);
        assert_eq!(out.len(), 503);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..500], "a".repeat(500));
    }

    #[test]
    fn test_body_at_limit_untouched() {
        let body = vec![b'b'; 500];
        assert_eq!(truncate_body(&body), "b".repeat(500));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // two-byte chars; byte 3 falls inside the second one
        let s = "\u{e9}\u{e9}\u{e9}";
        assert_eq!(truncate_utf8(s, 3), "\u{e9}");
    }

    #[test]
    fn test_request_lines() {
        let buf = SharedBuf::default();
        let tracer = DebugTracer::new(Box::new(buf.clone()));

        tracer.request(
            &Method::POST,
            "https://app.asana.com/api/1.0/tasks",
            "0123456789abcdefghij",
            Some(br#"{"data":{}}"#),
        );

        let out = buf.contents();
        assert!(out.contains("[DEBUG] POST https://app.asana.com/api/1.0/tasks\n"));
        assert!(out.contains("[DEBUG] Authorization: Bearer 01234567...\n"));
        assert!(out.contains("[DEBUG] Request Body: {\"data\":{}}\n"));
        assert!(!out.contains("0123456789abcdefghij"));
    }

    #[test]
    fn test_response_and_retry_lines() {
        let buf = SharedBuf::default();
        let tracer = DebugTracer::new(Box::new(buf.clone()));

        tracer.response(StatusCode::TOO_MANY_REQUESTS, Duration::from_millis(12), b"{}");
        tracer.retry(Duration::from_secs(2), 1, 3);

        let out = buf.contents();
        assert!(out.contains("[DEBUG] Response: 429 Too Many Requests (12ms)\n"));
        assert!(out.contains("[DEBUG] Body: {}\n"));
        assert!(out.contains("[DEBUG] Rate limited, retrying in 2s (attempt 1/3)\n"));
    }

    #[test]
    fn test_sink_errors_are_ignored() {
        let tracer = DebugTracer::new(Box::new(BrokenSink));
        tracer.request(&Method::GET, "http://localhost/x", "tok", None);
        tracer.response(StatusCode::OK, Duration::ZERO, b"");
    }
}
