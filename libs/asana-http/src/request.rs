use asana_errors::CliError;
use bytes::Bytes;
use http::Method;
use serde::Serialize;

/// Resource name used in `"<resource> not found"` when none is given.
pub const DEFAULT_RESOURCE: &str = "resource";

/// One logical call: method, path relative to the base URL, optional JSON body.
///
/// The body is reference-counted, so every retry re-sends the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    body: Option<Bytes>,
    resource: &'static str,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            resource: DEFAULT_RESOURCE,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach an already-encoded JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a general error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, CliError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| CliError::general_with("failed to encode request body", e))?;
        Ok(self.body(bytes))
    }

    /// Name used for the not-found message of this call.
    #[must_use]
    pub fn resource(mut self, name: &'static str) -> Self {
        self.resource = name;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn resource_name(&self) -> &'static str {
        self.resource
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = RequestDescriptor::get("/users/me");
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/users/me");
        assert!(req.body_bytes().is_none());
        assert_eq!(req.resource_name(), "resource");
    }

    #[test]
    fn test_json_body() {
        let req = RequestDescriptor::post("/tasks/1/stories")
            .json(&serde_json::json!({"data": {"text": "hi"}}))
            .unwrap()
            .resource("task");

        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.body_bytes().map(|b| &b[..]),
            Some(br#"{"data":{"text":"hi"}}"#.as_slice())
        );
        assert_eq!(req.resource_name(), "task");
    }

    #[test]
    fn test_clone_shares_body() {
        let req = RequestDescriptor::put("/tasks/1").body(Bytes::from_static(b"{}"));
        let copy = req.clone();
        assert_eq!(req, copy);
        assert_eq!(
            req.body_bytes().map(|b| b.as_ptr()),
            copy.body_bytes().map(|b| b.as_ptr())
        );
    }
}
