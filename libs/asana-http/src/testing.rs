//! Test doubles shared by the unit tests of this crate.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use parking_lot::Mutex;

use crate::transport::{Transport, TransportError};

/// In-memory sink whose contents stay readable after the tracer takes it.
#[derive(Clone, Default)]
pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// What the fake saw for one dispatch.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder =
    dyn Fn(usize, &Recorded) -> Result<Response<Bytes>, TransportError> + Send + Sync;

/// Scripted transport: answers dispatch `n` (0-based) with `respond(n, request)`.
pub struct FakeTransport {
    respond: Box<Responder>,
    delay: Option<Duration>,
    seen: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(usize, &Recorded) -> Result<Response<Bytes>, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(respond),
            delay: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Same script, but every dispatch first sleeps for `delay`.
    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let Ok(inner) = Arc::try_unwrap(self) else {
            panic!("with_delay must be called before the fake is shared");
        };
        Arc::new(Self {
            delay: Some(delay),
            ..inner
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let (parts, body) = request.into_parts();
        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        };

        let call = {
            let mut seen = self.seen.lock();
            seen.push(recorded.clone());
            seen.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.respond)(call, &recorded)
    }
}

pub fn status_response(status: u16, body: &str) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(body.to_owned()));
    *response.status_mut() = StatusCode::from_u16(status).unwrap();
    response
}

pub fn json_response(body: &str) -> Response<Bytes> {
    let mut response = status_response(200, body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
