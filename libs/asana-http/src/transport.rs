//! The network seam: one buffered request in, one buffered response out.
//!
//! The executor talks to the network only through [`Transport`], so tests can
//! substitute a scripted fake. [`HyperTransport`] is the production
//! implementation over hyper + rustls.

use asana_errors::BoxError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full, Limited};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tower::ServiceExt;
use tower_http::decompression::Decompression;

use crate::config::{ClientConfig, TransportSecurity};
use crate::tls;

/// Failure below the HTTP status layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, reset)
    #[error("{0}")]
    Dispatch(#[source] BoxError),

    /// Headers arrived but the body could not be read in full
    #[error("{0}")]
    ReadBody(#[source] BoxError),
}

/// Sends one request and returns the fully buffered response.
///
/// Every HTTP status, including 4xx and 5xx, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`TransportError::Dispatch`] when no response was received and
    /// [`TransportError::ReadBody`] when the response body could not be read.
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// hyper-util pooled client behind transparent gzip/br/deflate decompression.
#[derive(Clone)]
pub struct HyperTransport {
    service: Decompression<HyperClient>,
    max_body_size: usize,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// # Errors
    ///
    /// Returns an error if the TLS connector cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, BoxError> {
        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                "insecure HTTP enabled (TransportSecurity::AllowInsecureHttp); \
                 use only for testing with mock servers"
            );
        }

        let https = tls::build_https_connector(config.tls_roots, config.transport)?;

        // pool_timer is required for idle connections to expire
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build::<_, Full<Bytes>>(https);

        Ok(Self {
            service: Decompression::new(client),
            max_body_size: config.max_body_size,
        })
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let request = request.map(Full::new);

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| TransportError::Dispatch(Box::new(e)))?;

        let (parts, body) = response.into_parts();
        let bytes = Limited::new(body, self.max_body_size)
            .collect()
            .await
            .map_err(TransportError::ReadBody)?
            .to_bytes();

        Ok(Response::from_parts(parts, bytes))
    }
}
