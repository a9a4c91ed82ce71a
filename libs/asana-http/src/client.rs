use std::io::Write;
use std::sync::Arc;

use asana_errors::{BoxError, CliError};
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backoff::Jitter;
use crate::classify::classify;
use crate::config::ClientConfig;
use crate::request::RequestDescriptor;
use crate::response::{format_retry_after, parse_retry_after};
use crate::trace::DebugTracer;
use crate::transport::{HyperTransport, Transport, TransportError};

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, thiserror::Error)]
#[error("operation was cancelled")]
struct Cancelled;

/// Builder for [`AsanaClient`].
pub struct AsanaClientBuilder {
    config: ClientConfig,
    debug_sink: Option<Box<dyn Write + Send>>,
    jitter_seed: Option<u64>,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for AsanaClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsanaClientBuilder")
            .field("config", &self.config)
            .field("debug", &self.debug_sink.is_some())
            .field("jitter_seed", &self.jitter_seed)
            .finish_non_exhaustive()
    }
}

impl AsanaClientBuilder {
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            debug_sink: None,
            jitter_seed: None,
            transport: None,
        }
    }

    /// Enable the `[DEBUG]` trace and send it to `sink`.
    #[must_use]
    pub fn debug_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.debug_sink = Some(Box::new(sink));
        self
    }

    /// Seed the jitter source so backoff waits are reproducible.
    #[must_use]
    pub fn jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Replace the hyper transport, e.g. with a scripted fake.
    #[must_use]
    pub fn transport_impl(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// # Errors
    ///
    /// Returns a general error if the default transport cannot be built
    /// (for example no usable native root certificates).
    pub fn build(self) -> Result<AsanaClient, CliError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HyperTransport::new(&self.config)
                    .map_err(|e| CliError::general_with("failed to create HTTP transport", e))?,
            ),
        };

        let jitter = self
            .jitter_seed
            .map_or_else(Jitter::from_entropy, Jitter::from_seed);

        Ok(AsanaClient {
            config: self.config,
            transport,
            tracer: self.debug_sink.map(DebugTracer::new),
            jitter,
        })
    }
}

/// Client for the Asana REST API.
///
/// Every call goes through [`AsanaClient::execute`], which owns
/// authentication, rate-limit retries, cancellation, tracing and error
/// classification. Calls made concurrently share only the configuration and
/// the jitter source.
pub struct AsanaClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    tracer: Option<DebugTracer>,
    jitter: Jitter,
}

impl std::fmt::Debug for AsanaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsanaClient")
            .field("config", &self.config)
            .field("debug", &self.tracer.is_some())
            .finish_non_exhaustive()
    }
}

impl AsanaClient {
    #[must_use]
    pub fn builder(config: ClientConfig) -> AsanaClientBuilder {
        AsanaClientBuilder::with_config(config)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run one logical call and decode the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Returns exactly one [`CliError`] on failure; see [`AsanaClient::execute_raw`].
    /// A 2xx body that does not decode as `T` is a general error.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T, CliError> {
        let body = self.execute_raw(request, cancel).await?;
        serde_json::from_slice(&body)
            .map_err(|e| CliError::general_with("failed to parse response", e))
    }

    /// Run one logical call and discard the response body.
    ///
    /// # Errors
    ///
    /// See [`AsanaClient::execute_raw`].
    pub async fn execute_unit(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        self.execute_raw(request, cancel).await.map(drop)
    }

    /// Run one logical call and return the raw 2xx body.
    ///
    /// Only 429 is retried, up to `backoff.max_attempts` times after the
    /// initial dispatch. Every dispatch and every backoff wait observes
    /// `cancel`.
    ///
    /// # Errors
    ///
    /// - network error: transport failure, body read failure, dispatch
    ///   timeout, or cancellation
    /// - rate limited: 429 after the retry budget is spent
    /// - auth failure / not found / general: non-2xx, via [`classify`]
    pub async fn execute_raw(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Bytes, CliError> {
        let url = format!("{}{}", self.config.base_url, request.path());
        let policy = self.config.backoff;
        let mut attempt: u32 = 0;

        loop {
            let outbound = self.build_request(request, &url)?;

            if let Some(tracer) = &self.tracer {
                tracer.request(
                    request.method(),
                    &url,
                    self.config.token.expose_secret(),
                    request.body_bytes().map(|b| &b[..]),
                );
            }
            tracing::debug!(method = %request.method(), url = %url, attempt, "dispatching request");

            let start = Instant::now();
            let response = self.dispatch(outbound, cancel).await?;
            let elapsed = start.elapsed();
            let (parts, body) = response.into_parts();

            if let Some(tracer) = &self.tracer {
                tracer.response(parts.status, elapsed, &body);
            }

            if parts.status == StatusCode::TOO_MANY_REQUESTS {
                let hint = parse_retry_after(&parts.headers);

                if attempt >= policy.max_attempts {
                    tracing::debug!(
                        dispatches = attempt + 1,
                        "rate limit retry budget exhausted"
                    );
                    let hint = hint.map(format_retry_after);
                    return Err(CliError::rate_limited(hint.as_deref()));
                }

                self.back_off(attempt, hint, cancel).await?;
                attempt += 1;
                continue;
            }

            if !parts.status.is_success() {
                let err = classify(parts.status, &body, request.resource_name());
                tracing::debug!(
                    status = parts.status.as_u16(),
                    code = err.code(),
                    "request failed"
                );
                return Err(err);
            }

            return Ok(body);
        }
    }

    /// Sleep before retry `attempt + 1`, unless `cancel` fires first.
    async fn back_off(
        &self,
        attempt: u32,
        hint: Option<std::time::Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let policy = self.config.backoff;
        let wait = self.jitter.wait(&policy, attempt, hint);
        if let Some(tracer) = &self.tracer {
            tracer.retry(wait, attempt + 1, policy.max_attempts);
        }
        tracing::debug!(
            retry = attempt + 1,
            backoff_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            server_hint = hint.is_some(),
            "rate limited, backing off"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CliError::network("request cancelled", Cancelled)),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }

    fn build_request(
        &self,
        request: &RequestDescriptor,
        url: &str,
    ) -> Result<Request<Bytes>, CliError> {
        let failed = |e: BoxError| CliError::general_with("failed to create request", e);

        let mut auth =
            HeaderValue::try_from(format!("Bearer {}", self.config.token.expose_secret()))
                .map_err(|e| failed(e.into()))?;
        auth.set_sensitive(true);

        let mut builder = Request::builder()
            .method(request.method().clone())
            .uri(url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, APPLICATION_JSON);
        if request.body_bytes().is_some() {
            builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
        }

        builder
            .body(request.body_bytes().cloned().unwrap_or_default())
            .map_err(|e| failed(e.into()))
    }

    async fn dispatch(
        &self,
        request: Request<Bytes>,
        cancel: &CancellationToken,
    ) -> Result<Response<Bytes>, CliError> {
        let send = tokio::time::timeout(self.config.timeout, self.transport.send(request));

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(CliError::network("request cancelled", Cancelled));
            }
            outcome = send => outcome,
        };

        match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(TransportError::Dispatch(e))) => Err(CliError::network("request failed", e)),
            Ok(Err(TransportError::ReadBody(e))) => {
                Err(CliError::network("failed to read response", e))
            }
            Err(elapsed) => Err(CliError::network("request failed", elapsed)),
        }
    }
}
