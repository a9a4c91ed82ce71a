//! HTTPS connector for the Asana transport.
//!
//! The OS trust store is read at most once per process.

use std::sync::{Arc, OnceLock};

use asana_errors::BoxError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::RootCertStore;
use rustls_pki_types::CertificateDer;

use crate::config::{TlsRootConfig, TransportSecurity};

static OS_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

fn read_os_roots() -> Vec<CertificateDer<'static>> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "skipping unreadable OS root certificate");
    }
    match loaded.certs.len() {
        0 => tracing::warn!("OS trust store is empty; native TLS roots unavailable"),
        count => tracing::debug!(count, "OS trust store read"),
    }
    loaded.certs
}

fn os_roots() -> &'static [CertificateDer<'static>] {
    OS_ROOTS.get_or_init(read_os_roots)
}

/// The process-wide rustls provider when one is installed, aws-lc-rs otherwise.
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn trust_anchors(certs: &[CertificateDer<'static>]) -> Result<RootCertStore, BoxError> {
    if certs.is_empty() {
        return Err("cannot use native TLS roots: the OS trust store is empty".into());
    }
    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(certs.iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "dropped OS root certificates rustls could not parse");
    }
    if added == 0 {
        return Err(
            format!("cannot use native TLS roots: none of {ignored} OS certificates parsed").into(),
        );
    }
    Ok(store)
}

/// Connector for the chosen trust roots. Plain `http://` is only accepted
/// with `TransportSecurity::AllowInsecureHttp`.
///
/// # Errors
///
/// Fails when the provider rejects its default protocol versions, or when
/// native roots are requested and the OS offers no usable certificate.
pub fn build_https_connector(
    tls_roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, BoxError> {
    let provider = crypto_provider();
    let builder = match tls_roots {
        TlsRootConfig::WebPki => {
            hyper_rustls::HttpsConnectorBuilder::new().with_provider_and_webpki_roots(provider)?
        }
        TlsRootConfig::Native => {
            let tls = rustls::ClientConfig::builder_with_provider(provider)
                .with_safe_default_protocol_versions()?
                .with_root_certificates(trust_anchors(os_roots())?)
                .with_no_client_auth();
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };

    Ok(match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    })
}
