//! TLS/SSL infrastructure.
//!
//! Provides trait-based abstractions for TLS configuration and a factory for
//! connections whose SNI and certificate identity are fixed independently of
//! the socket address that is dialed.

use crate::error::{Error, Result};
use rustls::crypto::ring;
use rustls_pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};

/// Trait for TLS configuration providers.
///
/// This abstraction allows for different trust anchors and makes testing
/// possible against endpoints with private certificates.
pub trait TlsProvider: Send + Sync {
    /// Creates a new TLS client configuration.
    fn client_config(&self) -> Result<Arc<rustls::ClientConfig>>;

    /// Creates a TLS connector from this provider's configuration.
    fn connector(&self) -> Result<TlsConnector> {
        Ok(TlsConnector::from(self.client_config()?))
    }
}

/// Default TLS provider using Mozilla's root certificates.
#[derive(Default)]
pub struct RustlsTlsProvider;

impl RustlsTlsProvider {
    /// Creates a new `RustlsTlsProvider` instance.
    pub fn new() -> Self {
        Self
    }
}

impl TlsProvider for RustlsTlsProvider {
    fn client_config(&self) -> Result<Arc<rustls::ClientConfig>> {
        create_tls_config(rustls::RootCertStore::from_iter(
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
        ))
    }
}

/// TLS provider trusting an explicit set of root certificates.
#[derive(Clone)]
pub struct CustomRootsTlsProvider {
    roots: rustls::RootCertStore,
}

impl CustomRootsTlsProvider {
    /// Creates a new `CustomRootsTlsProvider` instance.
    pub fn new(roots: rustls::RootCertStore) -> Self {
        Self { roots }
    }
}

impl TlsProvider for CustomRootsTlsProvider {
    fn client_config(&self) -> Result<Arc<rustls::ClientConfig>> {
        create_tls_config(self.roots.clone())
    }
}

/// Creates a TLS client configuration over the given roots.
///
/// This configuration:
/// - Uses the ring crypto provider explicitly, so no process-wide default is needed
/// - Does not use client authentication
/// - Supports TLS 1.2 and TLS 1.3
pub fn create_tls_config(roots: rustls::RootCertStore) -> Result<Arc<rustls::ClientConfig>> {
    let config = rustls::ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

/// Parses a host name or IP literal into a rustls server name.
pub fn server_name(identity: &str) -> Result<ServerName<'static>> {
    let trimmed = identity.trim_start_matches('[').trim_end_matches(']');
    ServerName::try_from(trimmed.to_string())
        .map_err(|e| Error::InvalidServerName(format!("{}: {}", identity, e)))
}

/// Opens TLS sessions that present a fixed identity.
///
/// The identity is sent as SNI and is the name the peer certificate must be
/// valid for, whatever address the underlying TCP stream was dialed to.
/// Each handshake builds its own client configuration.
#[derive(Clone)]
pub struct SecureChannelFactory {
    provider: Arc<dyn TlsProvider>,
    identity: ServerName<'static>,
}

impl SecureChannelFactory {
    /// Creates a new `SecureChannelFactory` instance presenting `identity`.
    pub fn new(provider: Arc<dyn TlsProvider>, identity: &str) -> Result<Self> {
        Ok(Self::for_server_name(provider, server_name(identity)?))
    }

    pub fn for_server_name(provider: Arc<dyn TlsProvider>, identity: ServerName<'static>) -> Self {
        Self { provider, identity }
    }

    /// Factory over Mozilla's roots.
    pub fn with_default_roots(identity: &str) -> Result<Self> {
        Self::new(Arc::new(RustlsTlsProvider::new()), identity)
    }

    pub fn identity(&self) -> &ServerName<'static> {
        &self.identity
    }

    /// Builds a fresh client configuration for one connection.
    pub fn client_config(&self) -> Result<Arc<rustls::ClientConfig>> {
        self.provider.client_config()
    }

    /// Performs the TLS handshake over an established TCP connection.
    pub async fn connect(&self, tcp_stream: TcpStream) -> Result<TlsStream<TcpStream>> {
        let connector = self.provider.connector()?;
        connector
            .connect(self.identity.clone(), tcp_stream)
            .await
            .map_err(Error::Tls)
    }
}
