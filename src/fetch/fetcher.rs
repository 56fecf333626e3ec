//! Line-set fetching over plain or gzip-encoded HTTP(S) bodies.

use super::lines::normalize_lines;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::infra::dns::{DnsResolver, HickoryDnsResolver};
use crate::infra::tls::{RustlsTlsProvider, TlsProvider};
use crate::transport::{get, with_timeout, Target};
use hyper::header::ACCEPT_ENCODING;
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches a URL and returns its body as a set of trimmed lines.
///
/// Gzip transfer is requested and decoded transparently. Errors are never
/// retried.
pub struct ContentFetcher<R = HickoryDnsResolver> {
    config: FetchConfig,
    tls: Arc<dyn TlsProvider>,
    dns: R,
}

impl ContentFetcher {
    /// Creates a new `ContentFetcher` instance.
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            tls: Arc::new(RustlsTlsProvider::new()),
            dns: HickoryDnsResolver::new(),
        }
    }
}

impl Default for ContentFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl<R: DnsResolver> ContentFetcher<R> {
    pub fn with_tls_provider(mut self, provider: Arc<dyn TlsProvider>) -> Self {
        self.tls = provider;
        self
    }

    pub fn with_dns_resolver<D: DnsResolver>(self, dns: D) -> ContentFetcher<D> {
        ContentFetcher {
            config: self.config,
            tls: self.tls,
            dns,
        }
    }

    /// Fetches `url` and returns the decoded body's lines.
    pub async fn fetch_lines(&self, url: &str) -> Result<HashSet<String>> {
        let body = self.fetch_body(url).await?;
        let text = std::str::from_utf8(&body)
            .map_err(|e| Error::Decode(format!("body is not UTF-8: {}", e)))?;
        Ok(normalize_lines(text))
    }

    /// Fetches `url` and returns the body after content decoding.
    pub async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        let target = Target::parse(url)?;
        tracing::debug!(url, "Fetching");

        let fetched = with_timeout(
            self.config.timeout,
            get(
                target,
                &[(ACCEPT_ENCODING, "gzip")],
                &self.tls,
                &self.dns,
                self.config.max_redirects,
            ),
        )
        .await?;

        let body = fetched.decoded_body()?;
        tracing::debug!(
            url = %fetched.url,
            encoding = fetched.content_encoding().unwrap_or("identity"),
            bytes = body.len(),
            "Fetched body"
        );
        Ok(body)
    }
}

/// Convenience function for fetching lines with the default configuration.
pub async fn read_url(url: &str) -> Result<HashSet<String>> {
    ContentFetcher::default().fetch_lines(url).await
}
