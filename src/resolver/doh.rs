//! DNS-over-HTTPS JSON lookups.

use super::types::DohReply;
use crate::config::{DohConfig, DEFAULT_MAX_REDIRECTS};
use crate::error::{Error, Result};
use crate::infra::dns::{DnsResolver, HickoryDnsResolver};
use crate::infra::tls::{RustlsTlsProvider, TlsProvider};
use crate::transport::{get, with_timeout, Target};
use hyper::header::ACCEPT;
use serde_json::error::Category;
use std::sync::Arc;
use url::Url;

const DNS_JSON: &str = "application/dns-json";

/// Looks up address records through a DNS-over-HTTPS JSON endpoint.
///
/// Unlike probing, every failure is returned as an error: a lookup that
/// cannot be answered blocks the caller.
pub struct FallbackResolver<R = HickoryDnsResolver> {
    config: DohConfig,
    tls: Arc<dyn TlsProvider>,
    dns: R,
}

impl FallbackResolver {
    /// Creates a new `FallbackResolver` instance.
    pub fn new(config: DohConfig) -> Self {
        Self {
            config,
            tls: Arc::new(RustlsTlsProvider::new()),
            dns: HickoryDnsResolver::new(),
        }
    }
}

impl<R: DnsResolver> FallbackResolver<R> {
    pub fn with_tls_provider(mut self, provider: Arc<dyn TlsProvider>) -> Self {
        self.tls = provider;
        self
    }

    /// Replaces the resolver used when the DoH server is given by name.
    pub fn with_dns_resolver<D: DnsResolver>(self, dns: D) -> FallbackResolver<D> {
        FallbackResolver {
            config: self.config,
            tls: self.tls,
            dns,
        }
    }

    /// Looks up the configured name.
    pub async fn resolve(&self) -> Result<Vec<String>> {
        self.lookup(&self.config.name).await
    }

    /// Returns the `data` of every answer, in server order. A reply without
    /// an `Answer` section yields an empty list.
    pub async fn lookup(&self, name: &str) -> Result<Vec<String>> {
        let url = self.query_url(name)?;
        tracing::debug!(%url, "DoH query");

        let fetched = with_timeout(
            self.config.timeout,
            get(
                Target::from_url(url)?,
                &[(ACCEPT, DNS_JSON)],
                &self.tls,
                &self.dns,
                DEFAULT_MAX_REDIRECTS,
            ),
        )
        .await?;

        let answers = parse_answers(&fetched.decoded_body()?)?;
        tracing::debug!(name, count = answers.len(), "DoH answers");
        Ok(answers)
    }

    /// `https://{server}{path}?name={name}&type={type}`
    pub fn query_url(&self, name: &str) -> Result<Url> {
        let base = format!("https://{}{}", self.config.server, self.config.path);
        let mut url = Url::parse(&base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", &self.config.record_type);
        Ok(url)
    }
}

/// Extracts answer data from a DoH JSON body.
pub fn parse_answers(body: &[u8]) -> Result<Vec<String>> {
    let reply: DohReply = serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => Error::MalformedResponse(format!("unexpected DoH reply: {}", e)),
        _ => Error::Decode(format!("invalid DoH JSON: {}", e)),
    })?;

    if let Some(status) = reply.status.filter(|s| *s != 0) {
        tracing::debug!(rcode = status, "DoH reply carries non-zero status");
    }

    Ok(reply
        .answer
        .unwrap_or_default()
        .into_iter()
        .map(|answer| answer.data)
        .collect())
}

/// Convenience function for a lookup with the default configuration.
pub async fn dns_query(name: &str) -> Result<Vec<String>> {
    FallbackResolver::new(DohConfig::default()).lookup(name).await
}
