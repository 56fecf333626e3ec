//! GET with redirect following, used by the fetch and DoH paths.

use super::exchange::{build_get_request, ensure_success, send};
use super::target::Target;
use crate::error::{Error, Result};
use crate::infra::decompressor::decompress_body;
use crate::infra::dns::DnsResolver;
use crate::infra::tls::{SecureChannelFactory, TlsProvider};
use crate::shared::PhaseTiming;
use hyper::{
    body::Bytes,
    header::{HeaderName, CONTENT_ENCODING, LOCATION},
    HeaderMap,
};
use std::sync::Arc;
use url::Url;

/// A completed 2xx response.
#[derive(Debug)]
pub(crate) struct Fetched {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Fetched {
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
    }

    /// Body decoded according to `Content-Encoding`.
    pub fn decoded_body(&self) -> Result<Vec<u8>> {
        decompress_body(&self.body, self.content_encoding())
    }
}

/// Sends a GET to `target`, following up to `max_redirects` redirects.
/// Statuses outside 2xx (other than followed redirects) are errors.
pub(crate) async fn get<R: DnsResolver>(
    target: Target,
    headers: &[(HeaderName, &str)],
    tls: &Arc<dyn TlsProvider>,
    resolver: &R,
    max_redirects: usize,
) -> Result<Fetched> {
    let mut target = target;
    let mut hops = 0;

    loop {
        let addrs = target.socket_addrs(resolver).await?;
        let channel = if target.is_https() {
            Some(SecureChannelFactory::for_server_name(
                Arc::clone(tls),
                target.server_name()?,
            ))
        } else {
            None
        };
        let request = build_get_request(&target.path_and_query(), &target.authority(), headers)?;

        tracing::debug!(url = %target.url(), addresses = addrs.len(), "Sending request");
        let mut timing = PhaseTiming::start();
        let exchange = send(&addrs, channel.as_ref(), request, &mut timing).await?;
        let status = exchange.status();
        tracing::debug!(
            url = %target.url(),
            status = status.as_u16(),
            elapsed_ms = timing.latency().total.as_millis() as u64,
            "Response headers received"
        );

        if status.is_redirection() {
            if let Some(location) = exchange.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                if hops >= max_redirects {
                    return Err(Error::TooManyRedirects);
                }
                hops += 1;
                let next = target.redirect(location)?;
                tracing::debug!(from = %target.url(), to = %next.url(), "Following redirect");
                target = next;
                continue;
            }
        }

        ensure_success(status)?;
        let (headers, body) = exchange.into_body().await?;
        return Ok(Fetched {
            url: target.url().clone(),
            headers,
            body,
        });
    }
}
