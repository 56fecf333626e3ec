//! Request construction shared by `EndpointProbe` and `ReachabilityCheck`.

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::infra::tls::{SecureChannelFactory, TlsProvider};
use crate::shared::PhaseObserver;
use crate::transport::{build_get_request, ensure_success, send, with_timeout, Target};
use http_body_util::Empty;
use hyper::{body::Bytes, Request};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Parses a candidate address, accepting a bracketed IPv6 literal.
pub(crate) fn parse_candidate(candidate: &str) -> Result<IpAddr> {
    let trimmed = candidate.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .parse()
        .map_err(|_| Error::InvalidAddress(candidate.to_string()))
}

/// Substitutes a candidate into a probe template, bracketing IPv6 literals.
pub fn candidate_url(template: &str, candidate: &str) -> Result<String> {
    let authority = match parse_candidate(candidate)? {
        IpAddr::V4(ip) => ip.to_string(),
        IpAddr::V6(ip) => format!("[{}]", ip),
    };
    Ok(template.replacen("{}", &authority, 1))
}

/// A probe request ready to be dispatched.
pub(crate) struct PreparedProbe {
    addr: SocketAddr,
    https: bool,
    request: Request<Empty<Bytes>>,
}

#[derive(Clone)]
pub(crate) struct CandidateDialer {
    config: ProbeConfig,
    channel: SecureChannelFactory,
}

impl CandidateDialer {
    pub fn new(config: ProbeConfig, provider: Arc<dyn TlsProvider>) -> Result<Self> {
        let channel = SecureChannelFactory::new(provider, &config.identity)?;
        Ok(Self { config, channel })
    }

    pub fn identity(&self) -> &str {
        &self.config.identity
    }

    /// Builds the request for `candidate`. The template must keep the
    /// candidate as the URL host, so the dial bypasses DNS.
    pub fn prepare(&self, candidate: &str) -> Result<PreparedProbe> {
        let url = candidate_url(&self.config.template, candidate)?;
        let target = Target::parse(&url)?;
        let ip = target.ip_literal().ok_or_else(|| {
            Error::InvalidUrl(format!("{}: probe template must use the address as host", url))
        })?;
        let request = build_get_request(&target.path_and_query(), &self.config.identity, &[])?;

        Ok(PreparedProbe {
            addr: SocketAddr::new(ip, target.port()),
            https: target.is_https(),
            request,
        })
    }

    /// Sends the request and waits for a 2xx status, bounded by the timeout.
    /// The response body is never read.
    pub async fn dispatch<O: PhaseObserver>(
        &self,
        prepared: PreparedProbe,
        observer: &mut O,
    ) -> Result<()> {
        let channel = prepared.https.then_some(&self.channel);
        with_timeout(self.config.timeout, async {
            let exchange = send(&[prepared.addr], channel, prepared.request, observer).await?;
            ensure_success(exchange.status())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROBE_TEMPLATE;
    use crate::infra::tls::RustlsTlsProvider;

    #[test]
    fn test_candidate_url_ipv4() {
        let url = candidate_url(DEFAULT_PROBE_TEMPLATE, "142.250.4.90").unwrap();
        assert_eq!(
            url,
            "https://142.250.4.90/translate_a/single?client=gtx&sl=en&tl=fr&q=a"
        );
    }

    #[test]
    fn test_candidate_url_brackets_ipv6() {
        let url = candidate_url(DEFAULT_PROBE_TEMPLATE, "2404:6800:4008:c06::5a").unwrap();
        assert!(url.starts_with("https://[2404:6800:4008:c06::5a]/translate_a/"));
        let bracketed = candidate_url(DEFAULT_PROBE_TEMPLATE, "[::1]").unwrap();
        assert!(bracketed.starts_with("https://[::1]/"));
    }

    #[test]
    fn test_rejects_hostnames_as_candidates() {
        let err = candidate_url(DEFAULT_PROBE_TEMPLATE, "translate.googleapis.com").unwrap_err();
        assert_eq!(err.code(), "INVALID_ADDRESS");
        assert!(parse_candidate("").is_err());
        assert!(parse_candidate("1.2.3").is_err());
    }

    #[test]
    fn test_prepare_sets_identity_host_header() {
        let dialer =
            CandidateDialer::new(ProbeConfig::default(), Arc::new(RustlsTlsProvider::new())).unwrap();
        let prepared = dialer.prepare("2001:db8::7").unwrap();
        assert!(prepared.https);
        assert_eq!(prepared.addr, "[2001:db8::7]:443".parse::<SocketAddr>().unwrap());
        assert_eq!(
            prepared.request.headers()[hyper::header::HOST],
            "translate.googleapis.com"
        );
        assert_eq!(
            prepared.request.uri(),
            "/translate_a/single?client=gtx&sl=en&tl=fr&q=a"
        );
    }

    #[test]
    fn test_template_without_address_host_is_rejected() {
        let config = ProbeConfig::default().with_template("https://example.com/?ip={}");
        let dialer = CandidateDialer::new(config, Arc::new(RustlsTlsProvider::new())).unwrap();
        assert_eq!(dialer.prepare("1.2.3.4").err().unwrap().code(), "INVALID_URL");
    }
}
