//! Request destinations parsed from URLs.

use crate::error::{Error, Result};
use crate::infra::dns::DnsResolver;
use crate::infra::tls::server_name;
use rustls_pki_types::ServerName;
use std::net::{IpAddr, SocketAddr};
use url::{Host, Url};

/// A parsed request destination.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    url: Url,
    host: Host<String>,
    port: u16,
    is_https: bool,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        Self::from_url(parsed)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        let is_https = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(Error::InvalidUrl(format!(
                    "{}: unsupported scheme {}",
                    url, other
                )))
            }
        };
        let host = url
            .host()
            .map(|h| h.to_owned())
            .ok_or_else(|| Error::InvalidUrl(format!("{}: URL has no host", url)))?;
        let port = url
            .port_or_known_default()
            .unwrap_or(if is_https { 443 } else { 80 });

        Ok(Self {
            url,
            host,
            port,
            is_https,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_https(&self) -> bool {
        self.is_https
    }

    /// Origin-form request target: path plus query.
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// `Host` header value; the port is included only when not the default.
    pub fn authority(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.to_string(),
        }
    }

    /// The host when it is an IP literal.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        match self.host {
            Host::Ipv4(ip) => Some(IpAddr::V4(ip)),
            Host::Ipv6(ip) => Some(IpAddr::V6(ip)),
            Host::Domain(_) => None,
        }
    }

    /// Name used for SNI and certificate validation.
    pub fn server_name(&self) -> Result<ServerName<'static>> {
        match (&self.host, self.ip_literal()) {
            (_, Some(ip)) => server_name(&ip.to_string()),
            (Host::Domain(domain), None) => server_name(domain),
            _ => Err(Error::InvalidServerName(self.host.to_string())),
        }
    }

    /// Every address the host resolves to, in resolver order.
    pub async fn socket_addrs<R: DnsResolver>(&self, resolver: &R) -> Result<Vec<SocketAddr>> {
        let ips = match (&self.host, self.ip_literal()) {
            (_, Some(ip)) => vec![ip],
            (host, None) => resolver.resolve(&host.to_string()).await?,
        };
        if ips.is_empty() {
            return Err(Error::Dns(format!("{}: no addresses", self.host)));
        }
        Ok(ips
            .into_iter()
            .map(|ip| SocketAddr::new(ip, self.port))
            .collect())
    }

    /// Resolves a `Location` header against this target.
    pub fn redirect(&self, location: &str) -> Result<Self> {
        let next = self
            .url
            .join(location)
            .map_err(|e| Error::InvalidUrl(format!("redirect to {}: {}", location, e)))?;
        Self::from_url(next)
    }
}
