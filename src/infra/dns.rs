//! DNS resolution infrastructure.
//!
//! Provides a trait-based abstraction for DNS resolution of fetch and DoH
//! hosts, allowing for dependency injection and easier testing.

use crate::error::{Error, Result};
use hickory_resolver::{config::*, error::ResolveError, system_conf, TokioAsyncResolver};
use std::net::IpAddr;

/// Trait for DNS resolution.
#[allow(async_fn_in_trait)]
pub trait DnsResolver: Send + Sync {
    /// Resolves a hostname to a non-empty list of IP addresses.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// Picks the host's configured name servers, or hickory's built-in defaults
/// when the system configuration cannot be read.
fn resolver_settings<F>(read_system: F) -> (ResolverConfig, ResolverOpts)
where
    F: FnOnce() -> std::result::Result<(ResolverConfig, ResolverOpts), ResolveError>,
{
    match read_system() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("System resolver configuration unavailable, using defaults: {}", e);
            (ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

/// DNS resolver implementation using hickory-resolver over the system
/// resolver configuration. A resolver is built per lookup; nothing is cached
/// across calls.
#[derive(Default, Clone)]
pub struct HickoryDnsResolver;

impl HickoryDnsResolver {
    /// Creates a new `HickoryDnsResolver` instance.
    pub fn new() -> Self {
        Self
    }
}

impl DnsResolver for HickoryDnsResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let (config, opts) = resolver_settings(system_conf::read_system_conf);
        let resolver = TokioAsyncResolver::tokio(config, opts);
        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| Error::Dns(format!("{}: {}", host, e)))?;

        let ips: Vec<IpAddr> = response.iter().collect();
        if ips.is_empty() {
            return Err(Error::Dns(format!("{}: no addresses", host)));
        }
        tracing::debug!(host, count = ips.len(), "Resolved host");
        Ok(ips)
    }
}
