//! Configuration for probes, DNS-over-HTTPS lookups and fetches.
//!
//! Every component takes its configuration by value at construction time.
//! `Config::from_env` assembles all of them from `ENDPOINT_SCOUT_*`
//! environment variables, falling back to the defaults below.

use std::env;
use std::time::Duration;

/// Logical service identity presented as `Host` and SNI.
pub const DEFAULT_IDENTITY: &str = "translate.googleapis.com";

/// Probe request template; `{}` is replaced by the (bracketed, for IPv6) address.
pub const DEFAULT_PROBE_TEMPLATE: &str =
    "https://{}/translate_a/single?client=gtx&sl=en&tl=fr&q=a";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2500);

pub const DEFAULT_DOH_SERVER: &str = "1.1.1.1";
pub const DEFAULT_DOH_PATH: &str = "/dns-query";
pub const DEFAULT_RECORD_TYPE: &str = "A";
pub const DEFAULT_DOH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(3500);

/// Maximum number of redirects followed by fetches and lookups.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

const ENV_PREFIX: &str = "ENDPOINT_SCOUT_";

/// Settings shared by `EndpointProbe` and `ReachabilityCheck`.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub identity: String,
    pub template: String,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            identity: DEFAULT_IDENTITY.to_string(),
            template: DEFAULT_PROBE_TEMPLATE.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ProbeConfig {
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for `FallbackResolver`.
#[derive(Debug, Clone)]
pub struct DohConfig {
    /// Authority of the DoH server, e.g. `1.1.1.1` or `dns.google:443`.
    pub server: String,
    pub path: String,
    pub record_type: String,
    /// Name looked up by `FallbackResolver::resolve`.
    pub name: String,
    pub timeout: Duration,
}

impl Default for DohConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_DOH_SERVER.to_string(),
            path: DEFAULT_DOH_PATH.to_string(),
            record_type: DEFAULT_RECORD_TYPE.to_string(),
            name: DEFAULT_IDENTITY.to_string(),
            timeout: DEFAULT_DOH_TIMEOUT,
        }
    }
}

impl DohConfig {
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for `ContentFetcher`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Complete configuration: per-component settings plus the candidate pool.
#[derive(Debug, Clone)]
pub struct Config {
    pub probe: ProbeConfig,
    pub doh: DohConfig,
    pub fetch: FetchConfig,
    pub candidates: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            doh: DohConfig::default(),
            fetch: FetchConfig::default(),
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Keys are the unprefixed names (`IDENTITY`, `CANDIDATES`, ...); the
    /// lookup receives them with the `ENDPOINT_SCOUT_` prefix applied.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |name: &str, default: Duration| {
            var(name)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let identity = var("IDENTITY").unwrap_or_else(|| DEFAULT_IDENTITY.to_string());

        let probe = ProbeConfig {
            identity: identity.clone(),
            template: var("PROBE_TEMPLATE").unwrap_or_else(|| DEFAULT_PROBE_TEMPLATE.to_string()),
            timeout: millis("PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT),
        };

        let doh = DohConfig {
            server: var("DOH_SERVER").unwrap_or_else(|| DEFAULT_DOH_SERVER.to_string()),
            path: var("DOH_PATH").unwrap_or_else(|| DEFAULT_DOH_PATH.to_string()),
            record_type: var("DOH_TYPE").unwrap_or_else(|| DEFAULT_RECORD_TYPE.to_string()),
            name: identity,
            timeout: millis("DOH_TIMEOUT_MS", DEFAULT_DOH_TIMEOUT),
        };

        let fetch = FetchConfig {
            timeout: millis("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT),
            ..FetchConfig::default()
        };

        let candidates = match var("CANDIDATES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            probe,
            doh,
            fetch,
            candidates,
        }
    }
}

/// Known front-end addresses serving the default identity.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "108.177.111.90", "108.177.122.90", "108.177.125.186", "108.177.126.90",
    "108.177.127.90", "108.177.97.100", "142.250.0.90", "142.250.1.90", "142.250.10.90",
    "142.250.100.90", "142.250.101.90", "142.250.102.90", "142.250.103.90",
    "142.250.105.90", "142.250.107.90", "142.250.11.90", "142.250.110.90",
    "142.250.111.90", "142.250.112.90", "142.250.113.90", "142.250.114.90",
    "142.250.115.90", "142.250.12.90", "142.250.123.90", "142.250.125.185",
    "142.250.125.90", "142.250.126.90", "142.250.128.90", "142.250.13.90",
    "142.250.136.90", "142.250.138.90", "142.250.141.90", "142.250.142.90",
    "142.250.145.90", "142.250.148.202", "142.250.152.90", "142.250.153.90",
    "142.250.157.183", "142.250.157.184", "142.250.157.186", "142.250.157.90",
    "142.250.158.90", "142.250.159.90", "142.250.185.174", "142.250.185.238",
    "142.250.189.206", "142.250.203.142", "142.250.217.185", "142.250.218.14",
    "142.250.27.90", "142.250.28.90", "142.250.30.90", "142.250.31.90", "142.250.4.185",
    "142.250.4.90", "142.250.8.90", "142.250.9.90", "142.250.96.90", "142.250.97.90",
    "142.250.98.90", "142.250.99.90", "142.251.0.90", "142.251.1.90", "142.251.10.138",
    "142.251.10.90", "142.251.107.90", "142.251.111.90", "142.251.112.90",
    "142.251.116.101", "142.251.116.90", "142.251.117.90", "142.251.12.185",
    "142.251.12.90", "142.251.120.90", "142.251.15.90", "142.251.16.185", "142.251.16.90",
    "142.251.160.90", "142.251.161.90", "142.251.162.90", "142.251.163.90",
    "142.251.166.90", "142.251.171.90", "142.251.172.195", "142.251.172.90",
    "142.251.173.90", "142.251.175.90", "142.251.177.90", "142.251.178.90",
    "142.251.179.90", "142.251.18.90", "142.251.2.90", "142.251.4.90", "142.251.40.174",
    "142.251.5.90", "142.251.6.90", "142.251.8.90", "142.251.9.90", "172.217.0.46",
    "172.217.13.142", "172.217.16.46", "172.217.192.90", "172.217.195.90",
    "172.217.203.90", "172.217.204.90", "172.217.214.90", "172.217.215.90",
    "172.217.218.90", "172.217.222.90", "172.217.31.142", "172.253.112.90",
    "172.253.113.90", "172.253.114.90", "172.253.115.90", "172.253.116.90",
    "172.253.117.90", "172.253.118.90", "172.253.119.90", "172.253.122.90",
    "172.253.123.90", "172.253.124.90", "172.253.125.90", "172.253.126.90",
    "172.253.127.90", "172.253.58.90", "172.253.62.90", "172.253.63.90", "216.239.32.40",
    "216.58.209.174", "216.58.214.14", "216.58.220.142", "216.58.227.65", "216.58.227.66",
    "216.58.227.67", "34.1.15.24", "64.233.189.191", "64.233.189.92", "74.125.196.113",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_vars() {
        let config = Config::from_vars(|_| None);
        assert_eq!(config.probe.identity, DEFAULT_IDENTITY);
        assert_eq!(config.probe.timeout, Duration::from_millis(2500));
        assert_eq!(config.doh.server, "1.1.1.1");
        assert_eq!(config.doh.name, DEFAULT_IDENTITY);
        assert_eq!(config.fetch.timeout, Duration::from_millis(3500));
        assert_eq!(config.candidates.len(), DEFAULT_CANDIDATES.len());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(lookup(&[
            ("ENDPOINT_SCOUT_IDENTITY", "api.example.com"),
            ("ENDPOINT_SCOUT_CANDIDATES", "10.0.0.1, ,2001:db8::1"),
            ("ENDPOINT_SCOUT_PROBE_TIMEOUT_MS", "800"),
            ("ENDPOINT_SCOUT_DOH_TYPE", "AAAA"),
        ]));
        assert_eq!(config.probe.identity, "api.example.com");
        assert_eq!(config.doh.name, "api.example.com");
        assert_eq!(config.doh.record_type, "AAAA");
        assert_eq!(config.probe.timeout, Duration::from_millis(800));
        assert_eq!(config.candidates, vec!["10.0.0.1", "2001:db8::1"]);
    }

    #[test]
    fn test_unparseable_timeout_falls_back() {
        let config = Config::from_vars(lookup(&[("ENDPOINT_SCOUT_FETCH_TIMEOUT_MS", "soon")]));
        assert_eq!(config.fetch.timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_default_candidates_are_ip_literals() {
        for candidate in DEFAULT_CANDIDATES {
            assert!(candidate.parse::<std::net::IpAddr>().is_ok(), "{candidate}");
        }
    }
}
