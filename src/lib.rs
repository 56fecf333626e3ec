pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod probe;
pub mod resolver;
pub mod shared;

mod transport;

#[cfg(test)]
mod testing;

pub use config::{Config, DohConfig, FetchConfig, ProbeConfig, DEFAULT_CANDIDATES};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{read_url, ContentFetcher};
pub use infra::{SecureChannelFactory, TlsProvider};
pub use probe::{
    best, rank_candidates, EndpointProbe, FailureKind, ProbeFailure, ProbeOutcome, ProbeReport,
    Prober, ReachabilityCheck,
};
pub use resolver::{dns_query, FallbackResolver};
pub use shared::ProbeLatency;
