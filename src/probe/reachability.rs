//! Boolean reachability filter over candidate addresses.

use super::dialer::CandidateDialer;
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::infra::tls::{RustlsTlsProvider, TlsProvider};
use std::sync::Arc;

/// Pass/fail filter over candidate addresses, without timing.
#[derive(Clone)]
pub struct ReachabilityCheck {
    dialer: CandidateDialer,
}

impl ReachabilityCheck {
    /// Creates a new `ReachabilityCheck` instance trusting Mozilla's roots.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        Self::with_tls_provider(config, Arc::new(RustlsTlsProvider::new()))
    }

    pub fn with_tls_provider(config: ProbeConfig, provider: Arc<dyn TlsProvider>) -> Result<Self> {
        Ok(Self {
            dialer: CandidateDialer::new(config, provider)?,
        })
    }

    /// True if connect, handshake and a 2xx response complete in time.
    pub async fn check(&self, candidate: &str) -> bool {
        match self.dialer.prepare(candidate) {
            Ok(prepared) => self.dialer.dispatch(prepared, &mut ()).await.is_ok(),
            Err(_) => false,
        }
    }
}
