//! Latency measurement against candidate addresses under a fixed identity.

use super::dialer::CandidateDialer;
use super::outcome::ProbeOutcome;
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::infra::tls::{RustlsTlsProvider, TlsProvider};
use crate::shared::PhaseTiming;
use std::sync::Arc;

/// Measures connection plus header round-trip time to candidate addresses.
#[derive(Clone)]
pub struct EndpointProbe {
    dialer: CandidateDialer,
}

impl EndpointProbe {
    /// Creates a probe validating certificates against Mozilla's roots.
    ///
    /// Fails only if the configured identity is not a valid server name.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        Self::with_tls_provider(config, Arc::new(RustlsTlsProvider::new()))
    }

    pub fn with_tls_provider(config: ProbeConfig, provider: Arc<dyn TlsProvider>) -> Result<Self> {
        Ok(Self {
            dialer: CandidateDialer::new(config, provider)?,
        })
    }

    pub fn identity(&self) -> &str {
        self.dialer.identity()
    }

    /// Probes one candidate address. Every failure, including an invalid
    /// address, is reported in the outcome.
    ///
    /// Redirects are not followed: a 3xx answer is reported as
    /// `Failed` with `FailureKind::Status`, like any other non-2xx status.
    pub async fn probe(&self, candidate: &str) -> ProbeOutcome {
        let prepared = match self.dialer.prepare(candidate) {
            Ok(prepared) => prepared,
            Err(e) => return e.into(),
        };

        let mut timing = PhaseTiming::start();
        let outcome = match self.dialer.dispatch(prepared, &mut timing).await {
            Ok(()) => ProbeOutcome::Reachable(timing.latency()),
            Err(e) => e.into(),
        };

        match &outcome {
            ProbeOutcome::Reachable(latency) => tracing::debug!(
                candidate,
                identity = self.identity(),
                latency_ms = latency.total.as_millis() as u64,
                "Probe succeeded"
            ),
            ProbeOutcome::Failed(failure) => tracing::debug!(
                candidate,
                identity = self.identity(),
                kind = ?failure.kind,
                error = %failure,
                "Probe failed"
            ),
        }
        outcome
    }
}
