//! One-shot concurrent probing of a candidate pool.

use super::endpoint::EndpointProbe;
use super::outcome::ProbeOutcome;
use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Anything that can probe a candidate address.
///
/// This abstraction lets ranking run against mock probers in tests.
pub trait Prober: Send + Sync {
    fn measure<'a>(
        &'a self,
        candidate: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>>;
}

impl Prober for EndpointProbe {
    fn measure<'a>(
        &'a self,
        candidate: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>> {
        Box::pin(self.probe(candidate))
    }
}

/// Outcome for a single candidate.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub candidate: String,
    pub outcome: ProbeOutcome,
}

/// Probes every candidate concurrently, one task each.
///
/// Reachable candidates come first, fastest first; failures follow in input
/// order.
pub async fn rank_candidates<P, I, S>(prober: Arc<P>, candidates: I) -> Vec<ProbeReport>
where
    P: Prober + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tasks = JoinSet::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let prober = Arc::clone(&prober);
        let candidate: String = candidate.into();
        tasks.spawn(async move {
            let outcome = prober.measure(&candidate).await;
            (index, ProbeReport { candidate, outcome })
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => tracing::warn!("Probe task failed: {}", e),
        }
    }

    reports.sort_by(|(a_index, a), (b_index, b)| {
        match (a.outcome.latency(), b.outcome.latency()) {
            (Some(a_latency), Some(b_latency)) => a_latency
                .total
                .cmp(&b_latency.total)
                .then(a_index.cmp(b_index)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a_index.cmp(b_index),
        }
    });

    let reachable = reports.iter().filter(|(_, r)| r.outcome.is_reachable()).count();
    tracing::debug!(total = reports.len(), reachable, "Ranked candidates");

    reports.into_iter().map(|(_, report)| report).collect()
}

/// The fastest reachable candidate.
pub fn best(reports: &[ProbeReport]) -> Option<&ProbeReport> {
    reports
        .iter()
        .filter_map(|r| r.outcome.latency().map(|latency| (latency.total, r)))
        .min_by_key(|(total, _)| *total)
        .map(|(_, r)| r)
}
