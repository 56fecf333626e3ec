//! Latency probing and reachability checks of candidate addresses.
//!
//! A probe dials a candidate IP directly, presents the configured identity
//! as `Host` and SNI, and measures the time until response headers arrive.
//! Failures are returned as data.

pub mod dialer;
pub mod endpoint;
pub mod outcome;
pub mod ranking;
pub mod reachability;

pub use dialer::candidate_url;
pub use endpoint::EndpointProbe;
pub use outcome::{FailureKind, ProbeFailure, ProbeOutcome};
pub use ranking::{best, rank_candidates, ProbeReport, Prober};
pub use reachability::ReachabilityCheck;
