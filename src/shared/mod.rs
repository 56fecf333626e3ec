//! Shared utilities used by the probe and fetch paths.

pub mod timing;

pub use timing::{PhaseObserver, PhaseTiming, ProbeLatency};
