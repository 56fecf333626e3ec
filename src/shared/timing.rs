//! Timing utilities for probe measurements.
//!
//! Tracks the phases of a single exchange: TCP connect, TLS handshake and
//! the wait for response headers. The body is never part of a measurement.

use std::time::{Duration, Instant};

/// Elapsed time of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeLatency {
    /// From just before the TCP connect until response headers arrived.
    pub total: Duration,
    /// TCP connect duration.
    pub connect: Duration,
    /// TLS handshake duration, absent for plain HTTP templates.
    pub tls: Option<Duration>,
}

impl ProbeLatency {
    pub fn as_secs_f64(&self) -> f64 {
        self.total.as_secs_f64()
    }
}

/// Phase timestamps for one exchange.
#[derive(Debug)]
pub struct PhaseTiming {
    pub started: Instant,
    pub connected: Option<Instant>,
    pub tls_start: Option<Instant>,
    pub tls_end: Option<Instant>,
    pub headers: Option<Instant>,
}

impl PhaseTiming {
    /// Starts the clock. Call immediately before opening the connection.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            connected: None,
            tls_start: None,
            tls_end: None,
            headers: None,
        }
    }

    pub fn mark_connected(&mut self) {
        self.connected = Some(Instant::now());
    }

    pub fn start_tls(&mut self) {
        self.tls_start = Some(Instant::now());
    }

    pub fn end_tls(&mut self) {
        self.tls_end = Some(Instant::now());
    }

    pub fn mark_headers(&mut self) {
        self.headers = Some(Instant::now());
    }

    /// Converts the phase timestamps into a latency. An unmarked headers
    /// phase is measured up to now.
    pub fn latency(&self) -> ProbeLatency {
        let headers = self.headers.unwrap_or_else(Instant::now);
        let connected = self.connected.unwrap_or(headers);
        let tls = match (self.tls_start, self.tls_end) {
            (Some(s), Some(e)) => Some(e.duration_since(s)),
            _ => None,
        };

        ProbeLatency {
            total: headers.duration_since(self.started),
            connect: connected.duration_since(self.started),
            tls,
        }
    }
}

/// Receives phase notifications from an exchange.
///
/// `()` ignores them, for callers that only care whether the exchange worked.
pub trait PhaseObserver: Send {
    fn connected(&mut self) {}
    fn tls_started(&mut self) {}
    fn tls_finished(&mut self) {}
    fn headers_received(&mut self) {}
}

impl PhaseObserver for () {}

impl PhaseObserver for PhaseTiming {
    fn connected(&mut self) {
        self.mark_connected();
    }

    fn tls_started(&mut self) {
        self.start_tls();
    }

    fn tls_finished(&mut self) {
        self.end_tls();
    }

    fn headers_received(&mut self) {
        self.mark_headers();
    }
}
