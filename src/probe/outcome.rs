//! Per-candidate results.

use crate::error::Error;
use crate::shared::ProbeLatency;
use std::fmt;

/// Why a probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The candidate or probe template could not be turned into a request.
    InvalidInput,
    Timeout,
    Connect,
    Tls,
    /// HTTP framing or protocol failure.
    Protocol,
    /// The endpoint answered with a non-2xx status.
    Status,
}

impl From<&Error> for FailureKind {
    fn from(error: &Error) -> Self {
        match error {
            Error::InvalidAddress(_)
            | Error::InvalidUrl(_)
            | Error::InvalidServerName(_)
            | Error::Request(_) => FailureKind::InvalidInput,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Connect(_) | Error::Dns(_) => FailureKind::Connect,
            Error::Tls(_) | Error::TlsConfig(_) => FailureKind::Tls,
            Error::Status(_) | Error::TooManyRedirects => FailureKind::Status,
            Error::Http(_) | Error::Decode(_) | Error::MalformedResponse(_) => {
                FailureKind::Protocol
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<Error> for ProbeFailure {
    fn from(error: Error) -> Self {
        Self {
            kind: FailureKind::from(&error),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of probing one candidate: a latency or a failure, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Reachable(ProbeLatency),
    Failed(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable(_))
    }

    pub fn latency(&self) -> Option<&ProbeLatency> {
        match self {
            ProbeOutcome::Reachable(latency) => Some(latency),
            ProbeOutcome::Failed(_) => None,
        }
    }

    /// Round-trip time in seconds.
    pub fn latency_secs(&self) -> Option<f64> {
        self.latency().map(ProbeLatency::as_secs_f64)
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            ProbeOutcome::Failed(failure) => Some(failure),
            ProbeOutcome::Reachable(_) => None,
        }
    }
}

impl From<Error> for ProbeOutcome {
    fn from(error: Error) -> Self {
        ProbeOutcome::Failed(error.into())
    }
}
