//! DNS-over-HTTPS fallback lookup of candidate addresses.

pub mod doh;
pub mod types;

pub use doh::{dns_query, parse_answers, FallbackResolver};
pub use types::{DohAnswer, DohReply};
