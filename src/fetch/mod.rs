//! Line-set fetching of arbitrary URLs with gzip negotiation.

pub mod fetcher;
pub mod lines;

pub use fetcher::{read_url, ContentFetcher};
pub use lines::normalize_lines;
