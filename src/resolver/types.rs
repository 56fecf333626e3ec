use serde::Deserialize;

/// JSON reply of a DoH server (`application/dns-json`).
///
/// Only the fields the lookup needs are modelled; the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct DohReply {
    #[serde(rename = "Status", default)]
    pub status: Option<u32>,
    #[serde(rename = "Answer", default)]
    pub answer: Option<Vec<DohAnswer>>,
}

/// A single answer record.
#[derive(Debug, Deserialize)]
pub struct DohAnswer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub record_type: Option<u16>,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
    pub data: String,
}
