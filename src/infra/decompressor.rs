//! Content decompression infrastructure.
//!
//! Decodes response bodies according to their `Content-Encoding`. Fetches
//! only advertise gzip, but deflate and brotli bodies are decoded too when a
//! server sends them anyway.

use crate::error::{Error, Result};
use std::io::Read;

/// Trait for content decompression.
pub trait Decompressor: Send + Sync {
    /// The content-encoding token this decompressor handles.
    fn encoding(&self) -> &'static str;

    /// Decompresses a complete body.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

fn read_all<R: Read>(mut reader: R, encoding: &str, size_hint: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(size_hint.saturating_mul(2));
    reader
        .read_to_end(&mut out)
        .map_err(|e| Error::Decode(format!("{} stream invalid: {}", encoding, e)))?;
    Ok(out)
}

#[derive(Default)]
pub struct GzipDecompressor;

impl Decompressor for GzipDecompressor {
    fn encoding(&self) -> &'static str {
        "gzip"
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        // Multi-member streams are valid gzip.
        read_all(flate2::read::MultiGzDecoder::new(data), self.encoding(), data.len())
    }
}

#[derive(Default)]
pub struct DeflateDecompressor;

impl Decompressor for DeflateDecompressor {
    fn encoding(&self) -> &'static str {
        "deflate"
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        read_all(flate2::read::ZlibDecoder::new(data), self.encoding(), data.len())
    }
}

#[derive(Default)]
pub struct BrotliDecompressor;

impl Decompressor for BrotliDecompressor {
    fn encoding(&self) -> &'static str {
        "br"
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        read_all(brotli::Decompressor::new(data, 4096), self.encoding(), data.len())
    }
}

/// Selects a decompressor from a `Content-Encoding` header value.
#[derive(Default)]
pub struct MultiDecompressor {
    gzip: GzipDecompressor,
    deflate: DeflateDecompressor,
    brotli: BrotliDecompressor,
}

impl MultiDecompressor {
    /// Creates a new `MultiDecompressor` instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, encoding: &str) -> Option<&dyn Decompressor> {
        match encoding.trim().to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => Some(&self.gzip),
            "deflate" => Some(&self.deflate),
            "br" => Some(&self.brotli),
            _ => None,
        }
    }

    /// Decodes `data`. Missing, `identity` and unknown encodings pass the
    /// body through untouched.
    pub fn decompress(&self, data: &[u8], encoding: Option<&str>) -> Result<Vec<u8>> {
        match encoding.and_then(|e| self.select(e)) {
            Some(decoder) => {
                let decoded = decoder.decompress(data)?;
                tracing::debug!(
                    encoding = decoder.encoding(),
                    compressed = data.len(),
                    decompressed = decoded.len(),
                    "Decoded response body"
                );
                Ok(decoded)
            }
            None => Ok(data.to_vec()),
        }
    }
}

/// Convenience function for decoding a body with the default decompressors.
pub fn decompress_body(body: &[u8], encoding: Option<&str>) -> Result<Vec<u8>> {
    MultiDecompressor::new().decompress(body, encoding)
}
