//! Infrastructure layer providing abstractions for external dependencies.
//!
//! This module contains traits and implementations for:
//! - DNS resolution
//! - TLS connections with a fixed server identity
//! - Content decompression

pub mod decompressor;
pub mod dns;
pub mod tls;

pub use decompressor::{decompress_body, Decompressor, MultiDecompressor};
pub use dns::{DnsResolver, HickoryDnsResolver};
pub use tls::{
    create_tls_config, CustomRootsTlsProvider, RustlsTlsProvider, SecureChannelFactory,
    TlsProvider,
};
