//! Single-shot HTTP/1.1 exchanges over plain TCP or TLS.
//!
//! Every exchange opens its own connection and releases it when the
//! exchange is dropped. Nothing is pooled.

pub(crate) mod client;
pub(crate) mod exchange;
pub(crate) mod target;

pub(crate) use client::get;
pub(crate) use exchange::{build_get_request, ensure_success, send, with_timeout};
pub(crate) use target::Target;
