//! Metric helpers for `adbwire`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking successfully decoded messages.
pub const MESSAGES_DECODED: &str = "adbwire_messages_decoded_total";
/// Name of the counter tracking failed decode operations.
pub const DECODE_ERRORS: &str = "adbwire_decode_errors_total";
/// Name of the counter tracking file bytes written to sinks.
pub const FILE_BYTES: &str = "adbwire_file_bytes_total";

/// Record a decoded message of the given kind.
pub fn inc_decoded(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_DECODED, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a failed decode of `kind` with error category `error_type`.
pub fn inc_errors(kind: &'static str, error_type: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(DECODE_ERRORS, "kind" => kind, "error" => error_type).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (kind, error_type);
}

/// Record `bytes` written to a file sink.
pub fn add_file_bytes(bytes: usize) {
    #[cfg(feature = "metrics")]
    counter!(FILE_BYTES).increment(bytes as u64);
    #[cfg(not(feature = "metrics"))]
    let _ = bytes;
}
