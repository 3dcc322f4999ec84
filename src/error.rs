//! Canonical error and result types for the crate.
//!
//! Errors are grouped by origin:
//!
//! - [`FormatError`]: bytes that cannot be interpreted at all (a command length
//!   that is not hexadecimal, a payload that is not valid text).
//! - [`ProtocolViolation`]: well-formed bytes that break the expected message
//!   sequence (a tag or shell packet id other than the one required).
//! - [`DecodeError`]: top-level enum wrapping both categories together with
//!   transport failures, size guards and read deadlines.
//!
//! Every error is fatal to the decode call that produced it. Nothing is
//! retried internally and the stream is never resynchronised.

use std::{io, time::Duration};

use thiserror::Error;

use crate::{
    shell::ShellPacketId,
    tag::{RawTag, Tag},
};

/// Bytes that could not be interpreted as the expected encoding.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The four-character command length is not a hexadecimal number.
    #[error("invalid hex length prefix {digits:?}")]
    InvalidHexLength {
        /// The length prefix as received, lossily decoded for display.
        digits: String,
    },

    /// A text payload is not valid UTF-8.
    #[error("payload is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidText {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },
}

/// Well-formed input that does not follow the expected message sequence.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// A sync message carried a different tag than the one required.
    #[error("expected sync tag {expected}, found {found}")]
    UnexpectedTag {
        /// Tag the caller asked for.
        expected: Tag,
        /// Tag bytes that arrived.
        found: RawTag,
    },

    /// A sync request tag is not one a client may send.
    #[error("unknown sync request tag {found}")]
    UnknownSyncTag {
        /// Tag bytes that arrived.
        found: RawTag,
    },

    /// A file chunk header carried neither `DATA` nor `DONE`.
    #[error("unexpected file chunk tag {found}")]
    UnexpectedChunkTag {
        /// Tag bytes that arrived.
        found: RawTag,
    },

    /// A shell v2 packet carried a different id than the one required.
    #[error("expected shell packet {expected}, found id {found}")]
    UnexpectedShellPacket {
        /// Packet id the caller asked for.
        expected: ShellPacketId,
        /// Raw id byte that arrived.
        found: u8,
    },

    /// A shell v2 packet id is outside the known range.
    #[error("unknown shell packet id {found}")]
    UnknownShellPacket {
        /// Raw id byte that arrived.
        found: u8,
    },

    /// A stdin-close packet declared a payload.
    #[error("close-stdin packet must be empty, declared {length} bytes")]
    NonEmptyCloseStdin {
        /// Declared payload length.
        length: u32,
    },
}

/// Top-level decode error.
///
/// # Examples
///
/// ```
/// use adbwire::{DecodeError, ProtocolViolation, RawTag, Tag};
///
/// let err = DecodeError::from(ProtocolViolation::UnexpectedTag {
///     expected: Tag::Recv,
///     found: RawTag(*b"SEND"),
/// });
/// assert_eq!(err.error_type(), "protocol");
/// assert_eq!(err.to_string(), "protocol violation: expected sync tag RECV, found SEND");
/// ```
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended early or the transport or sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bytes could not be interpreted.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The peer broke the expected message sequence.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// A `DATA` chunk declared more bytes than a single packet may carry.
    #[error("unsupported protocol: chunk of {size} bytes exceeds maximum packet length {max}")]
    UnsupportedProtocol {
        /// Declared chunk size.
        size: u32,
        /// Configured maximum packet length.
        max: usize,
    },

    /// A length prefix exceeded the configured message cap.
    #[error("message of {length} bytes exceeds configured maximum {max}")]
    OversizedMessage {
        /// Declared message length.
        length: usize,
        /// Configured cap.
        max: usize,
    },

    /// No bytes arrived within the configured read timeout.
    #[error("read timed out after {0:?}")]
    TimedOut(Duration),

    /// The read was aborted through the decoder's cancellation token.
    #[error("read cancelled")]
    Cancelled,
}

impl DecodeError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of `"io"`, `"format"`, `"protocol"`, `"unsupported"`, `"oversized"`,
    /// `"timeout"` or `"cancelled"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Format(_) => "format",
            Self::Protocol(_) => "protocol",
            Self::UnsupportedProtocol { .. } => "unsupported",
            Self::OversizedMessage { .. } => "oversized",
            Self::TimedOut(_) => "timeout",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if the peer closed the stream before a message completed.
    #[must_use]
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(e) => e,
            DecodeError::TimedOut(_) => io::Error::new(io::ErrorKind::TimedOut, err),
            DecodeError::Cancelled => io::Error::new(io::ErrorKind::Interrupted, err),
            DecodeError::UnsupportedProtocol { .. } => {
                io::Error::new(io::ErrorKind::Unsupported, err)
            }
            DecodeError::Format(_)
            | DecodeError::Protocol(_)
            | DecodeError::OversizedMessage { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// Canonical result alias used by `adbwire` public APIs.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
