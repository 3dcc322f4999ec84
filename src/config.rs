//! Decoder configuration.
//!
//! [`DecoderConfig`] bounds how much a single message may allocate, how long a
//! read may wait, and when the file receiver closes its sink. The defaults
//! reproduce the unbounded behaviour of the protocol itself.

use std::time::Duration;

/// Largest `DATA` chunk a client may send in one packet (64 KiB).
pub const DEFAULT_MAX_PACKET_LENGTH: usize = 64 * 1024;

/// When the file receiver shuts down its sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkClose {
    /// Close once, when `DONE` arrives or the transfer fails.
    #[default]
    OnDone,
    /// Close right after the first `DATA` chunk has been written.
    ///
    /// Later `DATA` chunks then fail with a broken-pipe I/O error. Only useful
    /// for replaying fixtures recorded against receivers that behaved this way.
    AfterFirstChunk,
}

/// Limits and policies applied by a [`DeviceDecoder`](crate::DeviceDecoder).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum payload of one `DATA` chunk.
    pub max_packet_length: usize,
    /// Optional cap on command, sync and shell payload lengths, checked before the
    /// payload buffer is allocated.
    pub max_message_length: Option<usize>,
    /// Optional deadline applied to each individual read.
    pub read_timeout: Option<Duration>,
    /// Sink shutdown policy for [`receive_file`](crate::DeviceDecoder::receive_file).
    pub sink_close: SinkClose,
}

impl DecoderConfig {
    /// Set the maximum `DATA` chunk size.
    #[must_use]
    pub fn with_max_packet_length(mut self, max: usize) -> Self {
        self.max_packet_length = max;
        self
    }

    /// Cap command and sync message lengths.
    #[must_use]
    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = Some(max);
        self
    }

    /// Bound every read by `timeout`.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Choose when the file receiver shuts down its sink.
    #[must_use]
    pub fn with_sink_close(mut self, policy: SinkClose) -> Self {
        self.sink_close = policy;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_packet_length: DEFAULT_MAX_PACKET_LENGTH,
            max_message_length: None,
            read_timeout: None,
            sink_close: SinkClose::OnDone,
        }
    }
}
