//! The device-side decoder shared by every sub-protocol reader.
//!
//! A [`DeviceDecoder`] owns one [`ByteSource`] and a [`DecoderConfig`]. The
//! per-protocol operations live in [`command`](crate::command),
//! [`sync`](crate::sync), [`file`](crate::file) and [`shell`](crate::shell);
//! this module only holds the state and helpers they share.

use bytes::Bytes;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::{
    config::DecoderConfig,
    error::{DecodeError, FormatError, Result},
    source::ByteSource,
};

/// Decodes client-to-device protocol messages from one ordered stream.
///
/// Every operation takes `&mut self`, consumes exactly one logical message and
/// leaves the stream positioned at the next message boundary. The caller
/// decides which message to expect next.
///
/// # Examples
///
/// ```
/// use adbwire::DeviceDecoder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> adbwire::Result<()> {
/// let wire: &[u8] = b"0005hello";
/// let mut decoder = DeviceDecoder::new(wire);
/// assert_eq!(decoder.receive_command().await?, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceDecoder<R> {
    pub(crate) source: ByteSource<R>,
    pub(crate) config: DecoderConfig,
}

impl<R> DeviceDecoder<R> {
    /// Create a decoder over `reader` using [`DecoderConfig::default`].
    pub fn new(reader: R) -> Self { Self::with_config(reader, DecoderConfig::default()) }

    /// Create a decoder over `reader` using `config`.
    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        let source = ByteSource::new(reader).with_read_timeout(config.read_timeout);
        Self { source, config }
    }

    /// Abort in-flight and future reads once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.source = self.source.with_cancellation(token);
        self
    }

    /// The configuration this decoder applies.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig { &self.config }

    /// Borrow the underlying byte source.
    pub fn source(&self) -> &ByteSource<R> { &self.source }

    /// Mutably borrow the underlying byte source.
    pub fn source_mut(&mut self) -> &mut ByteSource<R> { &mut self.source }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R { self.source.into_inner() }

    /// Reject `length` if it exceeds the configured message cap.
    pub(crate) fn check_message_length(&self, length: usize) -> Result<()> {
        match self.config.max_message_length {
            Some(max) if length > max => {
                tracing::warn!(length, max, "rejecting oversized message");
                Err(DecodeError::OversizedMessage { length, max })
            }
            _ => Ok(()),
        }
    }
}

impl<R: AsyncRead + Unpin> DeviceDecoder<R> {
    /// Read a `length`-byte payload after checking the message cap.
    pub(crate) async fn read_payload(&mut self, length: usize) -> Result<Bytes> {
        self.check_message_length(length)?;
        self.source.read_exact(length).await
    }

    /// Read a `length`-byte payload and decode it as UTF-8 text.
    pub(crate) async fn read_text(&mut self, length: usize) -> Result<String> {
        let payload = self.read_payload(length).await?;
        decode_text(payload)
    }
}

/// Record the outcome of one public decode operation named `kind`.
pub(crate) fn observe<T>(kind: &'static str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => crate::metrics::inc_decoded(kind),
        Err(e) => {
            tracing::debug!(kind, error = %e, "decode failed");
            crate::metrics::inc_errors(kind, e.error_type());
        }
    }
    result
}

/// Decode a payload using the transport's text encoding (UTF-8).
pub(crate) fn decode_text(payload: Bytes) -> Result<String> {
    String::from_utf8(payload.into()).map_err(|e| {
        FormatError::InvalidText {
            valid_up_to: e.utf8_error().valid_up_to(),
        }
        .into()
    })
}

/// Convert a wire length to `usize`.
pub(crate) fn wire_len(length: u32) -> usize {
    usize::try_from(length).unwrap_or(usize::MAX)
}
