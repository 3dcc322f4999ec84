//! Legacy host command frames.
//!
//! Before a sub-protocol takes over, a client addresses the device with a
//! service request framed as four ASCII hex digits followed by that many bytes
//! of text, for example `000Cshell:ls -l` or `0005sync:`.

use tokio::io::AsyncRead;

use crate::{
    decoder::{DeviceDecoder, observe},
    error::{FormatError, Result},
};

/// Width of the ASCII hex length prefix.
pub const COMMAND_LENGTH_DIGITS: usize = 4;

/// Parse a four-digit ASCII hex length prefix.
///
/// # Errors
///
/// Returns [`FormatError::InvalidHexLength`] if `digits` is not a base-16
/// number.
///
/// # Examples
///
/// ```
/// use adbwire::command::parse_hex_length;
///
/// assert_eq!(parse_hex_length(*b"001f"), Ok(31));
/// assert!(parse_hex_length(*b"00g1").is_err());
/// ```
pub fn parse_hex_length(
    digits: [u8; COMMAND_LENGTH_DIGITS],
) -> std::result::Result<usize, FormatError> {
    let invalid = || FormatError::InvalidHexLength {
        digits: String::from_utf8_lossy(&digits).into_owned(),
    };
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }
    let text = std::str::from_utf8(&digits).map_err(|_| invalid())?;
    usize::from_str_radix(text, 16).map_err(|_| invalid())
}

impl<R: AsyncRead + Unpin> DeviceDecoder<R> {
    /// Receive one hex-length-prefixed command.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Io`](crate::DecodeError::Io) on a short read,
    /// [`DecodeError::Format`](crate::DecodeError::Format) if the length prefix
    /// is not hexadecimal or the payload is not text, and
    /// [`DecodeError::OversizedMessage`](crate::DecodeError::OversizedMessage)
    /// if a message cap is configured and exceeded.
    pub async fn receive_command(&mut self) -> Result<String> {
        let result = self.read_command().await;
        observe("command", result)
    }

    async fn read_command(&mut self) -> Result<String> {
        let digits = self.source.read_array::<COMMAND_LENGTH_DIGITS>().await?;
        let length = parse_hex_length(digits)?;
        let command = self.read_text(length).await?;
        tracing::debug!(%command, "received command");
        Ok(command)
    }
}
