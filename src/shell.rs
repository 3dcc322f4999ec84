//! Shell v2 packets.
//!
//! The v2 shell service multiplexes stdin, stdout, stderr, the exit status and
//! terminal resizes over one stream. Each packet is a one-byte id, a
//! little-endian `u32` length and the payload. From the device side only the
//! client-originated packets are of interest: stdin data, the stdin-close
//! signal and window size changes.

use std::fmt;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::{
    decoder::{DeviceDecoder, decode_text, observe, wire_len},
    error::{ProtocolViolation, Result},
};

/// Identifier byte of a shell v2 packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShellPacketId {
    /// Data for the remote process's stdin.
    Stdin = 0,
    /// Data from the remote process's stdout.
    Stdout = 1,
    /// Data from the remote process's stderr.
    Stderr = 2,
    /// One-byte exit status.
    Exit = 3,
    /// The client has no more stdin to send.
    CloseStdin = 4,
    /// Terminal size update.
    WindowSizeChange = 5,
    /// Reserved invalid id.
    Invalid = 255,
}

impl ShellPacketId {
    /// The on-wire id byte.
    #[must_use]
    pub const fn code(self) -> u8 { self as u8 }
}

impl TryFrom<u8> for ShellPacketId {
    type Error = ProtocolViolation;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Stdin,
            1 => Self::Stdout,
            2 => Self::Stderr,
            3 => Self::Exit,
            4 => Self::CloseStdin,
            5 => Self::WindowSizeChange,
            255 => Self::Invalid,
            found => return Err(ProtocolViolation::UnknownShellPacket { found }),
        })
    }
}

impl fmt::Display for ShellPacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdin => "STDIN",
            Self::Stdout => "STDOUT",
            Self::Stderr => "STDERR",
            Self::Exit => "EXIT",
            Self::CloseStdin => "CLOSE_STDIN",
            Self::WindowSizeChange => "WINDOW_SIZE_CHANGE",
            Self::Invalid => "INVALID",
        })
    }
}

/// A shell v2 packet of any known id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellPacket {
    /// Packet id.
    pub id: ShellPacketId,
    /// Payload of exactly the declared length.
    pub payload: Bytes,
}

/// Terminal geometry from a `WINDOW_SIZE_CHANGE` packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// Rows of text.
    pub rows: u16,
    /// Columns of text.
    pub cols: u16,
    /// Width in pixels.
    pub x_pixels: u16,
    /// Height in pixels.
    pub y_pixels: u16,
}

impl WindowSize {
    /// Parse a `<rows>x<cols>,<xpixels>x<ypixels>` payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use adbwire::shell::WindowSize;
    ///
    /// let size = WindowSize::parse("24x80,640x480").expect("size");
    /// assert_eq!((size.rows, size.cols), (24, 80));
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_end_matches('\0');
        let (chars, pixels) = text.split_once(',')?;
        let (rows, cols) = chars.split_once('x')?;
        let (x_pixels, y_pixels) = pixels.split_once('x')?;
        Some(Self {
            rows: rows.parse().ok()?,
            cols: cols.parse().ok()?,
            x_pixels: x_pixels.parse().ok()?,
            y_pixels: y_pixels.parse().ok()?,
        })
    }
}

impl<R: AsyncRead + Unpin> DeviceDecoder<R> {
    /// Receive a stdin packet and return its payload as text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedShellPacket`] if the id byte is
    /// not `STDIN`, and I/O, format or size errors from reading the payload.
    pub async fn receive_shell_v2_stdin(&mut self) -> Result<String> {
        let result = self.read_stdin().await;
        observe("shell_stdin", result)
    }

    /// Receive the stdin-close signal.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedShellPacket`] if the id byte is
    /// not `CLOSE_STDIN` and [`ProtocolViolation::NonEmptyCloseStdin`] if the
    /// declared length is not zero.
    pub async fn receive_shell_v2_stdin_close(&mut self) -> Result<()> {
        let result = self.read_stdin_close().await;
        observe("shell_stdin_close", result)
    }

    /// Receive one shell packet of any known id.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownShellPacket`] for unassigned ids,
    /// and I/O or size errors from reading the payload.
    pub async fn receive_shell_v2_packet(&mut self) -> Result<ShellPacket> {
        let result = self.read_shell_packet().await;
        observe("shell_packet", result)
    }

    /// Receive a window size change.
    ///
    /// Payloads that do not follow `<rows>x<cols>,<xpixels>x<ypixels>` yield
    /// `Ok(None)`; the packet is still consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedShellPacket`] if the id byte is
    /// not `WINDOW_SIZE_CHANGE`, and I/O, format or size errors otherwise.
    pub async fn receive_shell_v2_window_size(&mut self) -> Result<Option<WindowSize>> {
        let result = self.read_window_size().await;
        observe("shell_window_size", result)
    }

    async fn read_stdin(&mut self) -> Result<String> {
        self.read_shell_id(ShellPacketId::Stdin).await?;
        let length = self.source.read_u32_le().await?;
        let text = self.read_text(wire_len(length)).await?;
        tracing::debug!(%text, "received shell stdin");
        Ok(text)
    }

    async fn read_stdin_close(&mut self) -> Result<()> {
        self.read_shell_id(ShellPacketId::CloseStdin).await?;
        let length = self.source.read_u32_le().await?;
        if length != 0 {
            tracing::warn!(length, "close-stdin packet declared a payload");
            return Err(ProtocolViolation::NonEmptyCloseStdin { length }.into());
        }
        tracing::debug!("received shell stdin close");
        Ok(())
    }

    async fn read_shell_packet(&mut self) -> Result<ShellPacket> {
        let id = ShellPacketId::try_from(self.source.read_byte().await?)?;
        let length = self.source.read_u32_le().await?;
        let payload = self.read_payload(wire_len(length)).await?;
        tracing::debug!(%id, len = payload.len(), "received shell packet");
        Ok(ShellPacket { id, payload })
    }

    async fn read_window_size(&mut self) -> Result<Option<WindowSize>> {
        self.read_shell_id(ShellPacketId::WindowSizeChange).await?;
        let length = self.source.read_u32_le().await?;
        let payload = self.read_payload(wire_len(length)).await?;
        let text = decode_text(payload)?;
        let size = WindowSize::parse(&text);
        if size.is_none() {
            tracing::warn!(%text, "unparseable window size");
        }
        Ok(size)
    }

    async fn read_shell_id(&mut self, expected: ShellPacketId) -> Result<()> {
        let found = self.source.read_byte().await?;
        if found != expected.code() {
            tracing::warn!(%expected, found, "unexpected shell packet id");
            return Err(ProtocolViolation::UnexpectedShellPacket { expected, found }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ShellPacketId, WindowSize};
    use crate::ProtocolViolation;

    #[rstest]
    #[case(0, ShellPacketId::Stdin)]
    #[case(4, ShellPacketId::CloseStdin)]
    #[case(5, ShellPacketId::WindowSizeChange)]
    #[case(255, ShellPacketId::Invalid)]
    fn known_ids_map_both_ways(#[case] code: u8, #[case] id: ShellPacketId) {
        assert_eq!(ShellPacketId::try_from(code), Ok(id));
        assert_eq!(id.code(), code);
    }

    #[test]
    fn unassigned_id_is_rejected() {
        assert_eq!(
            ShellPacketId::try_from(6),
            Err(ProtocolViolation::UnknownShellPacket { found: 6 })
        );
    }

    #[rstest]
    #[case("24x80,0x0", Some((24, 80, 0, 0)))]
    #[case("50x132,1920x1080\0", Some((50, 132, 1920, 1080)))]
    #[case("24x80", None)]
    #[case("axb,cxd", None)]
    #[case("70000x80,0x0", None)]
    fn parses_window_sizes(#[case] text: &str, #[case] expected: Option<(u16, u16, u16, u16)>) {
        let parsed = WindowSize::parse(text).map(|s| (s.rows, s.cols, s.x_pixels, s.y_pixels));
        assert_eq!(parsed, expected);
    }
}
