//! File-synchronisation requests.
//!
//! Once a client has switched a connection to `sync:` mode it sends requests
//! framed as a four-byte [`Tag`], a little-endian `u32` length and that many
//! bytes of payload, usually a device path. The v2 push request splits its
//! metadata over two `SND2` sub-frames:
//!
//! ```text
//! SND2 <len:u32le> <path bytes>
//! SND2 <mode:u32le> <flags:u32le>
//! ```
//!
//! Each typed `receive_*` operation requires one specific tag and fails with
//! [`ProtocolViolation::UnexpectedTag`] as soon as a different one arrives,
//! without reading further.

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::{
    decoder::{DeviceDecoder, observe, wire_len},
    error::{ProtocolViolation, Result},
    tag::{RawTag, Tag},
};

/// Fail with [`ProtocolViolation::UnexpectedTag`] unless `found` is `expected`.
///
/// # Errors
///
/// Returns the violation when the tags differ.
///
/// # Examples
///
/// ```
/// use adbwire::{RawTag, Tag, sync::expect_tag};
///
/// assert!(expect_tag(Tag::Stat, RawTag(*b"STAT")).is_ok());
/// assert!(expect_tag(Tag::Stat, RawTag(*b"LIST")).is_err());
/// ```
pub fn expect_tag(expected: Tag, found: RawTag) -> std::result::Result<(), ProtocolViolation> {
    if found.is(expected) {
        Ok(())
    } else {
        Err(ProtocolViolation::UnexpectedTag { expected, found })
    }
}

/// An untyped sync message as it appeared on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncMessage {
    /// Identifier bytes.
    pub tag: RawTag,
    /// Payload of exactly the declared length.
    pub payload: Bytes,
}

/// Metadata carried by the two-frame `SND2` handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendV2Request {
    /// Destination path on the device.
    pub path: String,
    /// File mode bits.
    pub mode: u32,
    /// Transfer flags, see the associated constants.
    pub flags: u32,
}

/// Compression applied to the `DATA` chunks of a v2 push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Brotli.
    Brotli,
    /// LZ4 frames.
    Lz4,
    /// Zstandard.
    Zstd,
}

impl SendV2Request {
    /// Chunks are Brotli-compressed.
    pub const FLAG_BROTLI: u32 = 1;
    /// Chunks are LZ4-compressed.
    pub const FLAG_LZ4: u32 = 2;
    /// Chunks are Zstandard-compressed.
    pub const FLAG_ZSTD: u32 = 4;
    /// The device should validate the transfer without writing the file.
    pub const FLAG_DRY_RUN: u32 = 0x8000_0000;

    /// Returns true if the client asked for a dry run.
    #[must_use]
    pub fn is_dry_run(&self) -> bool { self.flags & Self::FLAG_DRY_RUN != 0 }

    /// The compression the client announced, if any.
    ///
    /// Flags naming more than one algorithm report the first in the order
    /// Brotli, LZ4, Zstandard.
    #[must_use]
    pub fn compression(&self) -> Option<Compression> {
        if self.flags & Self::FLAG_BROTLI != 0 {
            Some(Compression::Brotli)
        } else if self.flags & Self::FLAG_LZ4 != 0 {
            Some(Compression::Lz4)
        } else if self.flags & Self::FLAG_ZSTD != 0 {
            Some(Compression::Zstd)
        } else {
            None
        }
    }
}

/// Destination of a v1 `SEND`, whose payload reads `<path>,<mode>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTarget {
    /// Destination path on the device.
    pub path: String,
    /// File mode bits.
    pub mode: u32,
}

impl SendTarget {
    /// Split a v1 `SEND` payload on its last comma.
    ///
    /// The mode accepts the same spellings as C's `strtoul` with base 0:
    /// `0x` prefixed hex, `0` prefixed octal, or decimal. Returns `None` when
    /// the comma is missing or the mode does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use adbwire::sync::SendTarget;
    ///
    /// let target = SendTarget::parse("/data/local/tmp/a,b,33188").expect("target");
    /// assert_eq!(target.path, "/data/local/tmp/a,b");
    /// assert_eq!(target.mode, 0o100_644);
    /// ```
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        let (path, mode) = payload.rsplit_once(',')?;
        let mode = if let Some(hex) = mode.strip_prefix("0x").or_else(|| mode.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16).ok()?
        } else if mode.len() > 1 && mode.starts_with('0') {
            u32::from_str_radix(&mode[1..], 8).ok()?
        } else {
            mode.parse().ok()?
        };
        Some(Self {
            path: path.to_owned(),
            mode,
        })
    }
}

/// A sync request decoded by dispatching on its tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncRequest {
    /// `STAT`.
    Stat(String),
    /// `STA2` (`follow_symlinks`) or `LST2`.
    StatV2 {
        /// Path to stat.
        path: String,
        /// True for `STA2`, false for `LST2`.
        follow_symlinks: bool,
    },
    /// `LIST`.
    List(String),
    /// `LIS2`.
    ListV2(String),
    /// `SEND`, with the raw `<path>,<mode>` payload.
    Send(String),
    /// Both `SND2` sub-frames.
    SendV2(SendV2Request),
    /// `RECV`.
    Recv(String),
    /// `RCV2`.
    RecvV2(String),
    /// `QUIT`.
    Quit,
}

impl<R: AsyncRead + Unpin> DeviceDecoder<R> {
    /// Receive a `STAT` request and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedTag`] if another tag arrives,
    /// and I/O, format or size errors from reading the payload.
    pub async fn receive_stat(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Stat).await;
        observe("stat", result)
    }

    /// Receive an `LST2` request and return its path.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_stat_v2(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Lst2).await;
        observe("stat_v2", result)
    }

    /// Receive a `LIST` request and return its path.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_list(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::List).await;
        observe("list", result)
    }

    /// Receive a `LIS2` request and return its path.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_list_v2(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Lis2).await;
        observe("list_v2", result)
    }

    /// Receive a `SEND` request and return its raw `<path>,<mode>` payload.
    ///
    /// Use [`SendTarget::parse`] to split it.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_send(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Send).await;
        observe("send", result)
    }

    /// Receive both `SND2` sub-frames of a v2 push request.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedTag`] if either sub-frame is not
    /// tagged `SND2`, and I/O, format or size errors from reading the path.
    pub async fn receive_send_v2(&mut self) -> Result<SendV2Request> {
        let result = self.read_send_v2().await;
        observe("send_v2", result)
    }

    /// Receive a `RECV` request and return its path.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_recv(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Recv).await;
        observe("recv", result)
    }

    /// Receive an `RCV2` request and return its path.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_recv_v2(&mut self) -> Result<String> {
        let result = self.read_tagged_text(Tag::Rcv2).await;
        observe("recv_v2", result)
    }

    /// Receive a `QUIT` request, discarding any payload.
    ///
    /// # Errors
    ///
    /// See [`receive_stat`](Self::receive_stat).
    pub async fn receive_quit(&mut self) -> Result<()> {
        let result = self.read_quit().await;
        observe("quit", result)
    }

    /// Receive one sync message without checking its tag.
    ///
    /// # Errors
    ///
    /// Returns I/O or size errors from reading the message.
    pub async fn receive_sync_message(&mut self) -> Result<SyncMessage> {
        let result = self.read_sync_message().await;
        observe("sync_message", result)
    }

    /// Receive whichever sync request arrives next.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownSyncTag`] for tags a client never
    /// sends, and the errors of the matching typed operation otherwise.
    pub async fn receive_sync_request(&mut self) -> Result<SyncRequest> {
        let result = self.read_sync_request().await;
        observe("sync_request", result)
    }

    async fn read_send_v2(&mut self) -> Result<SendV2Request> {
        let path = self.read_tagged_text(Tag::Snd2).await?;
        self.read_send_v2_metadata(path).await
    }

    async fn read_quit(&mut self) -> Result<()> {
        self.read_tag(Tag::Quit).await?;
        let length = self.source.read_u32_le().await?;
        self.read_payload(wire_len(length)).await?;
        tracing::debug!("received sync quit");
        Ok(())
    }

    async fn read_sync_message(&mut self) -> Result<SyncMessage> {
        let tag = RawTag(self.source.read_array::<4>().await?);
        let length = self.source.read_u32_le().await?;
        let payload = self.read_payload(wire_len(length)).await?;
        tracing::debug!(%tag, len = payload.len(), "received sync message");
        Ok(SyncMessage { tag, payload })
    }

    async fn read_sync_request(&mut self) -> Result<SyncRequest> {
        let found = RawTag(self.source.read_array::<4>().await?);
        let Some(tag) = found.known() else {
            return Err(ProtocolViolation::UnknownSyncTag { found }.into());
        };
        let request = match tag {
            Tag::Stat => SyncRequest::Stat(self.read_length_prefixed_text().await?),
            Tag::Sta2 | Tag::Lst2 => SyncRequest::StatV2 {
                path: self.read_length_prefixed_text().await?,
                follow_symlinks: tag == Tag::Sta2,
            },
            Tag::List => SyncRequest::List(self.read_length_prefixed_text().await?),
            Tag::Lis2 => SyncRequest::ListV2(self.read_length_prefixed_text().await?),
            Tag::Send => SyncRequest::Send(self.read_length_prefixed_text().await?),
            Tag::Snd2 => {
                let path = self.read_length_prefixed_text().await?;
                SyncRequest::SendV2(self.read_send_v2_metadata(path).await?)
            }
            Tag::Recv => SyncRequest::Recv(self.read_length_prefixed_text().await?),
            Tag::Rcv2 => SyncRequest::RecvV2(self.read_length_prefixed_text().await?),
            Tag::Quit => {
                let length = self.source.read_u32_le().await?;
                self.read_payload(wire_len(length)).await?;
                SyncRequest::Quit
            }
            Tag::Dent | Tag::Dnt2 | Tag::Data | Tag::Done | Tag::Okay | Tag::Fail => {
                return Err(ProtocolViolation::UnknownSyncTag { found }.into());
            }
        };
        tracing::debug!(%tag, ?request, "received sync request");
        Ok(request)
    }

    /// Read a tag and require it to be `expected`.
    async fn read_tag(&mut self, expected: Tag) -> Result<()> {
        let found = RawTag(self.source.read_array::<4>().await?);
        if let Err(violation) = expect_tag(expected, found) {
            tracing::warn!(%expected, %found, "unexpected sync tag");
            return Err(violation.into());
        }
        Ok(())
    }

    async fn read_length_prefixed_text(&mut self) -> Result<String> {
        let length = self.source.read_u32_le().await?;
        self.read_text(wire_len(length)).await
    }

    async fn read_tagged_text(&mut self, expected: Tag) -> Result<String> {
        self.read_tag(expected).await?;
        let text = self.read_length_prefixed_text().await?;
        tracing::debug!(tag = %expected, %text, "received sync request");
        Ok(text)
    }

    /// Second `SND2` sub-frame: tag, mode and flags with no payload.
    async fn read_send_v2_metadata(&mut self, path: String) -> Result<SendV2Request> {
        self.read_tag(Tag::Snd2).await?;
        let mode = self.source.read_u32_le().await?;
        let flags = self.source.read_u32_le().await?;
        Ok(SendV2Request { path, mode, flags })
    }
}
