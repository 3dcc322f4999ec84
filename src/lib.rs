#![doc(html_root_url = "https://docs.rs/adbwire/latest")]
//! Device-side decoder for the Android Debug Bridge wire protocol.
//!
//! `adbwire` replays the protocol from the device's point of view: given the
//! bytes a client writes to a connection, it reconstructs the typed messages
//! the client sent. It covers the legacy hex-length service commands, the file
//! sync sub-protocol (v1 and v2), chunked file bodies and the client side of
//! the shell v2 protocol.
//!
//! The caller drives decoding. Each `receive_*` method on [`DeviceDecoder`]
//! consumes exactly one message and fails immediately if the bytes do not
//! match what was asked for.
//!
//! ```
//! use adbwire::DeviceDecoder;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> adbwire::Result<()> {
//! let wire: &[u8] = b"0005sync:SEND\x03\x00\x00\x00abc";
//! let mut decoder = DeviceDecoder::new(wire);
//! assert_eq!(decoder.receive_command().await?, "sync:");
//! assert_eq!(decoder.receive_send().await?, "abc");
//! # Ok(())
//! # }
//! ```

pub mod byte_order;
pub mod command;
pub mod config;
mod decoder;
pub mod error;
pub mod file;
pub mod metrics;
pub mod shell;
pub mod source;
pub mod sync;
pub mod tag;

pub use config::{DEFAULT_MAX_PACKET_LENGTH, DecoderConfig, SinkClose};
pub use decoder::DeviceDecoder;
pub use error::{DecodeError, FormatError, ProtocolViolation, Result};
pub use file::FileChunkHeader;
pub use shell::{ShellPacket, ShellPacketId, WindowSize};
pub use source::ByteSource;
pub use sync::{SendTarget, SendV2Request, SyncMessage, SyncRequest};
pub use tag::{RawTag, Tag};
pub use tokio_util::sync::CancellationToken;
