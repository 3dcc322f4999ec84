//! Client-side encoders and in-memory harnesses for testing
//! [`DeviceDecoder`](adbwire::DeviceDecoder).
//!
//! The encoders build the bytes a real client would write; the harnesses
//! feed them to a decoder either from memory or through a
//! `tokio::io::duplex` pipe that delivers them in small pieces.
//!
//! ```rust
//! use adbwire::Tag;
//! use adbwire_testing::{decoder_for, encode_sync};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut decoder = decoder_for(encode_sync(Tag::Stat, b"/sdcard"));
//! assert_eq!(decoder.receive_stat().await.unwrap(), "/sdcard");
//! # }
//! ```

pub mod encode;
pub mod harness;
pub mod logging;
pub mod sink;

pub use encode::{
    encode_command,
    encode_data,
    encode_done,
    encode_file,
    encode_quit,
    encode_raw_sync,
    encode_send_v2,
    encode_shell,
    encode_shell_raw,
    encode_sync,
};
pub use harness::{decoder_for, decoder_over_duplex, decoder_with_config};
pub use logging::{LoggerHandle, logger};
pub use sink::RecordingSink;
