//! Decoders over in-memory byte streams.

use std::io::{self, Cursor};

use adbwire::{DecoderConfig, DeviceDecoder};
use tokio::{
    io::{AsyncWriteExt, DuplexStream, duplex},
    task::JoinHandle,
};

/// Build a decoder reading `bytes` from memory with the default config.
pub fn decoder_for(bytes: impl Into<Vec<u8>>) -> DeviceDecoder<Cursor<Vec<u8>>> {
    decoder_with_config(bytes, DecoderConfig::default())
}

/// Build a decoder reading `bytes` from memory with `config`.
pub fn decoder_with_config(
    bytes: impl Into<Vec<u8>>,
    config: DecoderConfig,
) -> DeviceDecoder<Cursor<Vec<u8>>> {
    DeviceDecoder::with_config(Cursor::new(bytes.into()), config)
}

/// Build a decoder over a duplex pipe fed by a background writer.
///
/// The writer sends `bytes` in pieces of at most `piece` bytes and then
/// closes its half, so every read past the end sees EOF. The pipe holds at
/// most `piece` bytes at a time, forcing the decoder to assemble messages
/// from several partial reads.
///
/// ```rust
/// use adbwire::DecoderConfig;
/// use adbwire_testing::{decoder_over_duplex, encode_command};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut decoder, writer) =
///     decoder_over_duplex(encode_command("shell:ls"), DecoderConfig::default(), 3);
/// assert_eq!(decoder.receive_command().await.unwrap(), "shell:ls");
/// writer.await.unwrap().unwrap();
/// # }
/// ```
///
/// # Panics
///
/// Panics if `piece` is zero.
pub fn decoder_over_duplex(
    bytes: impl Into<Vec<u8>>,
    config: DecoderConfig,
    piece: usize,
) -> (DeviceDecoder<DuplexStream>, JoinHandle<io::Result<()>>) {
    assert!(piece > 0, "piece size must be non-zero");
    let bytes = bytes.into();
    let (mut client, server) = duplex(piece);
    let writer = tokio::spawn(async move {
        for chunk in bytes.chunks(piece) {
            client.write_all(chunk).await?;
        }
        client.shutdown().await
    });
    (DeviceDecoder::with_config(server, config), writer)
}
