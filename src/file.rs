//! Chunked file reception.
//!
//! After a `SEND` or `SND2` request the client streams the file body as a
//! series of chunks, each introduced by an eight-byte header:
//!
//! ```text
//! DATA <size:u32le> <size bytes>
//! DATA <size:u32le> <size bytes>
//! DONE <u32le, ignored>
//! ```
//!
//! [`DeviceDecoder::receive_file`] runs an explicit two-state loop
//! (`Reading` until `DONE`, then `Done`) that appends every `DATA` payload to a
//! caller-supplied sink. The sink is shut down exactly once whichever way the
//! loop exits.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::{
    byte_order::split_chunk_header,
    config::SinkClose,
    decoder::{DeviceDecoder, observe, wire_len},
    error::{DecodeError, ProtocolViolation, Result},
    tag::{RawTag, Tag},
};

/// Eight-byte header preceding each file chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileChunkHeader {
    /// `DATA`, `DONE`, or anything else the peer sent.
    pub tag: RawTag,
    /// Payload size for `DATA`; ignored for `DONE`.
    pub size: u32,
}

impl FileChunkHeader {
    /// Encoded header length.
    pub const LEN: usize = 8;

    /// Split raw header bytes into tag and size.
    #[must_use]
    pub fn parse(bytes: [u8; Self::LEN]) -> Self {
        let (tag, size) = split_chunk_header(bytes);
        Self {
            tag: RawTag(tag),
            size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReceiveState {
    Reading,
    Done,
}

#[derive(Debug, Default)]
struct TransferStats {
    chunks: usize,
    bytes: usize,
}

impl<R: AsyncRead + Unpin> DeviceDecoder<R> {
    /// Receive a chunked file body into `sink` and hand the sink back.
    ///
    /// Each `DATA` payload is written and flushed before the next header is
    /// read. On every exit path the sink is shut down once. A sink may hold
    /// the whole chunks committed before a failure.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnsupportedProtocol`] if a `DATA` header declares more
    ///   than `max_packet_length` bytes. No payload byte is consumed, so the
    ///   stream stays positioned directly after that header.
    /// - [`ProtocolViolation::UnexpectedChunkTag`] for tags other than `DATA`
    ///   and `DONE`.
    /// - [`DecodeError::Io`] for short reads and sink failures, including a
    ///   second `DATA` chunk under [`SinkClose::AfterFirstChunk`].
    pub async fn receive_file<W>(&mut self, mut sink: W) -> Result<W>
    where
        W: AsyncWrite + Unpin,
    {
        let mut closed = false;
        let received = self.copy_chunks(&mut sink, &mut closed).await;
        let shutdown = if closed {
            Ok(())
        } else {
            sink.shutdown().await
        };
        let result = match (received, shutdown) {
            (Ok(stats), Ok(())) => {
                tracing::debug!(chunks = stats.chunks, bytes = stats.bytes, "received file");
                Ok(sink)
            }
            (Ok(_), Err(e)) => Err(DecodeError::Io(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(error = %close_err, "sink shutdown failed after receive error");
                Err(e)
            }
        };
        observe("file", result)
    }

    async fn copy_chunks<W>(&mut self, sink: &mut W, closed: &mut bool) -> Result<TransferStats>
    where
        W: AsyncWrite + Unpin,
    {
        let max = self.config.max_packet_length;
        // Grows to the largest accepted chunk; never beyond `max`.
        let mut chunk: Vec<u8> = Vec::new();
        let mut stats = TransferStats::default();
        let mut state = ReceiveState::Reading;

        while state == ReceiveState::Reading {
            let header = FileChunkHeader::parse(self.source.read_array().await?);
            state = match header.tag.known() {
                Some(Tag::Done) => {
                    tracing::trace!(trailer = header.size, "file chunk stream done");
                    ReceiveState::Done
                }
                Some(Tag::Data) => {
                    let len = wire_len(header.size);
                    if len > max {
                        tracing::warn!(size = header.size, max, "file chunk exceeds packet limit");
                        return Err(DecodeError::UnsupportedProtocol {
                            size: header.size,
                            max,
                        });
                    }
                    if chunk.len() < len {
                        chunk.resize(len, 0);
                    }
                    let buf = &mut chunk[..len];
                    self.source.read_into(buf).await?;
                    if *closed {
                        return Err(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "sink closed after first chunk",
                        )
                        .into());
                    }
                    sink.write_all(buf).await?;
                    sink.flush().await?;
                    stats.chunks += 1;
                    stats.bytes += len;
                    crate::metrics::add_file_bytes(len);
                    tracing::trace!(len, "wrote file chunk");

                    if self.config.sink_close == SinkClose::AfterFirstChunk && stats.chunks == 1 {
                        *closed = true;
                        sink.shutdown().await?;
                    }
                    ReceiveState::Reading
                }
                _ => {
                    tracing::warn!(tag = %header.tag, "unexpected file chunk tag");
                    return Err(ProtocolViolation::UnexpectedChunkTag { found: header.tag }.into());
                }
            };
        }
        Ok(stats)
    }
}
