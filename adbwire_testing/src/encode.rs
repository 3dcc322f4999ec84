//! Encoders for the client side of each frame format.

use adbwire::{ShellPacketId, Tag};
use bytes::BufMut;

/// Encode a legacy service command: four lowercase hex digits, then `text`.
///
/// # Panics
///
/// Panics if `text` is longer than `0xffff` bytes.
#[must_use]
pub fn encode_command(text: &str) -> Vec<u8> {
    assert!(text.len() <= 0xffff, "command too long for hex length");
    format!("{:04x}{text}", text.len()).into_bytes()
}

/// Encode a sync message with a known tag.
#[must_use]
pub fn encode_sync(tag: Tag, payload: &[u8]) -> Vec<u8> { encode_raw_sync(tag.bytes(), payload) }

/// Encode a sync message with arbitrary tag bytes.
///
/// # Panics
///
/// Panics if `payload` does not fit a `u32` length.
#[must_use]
pub fn encode_raw_sync(tag: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).expect("payload too long");
    let mut buf = Vec::with_capacity(8 + payload.len());
    buf.put_slice(&tag);
    buf.put_u32_le(len);
    buf.put_slice(payload);
    buf
}

/// Encode both `SND2` sub-frames.
#[must_use]
pub fn encode_send_v2(path: &str, mode: u32, flags: u32) -> Vec<u8> {
    let mut buf = encode_sync(Tag::Snd2, path.as_bytes());
    buf.put_slice(&Tag::Snd2.bytes());
    buf.put_u32_le(mode);
    buf.put_u32_le(flags);
    buf
}

/// Encode a `QUIT` request with an empty payload.
#[must_use]
pub fn encode_quit() -> Vec<u8> { encode_sync(Tag::Quit, &[]) }

/// Encode one `DATA` chunk.
#[must_use]
pub fn encode_data(chunk: &[u8]) -> Vec<u8> { encode_sync(Tag::Data, chunk) }

/// Encode the `DONE` trailer carrying `mtime`.
#[must_use]
pub fn encode_done(mtime: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    buf.put_slice(&Tag::Done.bytes());
    buf.put_u32_le(mtime);
    buf
}

/// Encode a whole file body: one `DATA` per chunk, then `DONE`.
#[must_use]
pub fn encode_file(chunks: &[&[u8]], mtime: u32) -> Vec<u8> {
    let mut buf: Vec<u8> = chunks.iter().flat_map(|chunk| encode_data(chunk)).collect();
    buf.extend(encode_done(mtime));
    buf
}

/// Encode a shell v2 packet.
#[must_use]
pub fn encode_shell(id: ShellPacketId, payload: &[u8]) -> Vec<u8> {
    encode_shell_raw(id.code(), payload)
}

/// Encode a shell v2 packet with an arbitrary id byte.
///
/// # Panics
///
/// Panics if `payload` does not fit a `u32` length.
#[must_use]
pub fn encode_shell_raw(id: u8, payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).expect("payload too long");
    let mut buf = Vec::with_capacity(5 + payload.len());
    buf.put_u8(id);
    buf.put_u32_le(len);
    buf.put_slice(payload);
    buf
}
