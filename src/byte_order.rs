//! Helpers for explicit little-endian conversions.
//!
//! Every binary integer on the sync, file and shell v2 channels travels
//! least-significant byte first. Keeping the conversions in one place makes the
//! wire endianness obvious at each call site.

/// Serialise a `u32` in little-endian byte order.
///
/// # Examples
///
/// ```
/// use adbwire::byte_order::write_le_u32;
///
/// assert_eq!(write_le_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_le_u32(value: u32) -> [u8; 4] { value.to_le_bytes() }

/// Parse a little-endian `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use adbwire::byte_order::read_le_u32;
///
/// assert_eq!(read_le_u32([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_le_u32(bytes: [u8; 4]) -> u32 { u32::from_le_bytes(bytes) }

/// Split an 8-byte chunk header into its tag bytes and little-endian size.
///
/// # Examples
///
/// ```
/// use adbwire::byte_order::split_chunk_header;
///
/// let (tag, size) = split_chunk_header(*b"DATA\x10\x00\x00\x00");
/// assert_eq!(&tag, b"DATA");
/// assert_eq!(size, 16);
/// ```
#[must_use]
pub fn split_chunk_header(header: [u8; 8]) -> ([u8; 4], u32) {
    let [t0, t1, t2, t3, s0, s1, s2, s3] = header;
    ([t0, t1, t2, t3], read_le_u32([s0, s1, s2, s3]))
}
