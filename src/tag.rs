//! Four-byte protocol identifiers used by the sync and file-transfer channels.
//!
//! [`Tag`] is the closed set of identifiers this decoder understands. Bytes
//! that do not match any of them are kept verbatim in a [`RawTag`] so errors
//! can report exactly what arrived on the wire.

use std::fmt;

/// A known sync-protocol identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `STAT`: v1 stat request.
    Stat,
    /// `STA2`: v2 stat request following symlinks.
    Sta2,
    /// `LST2`: v2 lstat request.
    Lst2,
    /// `LIST`: v1 directory listing request.
    List,
    /// `LIS2`: v2 directory listing request.
    Lis2,
    /// `SEND`: v1 push request.
    Send,
    /// `SND2`: v2 push request and its metadata sub-frame.
    Snd2,
    /// `RECV`: v1 pull request.
    Recv,
    /// `RCV2`: v2 pull request.
    Rcv2,
    /// `DENT`: v1 directory entry.
    Dent,
    /// `DNT2`: v2 directory entry.
    Dnt2,
    /// `DATA`: file content chunk.
    Data,
    /// `DONE`: end of a chunk stream.
    Done,
    /// `OKAY`: success acknowledgement.
    Okay,
    /// `FAIL`: failure report.
    Fail,
    /// `QUIT`: end of the sync session.
    Quit,
}

impl Tag {
    /// Every known tag, in declaration order.
    pub const ALL: [Tag; 16] = [
        Tag::Stat,
        Tag::Sta2,
        Tag::Lst2,
        Tag::List,
        Tag::Lis2,
        Tag::Send,
        Tag::Snd2,
        Tag::Recv,
        Tag::Rcv2,
        Tag::Dent,
        Tag::Dnt2,
        Tag::Data,
        Tag::Done,
        Tag::Okay,
        Tag::Fail,
        Tag::Quit,
    ];

    /// The on-wire bytes for this tag.
    #[must_use]
    pub const fn bytes(self) -> [u8; 4] {
        match self {
            Tag::Stat => *b"STAT",
            Tag::Sta2 => *b"STA2",
            Tag::Lst2 => *b"LST2",
            Tag::List => *b"LIST",
            Tag::Lis2 => *b"LIS2",
            Tag::Send => *b"SEND",
            Tag::Snd2 => *b"SND2",
            Tag::Recv => *b"RECV",
            Tag::Rcv2 => *b"RCV2",
            Tag::Dent => *b"DENT",
            Tag::Dnt2 => *b"DNT2",
            Tag::Data => *b"DATA",
            Tag::Done => *b"DONE",
            Tag::Okay => *b"OKAY",
            Tag::Fail => *b"FAIL",
            Tag::Quit => *b"QUIT",
        }
    }

    /// Look up the tag matching `bytes` exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use adbwire::Tag;
    ///
    /// assert_eq!(Tag::from_bytes(*b"SND2"), Some(Tag::Snd2));
    /// assert_eq!(Tag::from_bytes(*b"snd2"), None);
    /// ```
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.bytes() == bytes)
    }

    /// The tag as an ASCII string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tag::Stat => "STAT",
            Tag::Sta2 => "STA2",
            Tag::Lst2 => "LST2",
            Tag::List => "LIST",
            Tag::Lis2 => "LIS2",
            Tag::Send => "SEND",
            Tag::Snd2 => "SND2",
            Tag::Recv => "RECV",
            Tag::Rcv2 => "RCV2",
            Tag::Dent => "DENT",
            Tag::Dnt2 => "DNT2",
            Tag::Data => "DATA",
            Tag::Done => "DONE",
            Tag::Okay => "OKAY",
            Tag::Fail => "FAIL",
            Tag::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Four identifier bytes exactly as read from the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawTag(pub [u8; 4]);

impl RawTag {
    /// The known tag these bytes spell, if any.
    #[must_use]
    pub fn known(self) -> Option<Tag> { Tag::from_bytes(self.0) }

    /// Returns true if these bytes spell `tag`.
    #[must_use]
    pub fn is(self, tag: Tag) -> bool { self.0 == tag.bytes() }
}

impl From<Tag> for RawTag {
    fn from(tag: Tag) -> Self { Self(tag.bytes()) }
}

impl fmt::Display for RawTag {
    /// Printable ASCII is shown as-is; anything else is hex-escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", char::from(byte))?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}
