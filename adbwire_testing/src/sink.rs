//! An in-memory file sink that records how it was driven.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::AsyncWrite;

/// Collects written bytes and counts flushes and shutdowns.
///
/// Writes after shutdown fail with [`io::ErrorKind::BrokenPipe`]. Setting
/// `fail_writes` makes every write fail with [`io::ErrorKind::Other`].
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Bytes accepted so far.
    pub data: Vec<u8>,
    /// Number of completed `poll_flush` calls.
    pub flushes: usize,
    /// Number of completed `poll_shutdown` calls.
    pub shutdowns: usize,
    /// Reject all writes.
    pub fail_writes: bool,
}

impl RecordingSink {
    /// A sink whose writes always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl AsyncWrite for RecordingSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.shutdowns > 0 {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write after shutdown",
            )));
        }
        if this.fail_writes {
            return Poll::Ready(Err(io::Error::other("sink rejected write")));
        }
        this.data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().flushes += 1;
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}
