//! Sequential byte source shared by every decoder.
//!
//! [`ByteSource`] wraps any [`AsyncRead`] and offers the handful of primitive
//! reads the protocol needs: exact byte counts, single bytes and little-endian
//! integers. Each read either completes in full or fails; partial reads are
//! never surfaced. Reads optionally race a per-read deadline and a
//! [`CancellationToken`], failing with [`DecodeError::TimedOut`] or
//! [`DecodeError::Cancelled`] instead of waiting forever.

use std::{io, time::Duration};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::{
    byte_order::read_le_u32,
    error::{DecodeError, Result},
};

/// Exact-read adapter over an ordered byte stream.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    read_timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
    consumed: u64,
}

impl<R> ByteSource<R> {
    /// Wrap `inner` with no deadline and no cancellation.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            read_timeout: None,
            cancel: None,
            consumed: 0,
        }
    }

    /// Apply `timeout` to every subsequent read. `None` waits indefinitely.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Abort in-flight and future reads once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Total bytes consumed by successful reads so far.
    #[must_use]
    pub fn consumed(&self) -> u64 { self.consumed }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R { &self.inner }

    /// Mutably borrow the underlying reader.
    pub fn get_mut(&mut self) -> &mut R { &mut self.inner }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R { self.inner }
}

impl<R: AsyncRead + Unpin> ByteSource<R> {
    /// Fill `buf` completely from the stream.
    ///
    /// The deadline bounds each wait for more data, not the whole fill. Bytes
    /// are counted in [`consumed`](Self::consumed) as soon as they leave the
    /// stream, including those of a fill that later fails.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Io`] if the stream ends or fails before `buf` is
    /// full, [`DecodeError::TimedOut`] if the configured deadline elapses, or
    /// [`DecodeError::Cancelled`] if the cancellation token fires. After
    /// `TimedOut` or `Cancelled` the stream may be positioned inside a
    /// message; `consumed` still reports the true offset but no further
    /// message boundary is known.
    pub async fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_some(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended inside a message",
                )
                .into());
            }
            filled += n;
            self.consumed += n as u64;
        }
        Ok(())
    }

    /// One underlying read, raced against the deadline and cancellation.
    async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        let read_timeout = self.read_timeout;
        let cancel = self.cancel.clone();
        let read = async {
            let fut = self.inner.read(buf);
            match read_timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(res) => res.map_err(DecodeError::from),
                    Err(_) => Err(DecodeError::TimedOut(limit)),
                },
                None => fut.await.map_err(DecodeError::from),
            }
        };
        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(DecodeError::Cancelled),
                res = read => res,
            },
            None => read.await,
        }
    }

    /// Read exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// See [`read_into`](Self::read_into).
    pub async fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(len);
        self.read_into(&mut buf).await?;
        tracing::trace!(len, "read payload");
        Ok(buf.freeze())
    }

    /// Read exactly `N` bytes into an array.
    ///
    /// # Errors
    ///
    /// See [`read_into`](Self::read_into).
    pub async fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf).await?;
        Ok(buf)
    }

    /// Read a single byte.
    ///
    /// # Errors
    ///
    /// See [`read_into`](Self::read_into).
    pub async fn read_byte(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>().await?;
        Ok(byte)
    }

    /// Read a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// See [`read_into`](Self::read_into).
    pub async fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array::<4>().await.map(read_le_u32)
    }
}
