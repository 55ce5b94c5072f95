use std::mem;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

pub(crate) const DEFAULT_BUF_SIZE: usize = 4096;

// Regions grown past this are handed out once and never re-cached.
const MAX_CACHED_BUF_SIZE: usize = 256 * 1024;

/// The reusable read/write staging area backing exactly one connection.
///
/// The write cache is either *idle* or *busy* (checked out to a caller
/// building an outgoing packet); taking it while busy is a driver bug and
/// fails with [`Error::BusyBuffer`]. The read side keeps any bytes left
/// over from the previous packet.
pub(crate) struct Buffer {
    cache: Vec<u8>,
    busy: bool,
    rbuf: BytesMut,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self {
            cache: Vec::with_capacity(DEFAULT_BUF_SIZE),
            busy: false,
            rbuf: BytesMut::with_capacity(DEFAULT_BUF_SIZE),
        }
    }

    /// Takes the cached region for a payload known to fit the default
    /// capacity.
    pub(crate) fn take_small(&mut self, len: usize) -> Result<Vec<u8>> {
        debug_assert!(len <= DEFAULT_BUF_SIZE);

        self.checkout()
    }

    /// Takes a region with at least `len` bytes of capacity, growing the
    /// cache to the next 4096-byte multiple when the request does not fit.
    /// Regions past 256 KiB are one-off allocations; the cache is left
    /// untouched for the next packet.
    pub(crate) fn take_sized(&mut self, len: usize) -> Result<Vec<u8>> {
        if self.busy {
            return Err(Error::BusyBuffer);
        }

        if len > self.cache.capacity() {
            let grown = (len / DEFAULT_BUF_SIZE + 1) * DEFAULT_BUF_SIZE;

            if grown > MAX_CACHED_BUF_SIZE {
                self.busy = true;
                return Ok(Vec::with_capacity(grown));
            }

            self.cache = Vec::with_capacity(grown);
        }

        self.checkout()
    }

    /// Hands out the whole cached region for scatter-write patterns where
    /// the final length is not known up front.
    pub(crate) fn take_complete(&mut self) -> Result<Vec<u8>> {
        self.checkout()
    }

    fn checkout(&mut self) -> Result<Vec<u8>> {
        if self.busy {
            return Err(Error::BusyBuffer);
        }

        self.busy = true;

        let mut buf = mem::take(&mut self.cache);
        buf.clear();

        Ok(buf)
    }

    /// Returns a taken region. Anything up to 256 KiB that outgrew the
    /// current cache becomes the new cache.
    pub(crate) fn store(&mut self, mut buf: Vec<u8>) {
        buf.clear();

        if buf.capacity() <= MAX_CACHED_BUF_SIZE && buf.capacity() > self.cache.capacity() {
            self.cache = buf;
        }

        self.busy = false;
    }

    /// Extends the read staging area to at least `need` unread bytes,
    /// retrying transient short reads. A stream that ends before `need` is
    /// met is [`Error::UnexpectedEof`].
    pub(crate) async fn fill<S>(&mut self, stream: &mut S, need: usize) -> Result<()>
    where
        S: AsyncRead + Unpin,
    {
        while self.rbuf.len() < need {
            self.rbuf.reserve(need - self.rbuf.len());

            let n = stream.read_buf(&mut self.rbuf).await?;

            if n == 0 {
                return Err(Error::UnexpectedEof);
            }
        }

        Ok(())
    }

    /// Detaches the next `need` bytes from the staging area; any remainder
    /// is kept for the following packet. Callers must `fill` first.
    pub(crate) fn read_next(&mut self, need: usize) -> Bytes {
        debug_assert!(self.rbuf.len() >= need);

        self.rbuf.split_to(need).freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::{Buffer, DEFAULT_BUF_SIZE};
    use crate::error::Error;
    use matches::assert_matches;

    #[test]
    fn it_rejects_taking_while_busy() {
        let mut buffer = Buffer::new();

        let held = buffer.take_small(64).unwrap();
        assert_matches!(buffer.take_small(64), Err(Error::BusyBuffer));
        assert_matches!(buffer.take_complete(), Err(Error::BusyBuffer));

        buffer.store(held);
        assert!(buffer.take_complete().is_ok());
    }

    #[test]
    fn it_grows_to_the_next_multiple_and_recaches() {
        let mut buffer = Buffer::new();

        let buf = buffer.take_sized(DEFAULT_BUF_SIZE + 1).unwrap();
        assert_eq!(buf.capacity(), 2 * DEFAULT_BUF_SIZE);
        buffer.store(buf);

        // the grown region stayed cached
        let buf = buffer.take_complete().unwrap();
        assert_eq!(buf.capacity(), 2 * DEFAULT_BUF_SIZE);
        buffer.store(buf);
    }

    #[test]
    fn it_does_not_cache_oversized_regions() {
        let mut buffer = Buffer::new();

        let big = buffer.take_sized(512 * 1024).unwrap();
        assert!(big.capacity() > 512 * 1024);
        buffer.store(big);

        let buf = buffer.take_complete().unwrap();
        assert_eq!(buf.capacity(), DEFAULT_BUF_SIZE);
        buffer.store(buf);
    }

    #[tokio::test]
    async fn it_keeps_leftover_bytes_between_fills() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut server, b"abcdef")
            .await
            .unwrap();

        let mut buffer = Buffer::new();
        buffer.fill(&mut client, 4).await.unwrap();

        assert_eq!(&buffer.read_next(4)[..], b"abcd");

        // "ef" was staged by the first read and must survive
        buffer.fill(&mut client, 2).await.unwrap();
        assert_eq!(&buffer.read_next(2)[..], b"ef");
    }

    #[tokio::test]
    async fn it_maps_eof_with_insufficient_bytes() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut server, b"ab")
            .await
            .unwrap();
        drop(server);

        let mut buffer = Buffer::new();

        assert_matches!(
            buffer.fill(&mut client, 4).await,
            Err(Error::UnexpectedEof)
        );
    }
}
