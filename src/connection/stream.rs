use std::future::Future;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::connection::watcher::SessionShared;
use crate::error::{Error, Result};
use crate::io::{BufMut, Buffer, DEFAULT_BUF_SIZE};
use crate::protocol::{Capabilities, Decode, Encode, EofPacket, ErrPacket, OkPacket, Status};

/// The payload limit of a single frame; logical packets at or above this
/// size are split on write and reassembled on read.
pub(crate) const MAX_PACKET_SIZE: usize = 0xFF_FF_FF;

/// The framed transport of one session: a stream socket plus the staging
/// buffer, the wrapping sequence counter, and the last status flags seen
/// from the server.
///
/// Packets are sequence-numbered per command in both directions; a receive
/// whose sequence does not match ours poisons the session.
pub(crate) struct MySqlStream<S> {
    socket: S,
    buffer: Buffer,
    pub(crate) sequence: u8,
    pub(crate) capabilities: Capabilities,
    pub(crate) status: Status,
    pub(crate) shared: Arc<SessionShared>,
}

impl<S> MySqlStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(socket: S) -> Self {
        Self {
            socket,
            buffer: Buffer::new(),
            sequence: 0,
            capabilities: Capabilities::empty(),
            status: Status::empty(),
            shared: SessionShared::new(),
        }
    }

    /// The sequence number is 0 at the start of every client-originated
    /// command.
    pub(crate) fn reset_sequence(&mut self) {
        self.sequence = 0;
    }

    /// Closes the session and settles which error the caller sees: a cause
    /// recorded by the cancellation watcher wins over the raw error.
    pub(crate) fn poison(&self, err: Error) -> Error {
        self.shared.mark_closed();

        if matches!(err, Error::Canceled(_)) {
            return err;
        }

        match self.shared.canceled_cause() {
            Some(cause) => Error::Canceled(cause),
            None => err,
        }
    }

    /// Receives one logical packet, reassembling split frames.
    pub(crate) async fn recv(&mut self) -> Result<Bytes> {
        let mut joined: Option<BytesMut> = None;

        loop {
            // frame header: length : int<3>, sequence : int<1>
            let Self {
                socket,
                buffer,
                shared,
                ..
            } = &mut *self;
            if let Err(err) = watched(shared, buffer.fill(socket, 4)).await {
                return Err(self.poison(err));
            }

            let header = self.buffer.read_next(4);
            let len = LittleEndian::read_u24(&header) as usize;

            if header[3] != self.sequence {
                return Err(self.poison(Error::CommandsOutOfSync));
            }
            self.sequence = self.sequence.wrapping_add(1);

            let Self {
                socket,
                buffer,
                shared,
                ..
            } = &mut *self;
            if let Err(err) = watched(shared, buffer.fill(socket, len)).await {
                return Err(self.poison(err));
            }

            let payload = self.buffer.read_next(len);

            // a logical message ends at the first frame strictly shorter
            // than the limit
            if len < MAX_PACKET_SIZE {
                return Ok(match joined {
                    None => payload,
                    Some(mut acc) => {
                        acc.extend_from_slice(&payload);
                        acc.freeze()
                    }
                });
            }

            match &mut joined {
                Some(acc) => acc.extend_from_slice(&payload),
                None => joined = Some(BytesMut::from(&payload[..])),
            }
        }
    }

    /// Stages `packet` behind 4 reserved header bytes and writes it out.
    pub(crate) async fn send<T>(&mut self, packet: T) -> Result<()>
    where
        T: Encode + std::fmt::Debug,
    {
        log::trace!("sending {:?}", packet);

        let size = 4 + packet.size_hint();
        let take = if size <= DEFAULT_BUF_SIZE {
            self.buffer.take_small(size)
        } else {
            self.buffer.take_sized(size)
        };

        let mut buf = match take {
            Ok(buf) => buf,
            Err(err) => return Err(self.poison(err)),
        };

        buf.advance(4);
        packet.encode(&mut buf, self.capabilities);

        self.write_packet(buf).await
    }

    /// Sends a raw payload; used for the scramble and key-exchange
    /// continuations during authentication.
    pub(crate) async fn send_bytes(&mut self, payload: &[u8]) -> Result<()> {
        let mut buf = match self.buffer.take_complete() {
            Ok(buf) => buf,
            Err(err) => return Err(self.poison(err)),
        };

        buf.advance(4);
        buf.extend_from_slice(payload);

        self.write_packet(buf).await
    }

    /// Writes a staged buffer (payload prefixed by 4 reserved header
    /// bytes) as one or more frames, then returns the region to the cache.
    pub(crate) async fn write_packet(&mut self, mut buf: Vec<u8>) -> Result<()> {
        let result = self.write_frames(&mut buf).await;
        self.buffer.store(buf);

        result.map_err(|err| self.poison(err))
    }

    async fn write_frames(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut remaining = buf.len() - 4;
        let mut window = buf;

        loop {
            let size = remaining.min(MAX_PACKET_SIZE);

            LittleEndian::write_u24(&mut window[..3], size as u32);
            window[3] = self.sequence;

            let Self { socket, shared, .. } = &mut *self;
            watched(shared, socket.write_all(&window[..4 + size])).await?;

            self.sequence = self.sequence.wrapping_add(1);

            // an exact multiple of the limit is terminated by an empty
            // frame, which falls out of the loop naturally
            if size != MAX_PACKET_SIZE {
                break;
            }

            remaining -= size;

            // the next frame header overwrites the tail of the chunk that
            // was just transmitted
            let taken = window;
            window = &mut taken[size..];
        }

        let Self { socket, shared, .. } = &mut *self;
        watched(shared, socket.flush()).await
    }

    pub(crate) fn handle_ok(&mut self, buf: &[u8]) -> Result<OkPacket> {
        let ok = match OkPacket::decode(buf) {
            Ok(ok) => ok,
            Err(err) => return Err(self.poison(err)),
        };

        if ok.warnings > 0 {
            log::debug!("server reported {} warnings", ok.warnings);
        }

        self.status = ok.status;

        Ok(ok)
    }

    /// Surfaces an ERR packet as a typed server error; the session stays
    /// usable. A payload that fails to parse as ERR poisons instead.
    pub(crate) fn handle_err(&mut self, buf: &[u8]) -> Error {
        match ErrPacket::decode(buf) {
            Ok(err) => Error::Server(err.into()),
            Err(err) => self.poison(err),
        }
    }

    pub(crate) fn handle_eof(&mut self, buf: &[u8]) -> Result<EofPacket> {
        let eof = match EofPacket::decode(buf) {
            Ok(eof) => eof,
            Err(err) => return Err(self.poison(err)),
        };

        if eof.warnings > 0 {
            log::trace!("eof carried {} warnings", eof.warnings);
        }

        // the 1-byte back-compat form carries no status to record
        if buf.len() >= 5 {
            self.status = eof.status;
        }

        Ok(eof)
    }

    pub(crate) async fn recv_ok(&mut self) -> Result<OkPacket> {
        let payload = self.recv().await?;

        match payload.first() {
            Some(&0x00) => self.handle_ok(&payload),
            Some(&0xFF) => Err(self.handle_err(&payload)),
            Some(id) => Err(self.poison(err_protocol!(
                "expected OK (0x00) or ERR (0xFF); received 0x{:X}",
                id
            ))),
            None => Err(self.poison(err_protocol!(
                "expected OK (0x00) or ERR (0xFF); received an empty packet"
            ))),
        }
    }

    pub(crate) async fn shutdown(&mut self) {
        let _ = self.socket.shutdown().await;
    }
}

async fn watched<T, E>(
    shared: &SessionShared,
    io: impl Future<Output = Result<T, E>>,
) -> Result<T>
where
    Error: From<E>,
{
    let mut cancel = shared.cancellation();

    if *cancel.borrow() {
        return Err(Error::Canceled(cancel_cause(shared)));
    }

    tokio::select! {
        biased;

        _ = cancel.changed() => Err(Error::Canceled(cancel_cause(shared))),
        r = io => r.map_err(Error::from),
    }
}

fn cancel_cause(shared: &SessionShared) -> Box<str> {
    shared
        .canceled_cause()
        .unwrap_or_else(|| "operation canceled".into())
}

#[cfg(test)]
mod tests {
    use super::{MySqlStream, MAX_PACKET_SIZE};
    use crate::error::Error;
    use matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    fn stream_pair() -> (MySqlStream<DuplexStream>, DuplexStream) {
        let (client, server) = tokio::io::duplex(1 << 20);

        (MySqlStream::new(client), server)
    }

    #[tokio::test]
    async fn it_reads_a_single_frame_packet() {
        let (mut stream, mut server) = stream_pair();

        server.write_all(b"\x05\x00\x00\x00hello").await.unwrap();

        let payload = stream.recv().await.unwrap();
        assert_eq!(&payload[..], b"hello");
        assert_eq!(stream.sequence, 1);
    }

    #[tokio::test]
    async fn it_rejects_an_out_of_sync_sequence() {
        let (mut stream, mut server) = stream_pair();

        // first response frame arrives with sequence 5 instead of 0
        server.write_all(b"\x01\x00\x00\x05\x00").await.unwrap();

        assert_matches!(stream.recv().await, Err(Error::CommandsOutOfSync));
        assert!(stream.shared.is_closed());
    }

    #[tokio::test]
    async fn it_reassembles_split_packets() {
        let (mut stream, mut server) = stream_pair();

        let total = MAX_PACKET_SIZE + 3;
        let body = vec![0xA5u8; total];

        let writer = tokio::spawn(async move {
            let mut frame = Vec::with_capacity(4 + MAX_PACKET_SIZE);
            frame.extend_from_slice(b"\xff\xff\xff\x00");
            frame.extend_from_slice(&vec![0xA5u8; MAX_PACKET_SIZE]);
            server.write_all(&frame).await.unwrap();
            server.write_all(b"\x03\x00\x00\x01\xa5\xa5\xa5").await.unwrap();
            server
        });

        let payload = stream.recv().await.unwrap();
        assert_eq!(payload.len(), total);
        assert_eq!(&payload[..], &body[..]);

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn it_joins_an_exact_multiple_with_its_empty_terminator() {
        let (mut stream, mut server) = stream_pair();

        let writer = tokio::spawn(async move {
            let mut frame = Vec::with_capacity(4 + MAX_PACKET_SIZE);
            frame.extend_from_slice(b"\xff\xff\xff\x00");
            frame.extend_from_slice(&vec![1u8; MAX_PACKET_SIZE]);
            server.write_all(&frame).await.unwrap();
            server.write_all(b"\x00\x00\x00\x01").await.unwrap();
            server
        });

        let payload = stream.recv().await.unwrap();
        assert_eq!(payload.len(), MAX_PACKET_SIZE);

        writer.await.unwrap();
    }

    async fn written_frames(payload_len: usize) -> Vec<(usize, u8)> {
        let (client, server) = tokio::io::duplex(64 * 1024 * 1024);
        let mut stream = MySqlStream::new(client);

        let mut buf = vec![0u8; 4];
        buf.extend(std::iter::repeat(0x5A).take(payload_len));
        stream.write_packet(buf).await.unwrap();
        drop(stream);

        let mut raw = Vec::new();
        let mut server = server;
        server.read_to_end(&mut raw).await.unwrap();

        // (length, sequence) per frame, with the payload bytes verified
        let mut frames = Vec::new();
        let mut idx = 0;
        while idx < raw.len() {
            let len = u32::from_le_bytes([raw[idx], raw[idx + 1], raw[idx + 2], 0]) as usize;
            let seq = raw[idx + 3];
            assert!(raw[idx + 4..idx + 4 + len].iter().all(|b| *b == 0x5A));
            frames.push((len, seq));
            idx += 4 + len;
        }
        assert_eq!(idx, raw.len());

        frames
    }

    #[tokio::test]
    async fn it_writes_small_packets_in_one_frame() {
        assert_eq!(written_frames(5).await, vec![(5, 0)]);
        assert_eq!(written_frames(0).await, vec![(0, 0)]);
    }

    #[tokio::test]
    async fn it_splits_large_packets_at_the_frame_limit() {
        assert_eq!(
            written_frames(MAX_PACKET_SIZE + 1000).await,
            vec![(MAX_PACKET_SIZE, 0), (1000, 1)]
        );
    }

    #[tokio::test]
    async fn it_terminates_an_exact_multiple_with_an_empty_frame() {
        assert_eq!(
            written_frames(MAX_PACKET_SIZE).await,
            vec![(MAX_PACKET_SIZE, 0), (0, 1)]
        );
    }

    #[tokio::test]
    async fn a_round_trip_preserves_every_payload_size() {
        for size in [0, 1, 100, MAX_PACKET_SIZE - 1, MAX_PACKET_SIZE, MAX_PACKET_SIZE + 1] {
            let (client, server) = tokio::io::duplex(64 * 1024 * 1024);
            let mut writer = MySqlStream::new(client);
            let mut reader = MySqlStream::new(server);

            let mut buf = vec![0u8; 4];
            buf.extend((0..size).map(|i| i as u8));

            let send = tokio::spawn(async move {
                writer.write_packet(buf).await.unwrap();
                writer
            });

            let payload = reader.recv().await.unwrap();
            assert_eq!(payload.len(), size);
            assert!(payload.iter().enumerate().all(|(i, b)| *b == i as u8));

            send.await.unwrap();
        }
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_blocked_read_with_its_cause() {
        let (mut stream, _server) = stream_pair();

        let shared = stream.shared.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            shared.cancel("deadline exceeded");
        });

        // no bytes ever arrive; only the watcher can unblock this read
        let err = stream.recv().await.unwrap_err();
        assert_matches!(err, Error::Canceled(cause) if &*cause == "deadline exceeded");
        assert!(stream.shared.is_closed());
    }

    #[tokio::test]
    async fn a_recorded_cancellation_wins_over_the_raw_io_error() {
        let (mut stream, server) = stream_pair();

        stream.shared.cancel("query timeout");
        drop(server);

        let err = stream.recv().await.unwrap_err();
        assert_matches!(err, Error::Canceled(cause) if &*cause == "query timeout");
    }
}
