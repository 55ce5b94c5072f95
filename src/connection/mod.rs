use std::fmt::{self, Debug, Formatter};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::done::MySqlDone;
use crate::error::{Error, Result};
use crate::net::Socket;
use crate::protocol::{ComInitDb, ComPing, ComQuit, Encode, Status};

mod auth;
mod establish;
mod executor;
mod stream;
mod watcher;


pub use executor::MySqlResultSet;
pub use watcher::MySqlCancelHandle;

pub(crate) use stream::MySqlStream;
pub(crate) use watcher::SessionShared;

/// A single session with a MySQL server.
///
/// Sessions are strictly serial: one command is outstanding at a time, and
/// its response is fully consumed before the next command is sent. The
/// only concurrent companion is the cancellation watcher reached through
/// [`cancel_handle`][Self::cancel_handle].
///
/// Any fatal error (I/O, framing, malformed packets) poisons the session;
/// from then on every operation returns
/// [`BadConnection`][Error::BadConnection]. Server-reported errors and
/// parameter-count mismatches leave the session usable.
pub struct MySqlConnection<S = Socket> {
    pub(crate) stream: MySqlStream<S>,

    /// The largest payload we will send; inherited from the options or
    /// discovered from the server right after authentication.
    pub(crate) max_allowed_packet: usize,

    /// The counters of the last OK packet seen.
    pub(crate) result: MySqlDone,
}

impl<S> MySqlConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// A handle for cancelling this session's in-flight operation from
    /// another task.
    pub fn cancel_handle(&self) -> MySqlCancelHandle {
        MySqlCancelHandle {
            shared: self.stream.shared.clone(),
        }
    }

    /// The status bitfield from the most recent OK or EOF packet.
    pub fn server_status(&self) -> Status {
        self.stream.status
    }

    pub fn is_closed(&self) -> bool {
        self.stream.shared.is_closed()
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.stream.shared.is_closed() {
            return Err(Error::BadConnection);
        }

        Ok(())
    }

    pub(crate) async fn send_command<T>(&mut self, packet: T) -> Result<()>
    where
        T: Encode + Debug,
    {
        self.stream.reset_sequence();
        self.stream.send(packet).await
    }

    /// Checks that the session is alive with `COM_PING`.
    pub async fn ping(&mut self) -> Result<()> {
        self.ensure_open()?;

        self.send_command(ComPing).await?;
        self.stream.recv_ok().await?;

        Ok(())
    }

    /// Switches the session's default schema with `COM_INIT_DB`.
    pub async fn select_database(&mut self, database: &str) -> Result<()> {
        self.ensure_open()?;

        self.send_command(ComInitDb { database }).await?;
        self.stream.recv_ok().await?;

        Ok(())
    }

    /// Announces `COM_QUIT` (no reply is read) and shuts the stream down.
    pub async fn close(mut self) -> Result<()> {
        if !self.stream.shared.is_closed() {
            let _ = self.send_command(ComQuit).await;
        }

        self.stream.shared.mark_closed();
        self.stream.shutdown().await;

        Ok(())
    }
}

impl<S> Debug for MySqlConnection<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnection").finish()
    }
}
