//! Error and Result types.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;

use thiserror::Error as ThisError;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All the ways an operation on a MySQL connection can fail.
///
/// Only [`Error::Server`] and [`Error::ParamCountMismatch`] leave the
/// connection usable; every other kind poisons the session, after which all
/// operations return [`Error::BadConnection`].
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// Error communicating with the server.
    #[error("io: {0}")]
    Io(io::Error),

    /// The session was poisoned by an earlier failure; pools should evict
    /// this connection.
    #[error("bad connection")]
    BadConnection,

    /// An `ERR` packet returned by the server. The session remains usable.
    #[error(transparent)]
    Server(#[from] MySqlDatabaseError),

    /// Unexpected or invalid packet data. Context is in the message.
    #[error("malformed packet: {0}")]
    Protocol(Box<str>),

    /// The server's packet sequence number did not match ours.
    #[error("commands out of sync; this connection can no longer be used")]
    CommandsOutOfSync,

    /// The stream accepted fewer bytes than one frame requires.
    #[error("short write")]
    ShortWrite,

    /// The stream ended before a full packet could be read.
    #[error("unexpected EOF on the connection stream")]
    UnexpectedEof,

    /// The per-connection staging buffer was taken while already checked
    /// out. This is a driver bug, not a network condition.
    #[error("busy buffer")]
    BusyBuffer,

    /// The server demanded an authentication plugin this driver does not
    /// implement.
    #[error("unsupported authentication plugin: {0}")]
    UnsupportedAuthPlugin(Box<str>),

    /// A binary row carried a column type this driver cannot decode.
    #[error("unsupported column type 0x{0:02X} in binary row")]
    UnsupportedFieldType(u8),

    /// The column-definition block ended at a different count than the
    /// result-set header declared.
    #[error("column count mismatch: header declared {expected}, read {actual}")]
    ColumnCountMismatch { expected: u64, actual: u64 },

    /// The number of bound arguments does not match the statement's
    /// placeholder count. The session remains usable.
    #[error("parameter count mismatch: statement takes {expected}, got {actual}")]
    ParamCountMismatch { expected: usize, actual: usize },

    /// The cancellation watcher fired; the recorded cause is surfaced in
    /// place of whatever I/O error the interrupted operation saw.
    #[error("operation canceled: {0}")]
    Canceled(Box<str>),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            io::ErrorKind::WriteZero => Error::ShortWrite,
            _ => Error::Io(err),
        }
    }
}

/// An error returned from the server in an `ERR` packet.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_err_packet.html>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlDatabaseError {
    /// The server-defined error number.
    pub number: u16,

    /// The five-character SQLSTATE, when the payload carried one.
    pub sql_state: Option<Box<str>>,

    /// The human-readable error message.
    pub message: Box<str>,
}

impl Display for MySqlDatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(state) = &self.sql_state {
            write!(f, "Error {} ({}): {}", self.number, state, self.message)
        } else {
            write!(f, "Error {}: {}", self.number, self.message)
        }
    }
}

impl StdError for MySqlDatabaseError {}

macro_rules! err_protocol {
    ($($args:tt)*) => {
        $crate::error::Error::Protocol(format!($($args)*).into_boxed_str())
    };
}

#[cfg(test)]
mod tests {
    use super::MySqlDatabaseError;

    #[test]
    fn it_formats_server_errors() {
        let err = MySqlDatabaseError {
            number: 1096,
            sql_state: Some("42S22".into()),
            message: "Unknown col".into(),
        };

        assert_eq!(err.to_string(), "Error 1096 (42S22): Unknown col");

        let err = MySqlDatabaseError {
            number: 1045,
            sql_state: None,
            message: "Access denied".into(),
        };

        assert_eq!(err.to_string(), "Error 1045: Access denied");
    }
}
