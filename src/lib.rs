//! Core of the MySQL client driver.
//!
//! This crate implements the connection phase and the command phase of the
//! MySQL client/server protocol: packet framing, `mysql_native_password` and
//! `caching_sha2_password` authentication, text queries, and prepared
//! statements with binary result sets. Connection-string parsing, pooling,
//! TLS, and the public driver facade live above this crate; it consumes a
//! [`MySqlConnectOptions`] record and a connected byte stream.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/latest/PAGE_PROTOCOL.html>

#[macro_use]
mod error;

mod arguments;
mod column;
mod connection;
mod done;
mod io;
mod net;
mod options;
mod protocol;
mod statement;

pub use arguments::MySqlArgument;
pub use column::MySqlColumn;
pub use connection::{MySqlCancelHandle, MySqlConnection, MySqlResultSet};
pub use done::MySqlDone;
pub use error::{Error, MySqlDatabaseError, Result};
pub use net::Socket;
pub use options::{MySqlConnectOptions, NetworkKind};
pub use protocol::{FieldFlags, MySqlRow, Status, TypeId};
pub use statement::MySqlStatement;
