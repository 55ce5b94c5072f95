mod decode;
mod encode;

pub(crate) use decode::Decode;
pub(crate) use encode::Encode;

mod auth_plugin;
mod capabilities;
mod field;
mod status;
mod r#type;

pub(crate) use auth_plugin::{xor_cycled, AuthPlugin};
pub(crate) use capabilities::Capabilities;
pub use field::FieldFlags;
pub use r#type::TypeId;
pub use status::Status;

mod com_init_db;
mod com_ping;
mod com_query;
mod com_quit;
mod com_stmt_close;
mod com_stmt_execute;
mod com_stmt_prepare;
mod com_stmt_reset;
mod com_stmt_send_long_data;
mod handshake;
mod handshake_response;

pub(crate) use com_init_db::ComInitDb;
pub(crate) use com_ping::ComPing;
pub(crate) use com_query::ComQuery;
pub(crate) use com_quit::ComQuit;
pub(crate) use com_stmt_close::ComStmtClose;
pub(crate) use com_stmt_execute::ComStmtExecute;
pub(crate) use com_stmt_prepare::ComStmtPrepare;
pub(crate) use com_stmt_reset::ComStmtReset;
pub(crate) use com_stmt_send_long_data::ComStmtSendLongData;
pub(crate) use handshake::Handshake;
pub(crate) use handshake_response::HandshakeResponse;

mod auth_switch;
mod column_count;
mod column_def;
mod com_stmt_prepare_ok;
mod eof;
mod err;
mod ok;
mod row;

pub(crate) use auth_switch::AuthSwitchRequest;
pub(crate) use column_count::ColumnCount;
pub(crate) use column_def::ColumnDefinition;
pub(crate) use com_stmt_prepare_ok::ComStmtPrepareOk;
pub(crate) use eof::{is_eof_packet, EofPacket};
pub(crate) use err::ErrPacket;
pub(crate) use ok::OkPacket;
pub use row::MySqlRow;
