use byteorder::LittleEndian;

use crate::error::{MySqlDatabaseError, Result};
use crate::io::Buf;
use crate::protocol::Decode;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_err_packet.html
// https://mariadb.com/kb/en/err_packet/
#[derive(Debug)]
pub(crate) struct ErrPacket {
    pub(crate) error_code: u16,
    pub(crate) sql_state: Option<Box<str>>,
    pub(crate) error_message: Box<str>,
}

impl Decode for ErrPacket {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFF {
            return Err(err_protocol!("expected ERR (0xFF); received 0x{:X}", header));
        }

        let error_code = buf.get_u16::<LittleEndian>()?;

        // the SQLSTATE is present only when the payload continues with the
        // '#' marker
        let sql_state = if buf.first() == Some(&b'#') {
            buf.get_u8()?;
            Some(buf.get_str(5)?.into())
        } else {
            None
        };

        let error_message = buf.get_str(buf.len())?.into();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}

impl From<ErrPacket> for MySqlDatabaseError {
    fn from(packet: ErrPacket) -> Self {
        Self {
            number: packet.error_code,
            sql_state: packet.sql_state,
            message: packet.error_message,
        }
    }
}
