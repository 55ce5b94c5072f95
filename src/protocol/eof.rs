use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::Buf;
use crate::protocol::{Decode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_eof_packet.html
// https://mariadb.com/kb/en/eof_packet/
#[derive(Debug)]
pub(crate) struct EofPacket {
    pub(crate) warnings: u16,
    pub(crate) status: Status,
}

/// Is this payload the EOF that terminates a column or row stream?
///
/// The 5-byte form carries warnings and status; some very old servers send
/// a bare 1-byte form. Anything longer that begins with `0xFE` is data (a
/// row whose first field starts with a lenenc-8 header).
pub(crate) fn is_eof_packet(buf: &[u8]) -> bool {
    buf.first() == Some(&0xFE) && buf.len() <= 5
}

impl Decode for EofPacket {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(err_protocol!("expected EOF (0xFE); received 0x{:X}", header));
        }

        // the 1-byte back-compat form carries neither field
        let (warnings, status) = if buf.len() >= 4 {
            (
                buf.get_u16::<LittleEndian>()?,
                Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?),
            )
        } else {
            (0, Status::empty())
        };

        Ok(Self { warnings, status })
    }
}
