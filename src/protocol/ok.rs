use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::{Buf, BufExt};
use crate::protocol::{Decode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_ok_packet.html
// https://mariadb.com/kb/en/ok_packet/
#[derive(Debug)]
pub(crate) struct OkPacket {
    pub(crate) affected_rows: u64,
    pub(crate) last_insert_id: u64,
    pub(crate) status: Status,
    pub(crate) warnings: u16,
}

impl Decode for OkPacket {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0x00 && header != 0xFE {
            return Err(err_protocol!(
                "expected OK (0x00 or 0xFE); received 0x{:X}",
                header
            ));
        }

        let affected_rows = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        let last_insert_id = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        // the warning count (and the info string after it) is absent from
        // pre-4.1 servers
        let warnings = if buf.len() >= 2 {
            buf.get_u16::<LittleEndian>()?
        } else {
            0
        };

        Ok(Self {
            affected_rows,
            last_insert_id,
            status,
            warnings,
        })
    }
}
