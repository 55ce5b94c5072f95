use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::Buf;
use crate::protocol::Decode;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_prepare.html#sect_protocol_com_stmt_prepare_response_ok
#[derive(Debug)]
pub(crate) struct ComStmtPrepareOk {
    pub(crate) statement_id: u32,

    /// Number of columns in the returned result set, or 0 when the
    /// statement does not return one.
    pub(crate) columns: u16,

    /// Number of `?` placeholders.
    pub(crate) params: u16,

    pub(crate) warnings: u16,
}

impl Decode for ComStmtPrepareOk {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0x00 {
            return Err(err_protocol!(
                "expected COM_STMT_PREPARE_OK (0x00); received 0x{:X}",
                header
            ));
        }

        let statement_id = buf.get_u32::<LittleEndian>()?;
        let columns = buf.get_u16::<LittleEndian>()?;
        let params = buf.get_u16::<LittleEndian>()?;

        // reserved : string<1>
        buf.get_bytes(1)?;

        let warnings = buf.get_u16::<LittleEndian>()?;

        Ok(Self {
            statement_id,
            columns,
            params,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ComStmtPrepareOk, Decode};

    const PREPARE_OK: &[u8] = b"\x00\x04\x03\x02\x01\x00\x00\x01\x00\x00\x00\x00";

    #[test]
    fn it_decodes_a_prepare_ok() {
        let p = ComStmtPrepareOk::decode(PREPARE_OK).unwrap();

        assert_eq!(p.statement_id, 0x0102_0304);
        assert_eq!(p.columns, 0);
        assert_eq!(p.params, 1);
        assert_eq!(p.warnings, 0);
    }
}
