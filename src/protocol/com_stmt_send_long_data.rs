use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_send_long_data.html
//
// Sent ahead of COM_STMT_EXECUTE for parameter values too large to inline;
// the server accumulates chunks per parameter. No response is sent.
#[derive(Debug)]
pub(crate) struct ComStmtSendLongData<'a> {
    pub(crate) statement_id: u32,
    pub(crate) param_id: u16,
    pub(crate) data: &'a [u8],
}

impl Encode for ComStmtSendLongData<'_> {
    fn size_hint(&self) -> usize {
        7 + self.data.len()
    }

    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // COM_STMT_SEND_LONG_DATA : int<1>
        buf.put_u8(0x18);

        // statement id : int<4>
        buf.put_u32::<LittleEndian>(self.statement_id);

        // parameter id : int<2>
        buf.put_u16::<LittleEndian>(self.param_id);

        // data : string<EOF>
        buf.put_bytes(self.data);
    }
}
