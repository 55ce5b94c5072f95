use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_close.html
//
// No response is sent for this command.
#[derive(Debug)]
pub(crate) struct ComStmtClose {
    pub(crate) statement_id: u32,
}

impl Encode for ComStmtClose {
    fn size_hint(&self) -> usize {
        5
    }

    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // COM_STMT_CLOSE : int<1>
        buf.put_u8(0x19);

        // statement id : int<4>
        buf.put_u32::<LittleEndian>(self.statement_id);
    }
}
