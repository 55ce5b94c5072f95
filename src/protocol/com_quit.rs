use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_quit.html
#[derive(Debug)]
pub(crate) struct ComQuit;

impl Encode for ComQuit {
    fn size_hint(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // COM_QUIT : int<1>
        buf.put_u8(0x01);
    }
}
