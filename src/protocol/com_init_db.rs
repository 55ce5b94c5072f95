use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_init_db.html
#[derive(Debug)]
pub(crate) struct ComInitDb<'a> {
    pub(crate) database: &'a str,
}

impl Encode for ComInitDb<'_> {
    fn size_hint(&self) -> usize {
        1 + self.database.len()
    }

    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // COM_INIT_DB : int<1>
        buf.put_u8(0x02);

        // schema name : string<EOF>
        buf.put_str(self.database);
    }
}
