use byteorder::LittleEndian;

use crate::arguments::MySqlArgument;
use crate::io::{BufMut, BufMutExt};
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_execute.html
// https://mariadb.com/kb/en/library/com_stmt_execute/
#[derive(Debug)]
pub(crate) struct ComStmtExecute<'a> {
    pub(crate) statement_id: u32,
    pub(crate) args: &'a [MySqlArgument<'a>],

    /// Parameters whose value was already shipped with
    /// COM_STMT_SEND_LONG_DATA; their type bytes are still sent but their
    /// value is omitted here.
    pub(crate) long_data: &'a [bool],
}

impl Encode for ComStmtExecute<'_> {
    fn size_hint(&self) -> usize {
        let values: usize = self
            .args
            .iter()
            .map(|arg| arg.as_bytes().map_or(8, |b| 9 + b.len()))
            .sum();

        10 + (self.args.len() + 7) / 8 + 1 + 2 * self.args.len() + values
    }

    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // COM_STMT_EXECUTE : int<1>
        buf.put_u8(0x17);

        // statement id : int<4>
        buf.put_u32::<LittleEndian>(self.statement_id);

        // cursor flag, always NO_CURSOR : int<1>
        buf.put_u8(0);

        // iteration count, always 1 : int<4>
        buf.put_u32::<LittleEndian>(1);

        if self.args.is_empty() {
            return;
        }

        // NULL bitmap : byte<(param_count + 7) / 8>
        let mut bitmap = vec![0u8; (self.args.len() + 7) / 8];
        for (i, arg) in self.args.iter().enumerate() {
            if arg.is_null() {
                bitmap[i / 8] |= 1 << (i % 8) as u8;
            }
        }
        buf.put_bytes(&bitmap);

        // new params bind flag : int<1>
        buf.put_u8(1);

        // two bytes per parameter: field type and signedness flag
        for arg in self.args {
            let (type_id, flag) = arg.type_bytes();

            buf.put_u8(type_id.0);
            buf.put_u8(flag);
        }

        // concatenated parameter values
        for (i, arg) in self.args.iter().enumerate() {
            if self.long_data.get(i).copied().unwrap_or(false) {
                continue;
            }

            match arg {
                MySqlArgument::Null => {}

                MySqlArgument::Int(v) => buf.put_u64::<LittleEndian>(*v as u64),
                MySqlArgument::UInt(v) => buf.put_u64::<LittleEndian>(*v),

                MySqlArgument::Text(s) => buf.put_str_lenenc::<LittleEndian>(s),
                MySqlArgument::Bytes(b) => buf.put_bytes_lenenc::<LittleEndian>(b),
            }
        }
    }
}
