use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::BufExt;
use crate::protocol::Decode;

/// The first packet of a result set: the number of columns that follow.
#[derive(Debug)]
pub(crate) struct ColumnCount {
    pub(crate) columns: u64,
}

impl Decode for ColumnCount {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let columns = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);

        Ok(Self { columns })
    }
}
