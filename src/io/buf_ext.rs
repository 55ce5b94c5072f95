use std::io;

use byteorder::ByteOrder;

use crate::io::Buf;

/// Length-encoded ("lenenc") reads, the variable-width formats used
/// throughout the MySQL wire protocol.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_dt_integers.html#sect_protocol_basic_dt_int_le>
pub(crate) trait BufExt<'a> {
    /// Reads a length-encoded integer; `None` is the NULL marker (`0xFB`).
    ///
    /// An empty buffer decodes as NULL. Callers feed partially filled
    /// buffers and rely on that sentinel instead of an error.
    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<u64>>;

    fn get_str_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a str>>;

    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a [u8]>>;
}

impl<'a> BufExt<'a> for &'a [u8] {
    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<u64>> {
        if self.is_empty() {
            return Ok(None);
        }

        Ok(match self.get_u8()? {
            0xFB => None,
            0xFC => Some(u64::from(self.get_u16::<T>()?)),
            0xFD => Some(u64::from(self.get_u24::<T>()?)),
            0xFE => Some(self.get_u64::<T>()?),

            value => Some(u64::from(value)),
        })
    }

    fn get_str_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a str>> {
        self.get_uint_lenenc::<T>()?
            .map(move |len| self.get_str(len as usize))
            .transpose()
    }

    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> io::Result<Option<&'a [u8]>> {
        self.get_uint_lenenc::<T>()?
            .map(move |len| self.get_bytes(len as usize))
            .transpose()
    }
}
