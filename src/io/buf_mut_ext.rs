use byteorder::ByteOrder;

use crate::io::BufMut;

/// Length-encoded ("lenenc") writes; the encoder always picks the shortest
/// form that fits the value.
pub(crate) trait BufMutExt {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64);

    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str);

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]);
}

impl BufMutExt for Vec<u8> {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64) {
        match val {
            0..=250 => self.put_u8(val as u8),

            251..=0xFF_FF => {
                self.put_u8(0xFC);
                self.put_u16::<T>(val as u16);
            }

            0x1_00_00..=0xFF_FF_FF => {
                self.put_u8(0xFD);
                self.put_u24::<T>(val as u32);
            }

            _ => {
                self.put_u8(0xFE);
                self.put_u64::<T>(val);
            }
        }
    }

    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str) {
        self.put_bytes_lenenc::<T>(val.as_bytes());
    }

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]) {
        self.put_uint_lenenc::<T>(val.len() as u64);
        self.put_bytes(val);
    }
}
