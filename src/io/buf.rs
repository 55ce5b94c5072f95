use std::{io, str};

use byteorder::ByteOrder;
use memchr::memchr;

pub(crate) trait Buf<'a> {
    fn advance(&mut self, cnt: usize);

    fn get_u8(&mut self) -> io::Result<u8>;

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16>;

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64>;

    fn get_str(&mut self, len: usize) -> io::Result<&'a str>;

    fn get_str_nul(&mut self) -> io::Result<&'a str>;

    /// Reads a string terminated by NUL or by the end of the buffer,
    /// whichever comes first.
    fn get_str_nul_or_eof(&mut self) -> io::Result<&'a str>;

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]>;
}

impl<'a> Buf<'a> for &'a [u8] {
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn get_u8(&mut self) -> io::Result<u8> {
        let val = *self.first().ok_or(io::ErrorKind::UnexpectedEof)?;
        self.advance(1);

        Ok(val)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16> {
        let buf = self.get_bytes(2)?;

        Ok(T::read_u16(buf))
    }

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32> {
        let buf = self.get_bytes(3)?;

        Ok(T::read_u24(buf))
    }

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32> {
        let buf = self.get_bytes(4)?;

        Ok(T::read_u32(buf))
    }

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64> {
        let buf = self.get_bytes(8)?;

        Ok(T::read_u64(buf))
    }

    fn get_str(&mut self, len: usize) -> io::Result<&'a str> {
        str::from_utf8(self.get_bytes(len)?)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn get_str_nul(&mut self) -> io::Result<&'a str> {
        let len = memchr(b'\0', self).ok_or(io::ErrorKind::InvalidData)?;
        let s = &self.get_str(len + 1)?[..len];

        Ok(s)
    }

    fn get_str_nul_or_eof(&mut self) -> io::Result<&'a str> {
        match memchr(b'\0', self) {
            Some(len) => Ok(&self.get_str(len + 1)?[..len]),
            None => self.get_str(self.len()),
        }
    }

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.len() < len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        let buf = &self[..len];
        self.advance(len);

        Ok(buf)
    }
}
