use std::ops::Range;

use byteorder::LittleEndian;
use bytes::Bytes;

use crate::column::MySqlColumn;
use crate::error::{Error, Result};
use crate::io::BufExt;
use crate::protocol::TypeId;

/// One row of a result set.
///
/// Values are kept as slices into the row's packet; [`get`][Self::get]
/// returns the raw value bytes and conversion is the caller's
/// responsibility. In a text result set every value is a string; in a
/// binary result set fixed-width numerics are little-endian and the
/// date/time types use their documented binary forms.
#[derive(Debug)]
pub struct MySqlRow {
    buffer: Bytes,
    values: Box<[Option<Range<usize>>]>,
}

impl MySqlRow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw bytes of the value at `index`; `None` for SQL NULL.
    ///
    /// Panics when `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let range = self.values[index].as_ref()?;

        Some(&self.buffer[range.start..range.end])
    }
}

// reads the lenenc header at `idx`: (value, bytes consumed by the header)
fn lenenc_at(buf: &[u8], idx: usize) -> Result<(Option<u64>, usize)> {
    let mut slice = &buf[idx..];
    let before = slice.len();
    let value = slice.get_uint_lenenc::<LittleEndian>()?;

    Ok((value, before - slice.len()))
}

impl MySqlRow {
    // https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query_response_text_resultset_row.html
    pub(crate) fn decode_text(buffer: Bytes, columns: usize) -> Result<Self> {
        let buf = &buffer[..];
        let mut values = Vec::with_capacity(columns);
        let mut idx = 0;

        for _ in 0..columns {
            let (value, header) = lenenc_at(buf, idx)?;

            match value {
                None => {
                    values.push(None);
                    idx += header;
                }

                Some(len) => {
                    let start = idx + header;
                    let end = start + len as usize;

                    if buf.len() < end {
                        return Err(Error::UnexpectedEof);
                    }

                    values.push(Some(start..end));
                    idx = end;
                }
            }
        }

        Ok(Self {
            buffer,
            values: values.into_boxed_slice(),
        })
    }

    // https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_binary_resultset.html#sect_protocol_binary_resultset_row
    pub(crate) fn decode_binary(buffer: Bytes, columns: &[MySqlColumn]) -> Result<Self> {
        let buf = &buffer[..];

        match buf.first() {
            Some(&0x00) => {}
            Some(header) => {
                return Err(err_protocol!(
                    "expected binary row (0x00); received 0x{:X}",
                    header
                ));
            }
            None => return Err(Error::UnexpectedEof),
        }

        // NULL bitmap : byte<(column_count + 9) / 8>, offset by 2 bits
        let bitmap_len = (columns.len() + 9) / 8;
        if buf.len() < 1 + bitmap_len {
            return Err(Error::UnexpectedEof);
        }
        let bitmap = &buf[1..1 + bitmap_len];

        let mut values = Vec::with_capacity(columns.len());
        let mut idx = 1 + bitmap_len;

        for (i, column) in columns.iter().enumerate() {
            if bitmap[(i + 2) / 8] & (1 << ((i + 2) % 8) as u8) != 0 {
                values.push(None);
                continue;
            }

            let size = match column.type_id {
                TypeId::NULL => {
                    values.push(None);
                    continue;
                }

                TypeId::TINY_INT => 1,
                TypeId::SMALL_INT | TypeId::YEAR => 2,
                TypeId::INT | TypeId::MEDIUM_INT | TypeId::FLOAT => 4,
                TypeId::BIG_INT | TypeId::DOUBLE => 8,

                // a length byte (0, 4, 7, or 11 for dates; 0, 8, or 12 for
                // times) then that many bytes of payload
                TypeId::DATE | TypeId::DATETIME | TypeId::TIMESTAMP | TypeId::TIME => {
                    let len = *buf.get(idx).ok_or(Error::UnexpectedEof)? as usize;
                    let start = idx + 1;
                    let end = start + len;

                    if buf.len() < end {
                        return Err(Error::UnexpectedEof);
                    }

                    values.push(Some(start..end));
                    idx = end;
                    continue;
                }

                TypeId::DECIMAL
                | TypeId::NEW_DECIMAL
                | TypeId::VAR_CHAR
                | TypeId::BIT
                | TypeId::ENUM
                | TypeId::SET
                | TypeId::TINY_BLOB
                | TypeId::MEDIUM_BLOB
                | TypeId::LONG_BLOB
                | TypeId::BLOB
                | TypeId::VAR_STRING
                | TypeId::STRING
                | TypeId::GEOMETRY
                | TypeId::JSON
                | TypeId::VECTOR => {
                    let (value, header) = lenenc_at(buf, idx)?;

                    match value {
                        None => {
                            values.push(None);
                            idx += header;
                        }

                        Some(len) => {
                            let start = idx + header;
                            let end = start + len as usize;

                            if buf.len() < end {
                                return Err(Error::UnexpectedEof);
                            }

                            values.push(Some(start..end));
                            idx = end;
                        }
                    }

                    continue;
                }

                TypeId(other) => return Err(Error::UnsupportedFieldType(other)),
            };

            let end = idx + size;
            if buf.len() < end {
                return Err(Error::UnexpectedEof);
            }

            values.push(Some(idx..end));
            idx = end;
        }

        Ok(Self {
            buffer,
            values: values.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MySqlRow;
    use crate::column::MySqlColumn;
    use crate::error::Error;
    use crate::protocol::{FieldFlags, TypeId};
    use bytes::Bytes;
    use matches::assert_matches;

    fn column(type_id: TypeId, flags: FieldFlags) -> MySqlColumn {
        MySqlColumn {
            name: "c".into(),
            org_name: "c".into(),
            length: 0,
            flags,
            type_id,
            decimals: 0,
            char_set: 0x21,
        }
    }

    #[test]
    fn it_decodes_a_text_row() {
        let row = MySqlRow::decode_text(
            Bytes::from_static(b"\x12information_schema"),
            1,
        )
        .unwrap();

        assert_eq!(row.len(), 1);
        assert_eq!(row.get(0), Some(&b"information_schema"[..]));
    }

    #[test]
    fn it_decodes_text_nulls() {
        let row = MySqlRow::decode_text(Bytes::from_static(b"\xfb\x02hi\xfb"), 3).unwrap();

        assert_eq!(row.get(0), None);
        assert_eq!(row.get(1), Some(&b"hi"[..]));
        assert_eq!(row.get(2), None);
    }

    #[test]
    fn it_rejects_a_text_value_longer_than_the_packet() {
        let row = MySqlRow::decode_text(Bytes::from_static(b"\x10abc"), 1);

        assert_matches!(row, Err(Error::UnexpectedEof));
    }

    #[test]
    fn it_decodes_a_binary_row_with_fixed_and_variable_widths() {
        let columns = [
            column(TypeId::INT, FieldFlags::empty()),
            column(TypeId::VAR_STRING, FieldFlags::empty()),
            column(TypeId::BIG_INT, FieldFlags::UNSIGNED),
        ];

        // marker, bitmap (3 + 9) / 8 = 1 byte, int 4, lenenc str, bigint 8
        let row = MySqlRow::decode_binary(
            Bytes::from_static(b"\x00\x00\x2a\x00\x00\x00\x02hi\x07\x00\x00\x00\x00\x00\x00\x00"),
            &columns,
        )
        .unwrap();

        assert_eq!(row.get(0), Some(&[0x2A, 0, 0, 0][..]));
        assert_eq!(row.get(1), Some(&b"hi"[..]));
        assert_eq!(row.get(2), Some(&[7, 0, 0, 0, 0, 0, 0, 0][..]));
    }

    #[test]
    fn it_honors_the_null_bitmap_offset() {
        let columns = [
            column(TypeId::INT, FieldFlags::empty()),
            column(TypeId::INT, FieldFlags::empty()),
        ];

        // bit 2 of the bitmap marks the first column, bit 3 the second
        let row = MySqlRow::decode_binary(
            Bytes::from_static(b"\x00\x04\x01\x00\x00\x00"),
            &columns,
        )
        .unwrap();

        assert_eq!(row.get(0), None);
        assert_eq!(row.get(1), Some(&[1, 0, 0, 0][..]));
    }

    #[test]
    fn it_decodes_binary_datetimes_by_their_length_byte() {
        let columns = [
            column(TypeId::DATETIME, FieldFlags::empty()),
            column(TypeId::TINY_INT, FieldFlags::empty()),
        ];

        // datetime with the 4-byte (date-only) form: 2024-02-29
        let row = MySqlRow::decode_binary(
            Bytes::from_static(b"\x00\x00\x04\xe8\x07\x02\x1d\x05"),
            &columns,
        )
        .unwrap();

        assert_eq!(row.get(0), Some(&[0xE8, 0x07, 0x02, 0x1D][..]));
        assert_eq!(row.get(1), Some(&[5][..]));
    }

    #[test]
    fn it_rejects_unknown_field_types() {
        let columns = [column(TypeId(14), FieldFlags::empty())];

        let row = MySqlRow::decode_binary(Bytes::from_static(b"\x00\x00\x01"), &columns);

        assert_matches!(row, Err(Error::UnsupportedFieldType(14)));
    }
}
