use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::{Buf, BufExt};
use crate::protocol::{Decode, FieldFlags, TypeId};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query_response_text_resultset_column_definition.html
// https://mariadb.com/kb/en/resultset/#column-definition-packet
//
// The schema and table strings are parsed to advance past them but not
// kept; only what the column descriptor carries is retained.
#[derive(Debug)]
pub(crate) struct ColumnDefinition {
    pub(crate) column_alias: Option<Box<str>>,
    pub(crate) column: Option<Box<str>>,
    pub(crate) char_set: u16,
    pub(crate) max_size: u32,
    pub(crate) type_id: TypeId,
    pub(crate) flags: FieldFlags,
    pub(crate) decimals: u8,
}

impl Decode for ColumnDefinition {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        // catalog : string<lenenc>
        let catalog = buf.get_str_lenenc::<LittleEndian>()?;

        if catalog != Some("def") {
            return Err(err_protocol!(
                "expected column definition (catalog \"def\"); received {:?}",
                catalog
            ));
        }

        // schema, table alias, table : string<lenenc>
        buf.get_str_lenenc::<LittleEndian>()?;
        buf.get_str_lenenc::<LittleEndian>()?;
        buf.get_str_lenenc::<LittleEndian>()?;

        let column_alias = buf.get_str_lenenc::<LittleEndian>()?.map(Into::into);
        let column = buf.get_str_lenenc::<LittleEndian>()?.map(Into::into);

        // length of fixed fields, always 0x0C
        let len_fixed_fields = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);

        if len_fixed_fields != 0x0C {
            return Err(err_protocol!(
                "expected column definition fixed-field length 0x0C; received {:?}",
                len_fixed_fields
            ));
        }

        let char_set = buf.get_u16::<LittleEndian>()?;
        let max_size = buf.get_u32::<LittleEndian>()?;

        let type_id = buf.get_u8()?;
        let flags = buf.get_u16::<LittleEndian>()?;
        let decimals = buf.get_u8()?;

        Ok(Self {
            column_alias,
            column,
            char_set,
            max_size,
            type_id: TypeId(type_id),
            flags: FieldFlags::from_bits_truncate(flags),
            decimals,
        })
    }
}

impl ColumnDefinition {
    pub(crate) fn name(&self) -> Option<&str> {
        self.column_alias.as_deref().or(self.column.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnDefinition, Decode, FieldFlags, TypeId};

    // `Database` column of `SHOW DATABASES`
    const COLUMN_DEF: &[u8] = b"\x03def\x12information_schema\x08SCHEMATA\x08SCHEMATA\x08Database\x0bSCHEMA_NAME\x0c\x21\x00\x00\x01\x00\x00\xfd\x01\x00\x00\x00\x00";

    #[test]
    fn it_decodes_a_column_definition() {
        let p = ColumnDefinition::decode(COLUMN_DEF).unwrap();

        assert_eq!(p.column_alias.as_deref(), Some("Database"));
        assert_eq!(p.column.as_deref(), Some("SCHEMA_NAME"));
        assert_eq!(p.name(), Some("Database"));

        assert_eq!(p.char_set, 0x21);
        assert_eq!(p.max_size, 0x100);
        assert_eq!(p.type_id, TypeId::VAR_STRING);
        assert_eq!(p.flags, FieldFlags::NOT_NULL);
        assert_eq!(p.decimals, 0);
    }

    #[test]
    fn it_rejects_a_wrong_catalog() {
        let p = ColumnDefinition::decode(b"\x03abc\x00");

        assert!(p.is_err());
    }
}
