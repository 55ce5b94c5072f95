use crate::protocol::{ColumnDefinition, FieldFlags, TypeId};

/// Metadata for one column of a result set, read from the
/// column-definition packets between the result-set header and the first
/// row.
#[derive(Debug, Clone)]
pub struct MySqlColumn {
    pub(crate) name: Box<str>,
    pub(crate) org_name: Box<str>,
    pub(crate) length: u32,
    pub(crate) flags: FieldFlags,
    pub(crate) type_id: TypeId,
    pub(crate) decimals: u8,
    pub(crate) char_set: u16,
}

impl MySqlColumn {
    /// The column alias, falling back to the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column name before aliasing.
    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn char_set(&self) -> u16 {
        self.char_set
    }

    /// Whether a fixed-width numeric value in this column decodes as
    /// unsigned.
    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(FieldFlags::UNSIGNED)
    }
}

impl From<ColumnDefinition> for MySqlColumn {
    fn from(def: ColumnDefinition) -> Self {
        Self {
            name: def.name().unwrap_or("").into(),
            org_name: def.column.as_deref().unwrap_or("").into(),
            length: def.max_size,
            flags: def.flags,
            type_id: def.type_id,
            decimals: def.decimals,
            char_set: def.char_set,
        }
    }
}
