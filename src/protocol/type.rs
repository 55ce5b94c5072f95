// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/binary__log__types_8h.html
// https://mariadb.com/kb/en/library/resultset/#field-types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeId(pub u8);

impl TypeId {
    pub const DECIMAL: TypeId = TypeId(0);

    // Numeric: TINYINT, SMALLINT, MEDIUMINT, INT, BIGINT
    pub const TINY_INT: TypeId = TypeId(1);
    pub const SMALL_INT: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const MEDIUM_INT: TypeId = TypeId(9);
    pub const BIG_INT: TypeId = TypeId(8);

    // Numeric: FLOAT, DOUBLE
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    pub const NEW_DECIMAL: TypeId = TypeId(246);

    pub const NULL: TypeId = TypeId(6);

    // Date/Time: DATE, TIME, DATETIME, TIMESTAMP, YEAR
    pub const TIMESTAMP: TypeId = TypeId(7);
    pub const DATE: TypeId = TypeId(10);
    pub const TIME: TypeId = TypeId(11);
    pub const DATETIME: TypeId = TypeId(12);
    pub const YEAR: TypeId = TypeId(13);

    pub const BIT: TypeId = TypeId(16);

    pub const VECTOR: TypeId = TypeId(242);
    pub const JSON: TypeId = TypeId(245);

    pub const ENUM: TypeId = TypeId(247);
    pub const SET: TypeId = TypeId(248);

    // Bytes: TINYBLOB, MEDIUMBLOB, LONGBLOB, BLOB
    pub const TINY_BLOB: TypeId = TypeId(249);
    pub const MEDIUM_BLOB: TypeId = TypeId(250);
    pub const LONG_BLOB: TypeId = TypeId(251);
    pub const BLOB: TypeId = TypeId(252);

    // String: VARCHAR, CHAR, TEXT
    pub const VAR_CHAR: TypeId = TypeId(15);
    pub const VAR_STRING: TypeId = TypeId(253);
    pub const STRING: TypeId = TypeId(254);

    pub const GEOMETRY: TypeId = TypeId(255);
}

impl Default for TypeId {
    fn default() -> TypeId {
        TypeId::NULL
    }
}
