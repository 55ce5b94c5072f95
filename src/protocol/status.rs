// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/mysql__com_8h.html#a1d854e841086925be1883e4d7b4e8cad
// https://mariadb.com/kb/en/ok_packet/#server-status-flag
bitflags::bitflags! {
    /// The server status bitfield sent in the trailing bytes of OK and EOF
    /// packets. The connection records the last value seen.
    pub struct Status: u16 {
        /// A transaction is currently active.
        const SERVER_STATUS_IN_TRANS = 1;

        /// Autocommit mode is set.
        const SERVER_STATUS_AUTOCOMMIT = 2;

        /// More results exist (more packets follow).
        const SERVER_MORE_RESULTS_EXISTS = 8;

        const SERVER_STATUS_NO_GOOD_INDEX_USED = 16;

        const SERVER_STATUS_NO_INDEX_USED = 32;

        /// When using COM_STMT_FETCH, indicates that the current cursor
        /// still has result sets to fetch.
        const SERVER_STATUS_CURSOR_EXISTS = 64;

        /// The last row of the current cursor has been sent.
        const SERVER_STATUS_LAST_ROW_SENT = 128;

        /// The database has been dropped.
        const SERVER_STATUS_DB_DROPPED = 256;

        /// Current escape mode is "no backslash escape".
        const SERVER_STATUS_NO_BACKSLASH_ESCAPES = 512;

        /// A DDL change happened while a prepared statement was open.
        const SERVER_STATUS_METADATA_CHANGED = 1024;

        const SERVER_QUERY_WAS_SLOW = 2048;

        /// This result set contains prepared-statement output parameters.
        const SERVER_PS_OUT_PARAMS = 4096;

        /// A read-only transaction is currently active.
        const SERVER_STATUS_IN_TRANS_READONLY = 8192;

        /// Session state has changed; the OK packet carries tracking data.
        const SERVER_SESSION_STATE_CHANGED = 16384;
    }
}
