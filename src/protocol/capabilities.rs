// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/group__group__cs__capabilities__flags.html
// https://mariadb.com/kb/en/connection/#capabilities
bitflags::bitflags! {
    pub(crate) struct Capabilities: u32 {
        /// Use the improved version of the Old Password Authentication.
        const LONG_PASSWORD = 1;

        /// Send found rows instead of affected rows.
        const FOUND_ROWS = 2;

        /// Get all column flags.
        const LONG_FLAG = 4;

        /// A database name can be specified in the handshake response.
        const CONNECT_WITH_DB = 8;

        /// Can use LOAD DATA LOCAL.
        const LOCAL_FILES = 0x80;

        /// Uses the 4.1 protocol.
        const PROTOCOL_41 = 0x200;

        /// Client knows about transactions.
        const TRANSACTIONS = 0x2000;

        /// New 4.1 authentication.
        const SECURE_CONNECTION = 0x8000;

        /// Can handle multiple result sets for COM_QUERY.
        const MULTI_RESULTS = 0x2_0000;

        /// Client supports plugin authentication.
        const PLUGIN_AUTH = 0x8_0000;

        /// Client sends connection attributes in the handshake response.
        const CONNECT_ATTRS = 0x10_0000;
    }
}
