//! Connection configuration.
//!
//! Connection-string parsing lives above this crate; the core only consumes
//! this record.

/// 64 MiB, the server's modern default.
pub(crate) const DEFAULT_MAX_ALLOWED_PACKET: usize = 64 << 20;

/// `utf8mb4_general_ci`
const DEFAULT_COLLATION_ID: u8 = 45;

/// The address family used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Tcp,
    Tcp6,
    Unix,
}

/// Options for connecting to a MySQL server, consumed by
/// [`MySqlConnection::connect`][crate::MySqlConnection::connect].
#[derive(Debug, Clone)]
pub struct MySqlConnectOptions {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) database: Option<String>,
    pub(crate) network: NetworkKind,
    pub(crate) address: String,
    pub(crate) max_allowed_packet: usize,
    pub(crate) server_public_key: Option<String>,
    pub(crate) parse_time: bool,
    pub(crate) timezone: String,
    pub(crate) charset: Option<String>,
    pub(crate) collation: u8,
}

impl Default for MySqlConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlConnectOptions {
    pub fn new() -> Self {
        Self {
            username: "root".to_owned(),
            password: String::new(),
            database: None,
            network: NetworkKind::Tcp,
            address: "127.0.0.1:3306".to_owned(),
            max_allowed_packet: DEFAULT_MAX_ALLOWED_PACKET,
            server_public_key: None,
            parse_time: false,
            timezone: "UTC".to_owned(),
            charset: None,
            collation: DEFAULT_COLLATION_ID,
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn network(mut self, network: NetworkKind) -> Self {
        self.network = network;
        self
    }

    /// `host:port` for TCP, the socket path for Unix domain sockets.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// The largest payload we will send in one command. `0` asks the server
    /// for its `@@max_allowed_packet` right after authentication.
    pub fn max_allowed_packet(mut self, size: usize) -> Self {
        self.max_allowed_packet = size;
        self
    }

    /// Pins the RSA public key used by `caching_sha2_password` full
    /// authentication, skipping the key exchange.
    pub fn server_public_key(mut self, pem: impl Into<String>) -> Self {
        self.server_public_key = Some(pem.into());
        self
    }

    pub fn parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// When set, `SET NAMES <charset>` is issued once the session is
    /// authenticated.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// The collation id sent in the handshake response.
    pub fn collation(mut self, collation: u8) -> Self {
        self.collation = collation;
        self
    }

    pub fn get_parse_time(&self) -> bool {
        self.parse_time
    }

    pub fn get_timezone(&self) -> &str {
        &self.timezone
    }

    /// The host portion of the address; empty for Unix domain sockets.
    pub(crate) fn host(&self) -> &str {
        if self.network == NetworkKind::Unix {
            return "";
        }

        match self.address.rfind(':') {
            Some(idx) => &self.address[..idx],
            None => &self.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MySqlConnectOptions, NetworkKind};

    #[test]
    fn it_splits_the_host_from_the_address() {
        let options = MySqlConnectOptions::new().address("db.internal:3307");
        assert_eq!(options.host(), "db.internal");

        let options = MySqlConnectOptions::new()
            .network(NetworkKind::Unix)
            .address("/tmp/mysql.sock");
        assert_eq!(options.host(), "");
    }
}
