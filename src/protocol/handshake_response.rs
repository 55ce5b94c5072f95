use byteorder::LittleEndian;

use crate::io::{BufMut, BufMutExt};
use crate::protocol::{AuthPlugin, Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_response.html
// https://mariadb.com/kb/en/connection/#handshake-response-packet
#[derive(Debug)]
pub(crate) struct HandshakeResponse<'a> {
    pub(crate) max_packet_size: u32,
    pub(crate) collation: u8,
    pub(crate) username: &'a str,
    pub(crate) database: Option<&'a str>,
    pub(crate) auth_plugin: AuthPlugin,
    pub(crate) auth_response: &'a [u8],

    /// Pre-encoded connection attributes blob (lenenc key/value pairs).
    pub(crate) connect_attrs: &'a [u8],
}

impl Encode for HandshakeResponse<'_> {
    fn size_hint(&self) -> usize {
        4 + 4
            + 1
            + 23
            + self.username.len()
            + 1
            + 9
            + self.auth_response.len()
            + self.database.map_or(0, |db| db.len() + 1)
            + self.auth_plugin.as_str().len()
            + 1
            + 9
            + self.connect_attrs.len()
    }

    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        // client capabilities : int<4>
        buf.put_u32::<LittleEndian>(capabilities.bits());

        // max packet size : int<4>
        buf.put_u32::<LittleEndian>(self.max_packet_size);

        // client character collation : int<1>
        buf.put_u8(self.collation);

        // reserved : string<23>
        buf.advance(23);

        // username : string<NUL>
        buf.put_str_nul(self.username);

        // auth response : string<lenenc>
        buf.put_bytes_lenenc::<LittleEndian>(self.auth_response);

        if capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            if let Some(database) = self.database {
                // database : string<NUL>
                buf.put_str_nul(database);
            }
        }

        // client_plugin_name : string<NUL>
        buf.put_str_nul(self.auth_plugin.as_str());

        if capabilities.contains(Capabilities::CONNECT_ATTRS) {
            // connection attributes : string<lenenc>
            buf.put_bytes_lenenc::<LittleEndian>(self.connect_attrs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthPlugin, Capabilities, Encode, HandshakeResponse};
    use byteorder::{ByteOrder, LittleEndian};

    #[test]
    fn it_encodes_the_fixed_header_and_tail() {
        let capabilities = Capabilities::PROTOCOL_41
            | Capabilities::PLUGIN_AUTH
            | Capabilities::CONNECT_WITH_DB
            | Capabilities::CONNECT_ATTRS;

        let attrs = b"\x0c_client_name\x04test";

        let mut buf = Vec::new();
        HandshakeResponse {
            max_packet_size: 0,
            collation: 45,
            username: "root",
            database: Some("mysql"),
            auth_plugin: AuthPlugin::MySqlNativePassword,
            auth_response: &[0xAA; 20],
            connect_attrs: attrs,
        }
        .encode(&mut buf, capabilities);

        assert_eq!(LittleEndian::read_u32(&buf[0..]), capabilities.bits());
        // max packet size is always written as zero
        assert_eq!(LittleEndian::read_u32(&buf[4..]), 0);
        assert_eq!(buf[8], 45);
        assert!(buf[9..32].iter().all(|b| *b == 0));

        assert_eq!(&buf[32..37], b"root\x00");
        assert_eq!(buf[37], 20);
        assert_eq!(&buf[38..58], &[0xAA; 20]);
        assert_eq!(&buf[58..64], b"mysql\x00");
        assert_eq!(&buf[64..86], b"mysql_native_password\x00");
        assert_eq!(buf[86] as usize, attrs.len());
        assert_eq!(&buf[87..], attrs);
    }
}
