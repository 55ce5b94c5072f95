use byteorder::LittleEndian;

use crate::error::Result;
use crate::io::Buf;
use crate::protocol::{AuthPlugin, Capabilities, Decode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_v10.html
// https://mariadb.com/kb/en/connection/#initial-handshake-packet
#[derive(Debug)]
pub(crate) struct Handshake {
    pub(crate) protocol_version: u8,
    pub(crate) server_version: Box<str>,
    pub(crate) connection_id: u32,
    pub(crate) server_capabilities: Capabilities,
    pub(crate) server_default_collation: u8,
    pub(crate) status: Status,
    pub(crate) auth_plugin: AuthPlugin,
    pub(crate) auth_plugin_data: Box<[u8]>,
}

impl Decode for Handshake {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let protocol_version = buf.get_u8()?;
        let server_version = buf.get_str_nul()?.into();
        let connection_id = buf.get_u32::<LittleEndian>()?;

        // scramble first part : string<8>
        let mut scramble = Vec::with_capacity(20);
        scramble.extend_from_slice(buf.get_bytes(8)?);

        // filler : string<1>
        buf.get_bytes(1)?;

        // capability_flags_1 : int<2>
        let capabilities_1 = buf.get_u16::<LittleEndian>()?;
        let mut capabilities = Capabilities::from_bits_truncate(capabilities_1.into());

        // everything after this point was added in protocol 4.1 and is
        // absent from the shortest legal greeting
        if buf.is_empty() {
            return Ok(Self {
                protocol_version,
                server_version,
                connection_id,
                server_capabilities: capabilities,
                server_default_collation: 0,
                status: Status::empty(),
                auth_plugin: AuthPlugin::from_opt_str(None)?,
                auth_plugin_data: scramble.into_boxed_slice(),
            });
        }

        // character_set : int<1>
        let collation = buf.get_u8()?;

        // status_flags : int<2>
        let status = Status::from_bits_truncate(buf.get_u16::<LittleEndian>()?);

        // capability_flags_2 : int<2>
        let capabilities_2 = buf.get_u16::<LittleEndian>()?;
        capabilities |= Capabilities::from_bits_truncate(u32::from(capabilities_2) << 16);

        // auth_plugin_data_len : int<1>
        let _auth_plugin_data_len = buf.get_u8()?;

        // reserved : string<10>
        buf.get_bytes(10)?;

        // scramble 2nd part : string<12>, then its NUL terminator
        scramble.extend_from_slice(buf.get_bytes(12)?);
        buf.get_bytes(1)?;

        // auth plugin name : string<NUL> or string<EOF>
        let auth_plugin = AuthPlugin::from_opt_str(Some(buf.get_str_nul_or_eof()?))?;

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            server_capabilities: capabilities,
            server_default_collation: collation,
            status,
            auth_plugin,
            auth_plugin_data: scramble.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthPlugin, Capabilities, Decode, Handshake, Status};
    use matches::assert_matches;

    const HANDSHAKE_MARIA_DB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";
    const HANDSHAKE_MYSQL_8_0_18: &[u8] = b"\n8.0.18\x00\x19\x00\x00\x00\x114aB0c\x06g\x00\xff\xff\xff\x02\x00\xff\xc7\x15\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00tL\x03s\x0f[4\rl4. \x00caching_sha2_password\x00";

    #[test]
    fn it_decodes_handshake_mysql_8_0_18() {
        let p = Handshake::decode(HANDSHAKE_MYSQL_8_0_18).unwrap();

        assert_eq!(p.protocol_version, 10);
        assert_eq!(&*p.server_version, "8.0.18");
        assert_eq!(p.connection_id, 25);
        assert_eq!(p.server_default_collation, 255);

        assert!(p.server_capabilities.contains(
            Capabilities::PROTOCOL_41
                | Capabilities::SECURE_CONNECTION
                | Capabilities::PLUGIN_AUTH
                | Capabilities::CONNECT_ATTRS
                | Capabilities::MULTI_RESULTS
        ));
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_matches!(p.auth_plugin, AuthPlugin::CachingSha2Password);

        assert_eq!(
            &*p.auth_plugin_data,
            &[
                17, 52, 97, 66, 48, 99, 6, 103, 116, 76, 3, 115, 15, 91, 52, 13, 108, 52, 46, 32,
            ]
        );
    }

    #[test]
    fn it_decodes_handshake_mariadb_10_4_7() {
        let p = Handshake::decode(HANDSHAKE_MARIA_DB_10_4_7).unwrap();

        assert_eq!(p.protocol_version, 10);
        assert_eq!(
            &*p.server_version,
            "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic"
        );

        assert_eq!(p.server_default_collation, 8);
        assert!(p.server_capabilities.contains(Capabilities::PROTOCOL_41));
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_matches!(p.auth_plugin, AuthPlugin::MySqlNativePassword);

        assert_eq!(
            &*p.auth_plugin_data,
            &[
                116, 54, 76, 92, 106, 34, 100, 83, 85, 49, 52, 79, 112, 104, 57, 34, 60, 72, 53,
                110,
            ]
        );
    }
}
