use crate::error::Result;
use crate::io::Buf;
use crate::protocol::{AuthPlugin, Decode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_auth_switch_request.html
#[derive(Debug)]
pub(crate) struct AuthSwitchRequest {
    pub(crate) auth_plugin: AuthPlugin,
    pub(crate) auth_plugin_data: Box<[u8]>,
}

impl Decode for AuthSwitchRequest {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(err_protocol!(
                "expected AUTH SWITCH (0xFE); received 0x{:X}",
                header
            ));
        }

        let auth_plugin = AuthPlugin::from_opt_str(Some(buf.get_str_nul()?))?;

        // plugin data, sans its trailing NUL when present
        let mut data = buf;
        if let [head @ .., 0] = data {
            data = head;
        }

        Ok(Self {
            auth_plugin,
            auth_plugin_data: data.to_vec().into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthPlugin, AuthSwitchRequest, Decode};
    use matches::assert_matches;

    const AUTH_SWITCH: &[u8] = b"\xfemysql_native_password\x00abcdefghijklmnopqrst\x00";

    #[test]
    fn it_decodes_an_auth_switch_request() {
        let p = AuthSwitchRequest::decode(AUTH_SWITCH).unwrap();

        assert_matches!(p.auth_plugin, AuthPlugin::MySqlNativePassword);
        assert_eq!(&*p.auth_plugin_data, b"abcdefghijklmnopqrst");
    }
}
