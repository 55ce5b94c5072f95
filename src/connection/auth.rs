use rsa::pkcs8::DecodePublicKey;
use rsa::{PaddingScheme, PublicKey, RsaPublicKey};
use sha1::Sha1;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::MySqlConnection;
use crate::error::Result;
use crate::options::MySqlConnectOptions;
use crate::protocol::{xor_cycled, AuthPlugin, AuthSwitchRequest, Decode};

// https://dev.mysql.com/blog-archive/preparing-your-community-connector-for-mysql-8-part-2-sha256/
const AUTH_MORE_DATA: u8 = 0x01;
const REQUEST_PUBLIC_KEY: u8 = 0x02;
const FAST_AUTH_SUCCESS: u8 = 0x03;
const PERFORM_FULL_AUTH: u8 = 0x04;

impl<S> MySqlConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Drives the exchange after the handshake response until the server
    /// accepts (OK) or rejects (ERR) the session.
    pub(super) async fn handle_auth_result(
        &mut self,
        mut plugin: AuthPlugin,
        nonce: &[u8],
        options: &MySqlConnectOptions,
    ) -> Result<()> {
        let mut nonce = nonce.to_vec();

        loop {
            let payload = self.stream.recv().await?;

            match payload.first() {
                Some(&0x00) => {
                    self.stream.handle_ok(&payload)?;
                    return Ok(());
                }

                Some(&0xFF) => return Err(self.stream.handle_err(&payload)),

                // auth switch request: restart with the announced plugin
                Some(&0xFE) => {
                    let switch = match AuthSwitchRequest::decode(&payload) {
                        Ok(switch) => switch,
                        Err(err) => return Err(self.stream.poison(err)),
                    };

                    log::debug!("switching authentication to {}", switch.auth_plugin.as_str());

                    plugin = switch.auth_plugin;
                    nonce = switch.auth_plugin_data.into_vec();

                    let scrambled = plugin.scramble(&options.password, &nonce);
                    self.stream.send_bytes(&scrambled).await?;
                }

                Some(&AUTH_MORE_DATA) => match plugin {
                    AuthPlugin::CachingSha2Password => {
                        return self
                            .caching_sha2_continue(&payload[1..], &nonce, options)
                            .await;
                    }

                    AuthPlugin::MySqlNativePassword => {
                        return Err(self.stream.poison(err_protocol!(
                            "unexpected auth continuation for mysql_native_password"
                        )));
                    }
                },

                Some(id) => {
                    return Err(self
                        .stream
                        .poison(err_protocol!("malformed auth result 0x{:X}", id)));
                }

                None => {
                    return Err(self
                        .stream
                        .poison(err_protocol!("empty packet during authentication")));
                }
            }
        }
    }

    async fn caching_sha2_continue(
        &mut self,
        data: &[u8],
        nonce: &[u8],
        options: &MySqlConnectOptions,
    ) -> Result<()> {
        match data {
            [FAST_AUTH_SUCCESS] => {
                self.stream.recv_ok().await?;

                Ok(())
            }

            [PERFORM_FULL_AUTH] => {
                log::debug!("performing caching_sha2_password full authentication");

                let encrypted = match &options.server_public_key {
                    // a pinned key skips the key exchange
                    Some(pem) => match encrypt_password(pem, &options.password, nonce) {
                        Ok(encrypted) => encrypted,
                        Err(err) => return Err(self.stream.poison(err)),
                    },

                    None => {
                        self.stream.send_bytes(&[REQUEST_PUBLIC_KEY]).await?;

                        let reply = self.stream.recv().await?;
                        match reply.first() {
                            Some(&AUTH_MORE_DATA) => {
                                let result = std::str::from_utf8(&reply[1..])
                                    .map_err(|err| {
                                        err_protocol!("public key is not valid UTF-8: {}", err)
                                    })
                                    .and_then(|pem| {
                                        encrypt_password(pem, &options.password, nonce)
                                    });

                                match result {
                                    Ok(encrypted) => encrypted,
                                    Err(err) => return Err(self.stream.poison(err)),
                                }
                            }

                            Some(&0xFF) => return Err(self.stream.handle_err(&reply)),

                            _ => {
                                return Err(self.stream.poison(err_protocol!(
                                    "malformed reply to a public key request"
                                )));
                            }
                        }
                    }
                };

                self.stream.send_bytes(&encrypted).await?;
                self.stream.recv_ok().await?;

                Ok(())
            }

            _ => Err(self.stream.poison(err_protocol!(
                "malformed caching_sha2_password continuation: {:02X?}",
                data
            ))),
        }
    }
}

/// XORs the NUL-terminated password with the cycled nonce, then encrypts
/// it with the server's public key using OAEP with SHA-1 as the mask and
/// label hash.
fn encrypt_password(pem: &str, password: &str, nonce: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|err| err_protocol!("invalid RSA public key from server: {}", err))?;

    let obfuscated = xor_cycled(password, nonce);

    let mut rng = rand::thread_rng();
    key.encrypt(&mut rng, PaddingScheme::new_oaep::<Sha1>(), &obfuscated)
        .map_err(|err| err_protocol!("RSA password encryption failed: {}", err))
}
