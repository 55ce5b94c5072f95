use digest::OutputSizeUser;
use generic_array::GenericArray;
use memchr::memchr;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AuthPlugin {
    MySqlNativePassword,
    CachingSha2Password,
}

impl AuthPlugin {
    /// Resolves a plugin by the name the server announced. A missing or
    /// empty name falls back to `mysql_native_password`.
    pub(crate) fn from_opt_str(s: Option<&str>) -> Result<AuthPlugin> {
        match s {
            Some("mysql_native_password") | Some("") | None => {
                Ok(AuthPlugin::MySqlNativePassword)
            }
            Some("caching_sha2_password") => Ok(AuthPlugin::CachingSha2Password),

            Some(s) => Err(Error::UnsupportedAuthPlugin(s.into())),
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            AuthPlugin::MySqlNativePassword => "mysql_native_password",
            AuthPlugin::CachingSha2Password => "caching_sha2_password",
        }
    }

    /// Hashes the password with the server's nonce. Empty passwords always
    /// scramble to empty bytes.
    pub(crate) fn scramble(&self, password: &str, nonce: &[u8]) -> Vec<u8> {
        if password.is_empty() {
            return Vec::new();
        }

        match self {
            AuthPlugin::MySqlNativePassword => {
                // the nonce for mysql_native_password is (optionally) NUL
                // terminated and only its first 20 bytes participate
                let end = memchr(b'\0', nonce).unwrap_or(nonce.len()).min(20);

                scramble_sha1(password, &nonce[..end]).to_vec()
            }

            AuthPlugin::CachingSha2Password => scramble_sha256(password, nonce).to_vec(),
        }
    }
}

fn scramble_sha1(
    password: &str,
    seed: &[u8],
) -> GenericArray<u8, <Sha1 as OutputSizeUser>::OutputSize> {
    // SHA1( password ) ^ SHA1( seed + SHA1( SHA1( password ) ) )
    // https://mariadb.com/kb/en/connection/#mysql_native_password-plugin

    let mut ctx = Sha1::new();

    ctx.update(password);

    let mut pw_hash = ctx.finalize_reset();

    ctx.update(&pw_hash);

    let pw_hash_hash = ctx.finalize_reset();

    ctx.update(seed);
    ctx.update(pw_hash_hash);

    let pw_seed_hash_hash = ctx.finalize();

    xor_eq(&mut pw_hash, &pw_seed_hash_hash);

    pw_hash
}

fn scramble_sha256(
    password: &str,
    seed: &[u8],
) -> GenericArray<u8, <Sha256 as OutputSizeUser>::OutputSize> {
    // SHA256( password ) ^ SHA256( SHA256( SHA256( password ) ) + seed )
    // https://mariadb.com/kb/en/caching_sha2_password-authentication-plugin/

    let mut ctx = Sha256::new();

    ctx.update(password);

    let mut pw_hash = ctx.finalize_reset();

    ctx.update(&pw_hash);

    let pw_hash_hash = ctx.finalize_reset();

    ctx.update(pw_hash_hash);
    ctx.update(seed);

    let pw_seed_hash_hash = ctx.finalize();

    xor_eq(&mut pw_hash, &pw_seed_hash_hash);

    pw_hash
}

fn xor_eq(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());

    for (dst, src) in dst.iter_mut().zip(src) {
        *dst ^= src;
    }
}

/// Obfuscates the NUL-terminated password with the handshake nonce, cycling
/// the nonce, before RSA encryption in the full-authentication path.
pub(crate) fn xor_cycled(password: &str, nonce: &[u8]) -> Vec<u8> {
    let mut out = password.as_bytes().to_vec();
    out.push(0);

    for (i, byte) in out.iter_mut().enumerate() {
        *byte ^= nonce[i % nonce.len()];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{xor_cycled, AuthPlugin};
    use crate::error::Error;
    use matches::assert_matches;
    use sha1::Digest;
    use sha2::Sha256;

    const NONCE: &[u8] = &[
        17, 52, 97, 66, 48, 99, 6, 103, 116, 76, 3, 115, 15, 91, 52, 13, 108, 52, 46, 32,
    ];

    #[test]
    fn it_resolves_plugin_names() {
        assert_matches!(
            AuthPlugin::from_opt_str(Some("caching_sha2_password")),
            Ok(AuthPlugin::CachingSha2Password)
        );

        // an absent or empty name defaults to mysql_native_password
        assert_matches!(
            AuthPlugin::from_opt_str(None),
            Ok(AuthPlugin::MySqlNativePassword)
        );
        assert_matches!(
            AuthPlugin::from_opt_str(Some("")),
            Ok(AuthPlugin::MySqlNativePassword)
        );

        assert_matches!(
            AuthPlugin::from_opt_str(Some("sha256_password")),
            Err(Error::UnsupportedAuthPlugin(_))
        );
    }

    #[test]
    fn it_scrambles_an_empty_password_to_empty_bytes() {
        assert!(AuthPlugin::MySqlNativePassword.scramble("", NONCE).is_empty());
        assert!(AuthPlugin::CachingSha2Password.scramble("", NONCE).is_empty());
    }

    #[test]
    fn sha256_scramble_satisfies_its_definition() {
        let scrambled = AuthPlugin::CachingSha2Password.scramble("secret", NONCE);

        // scramble ^ SHA256(password) == SHA256( SHA256(SHA256(password)) + nonce )
        let pw_hash = Sha256::digest("secret");
        let pw_hash_hash = Sha256::digest(Sha256::digest(pw_hash));

        let mut rhs = Sha256::new();
        rhs.update(pw_hash_hash);
        rhs.update(NONCE);
        let rhs = rhs.finalize();

        let lhs: Vec<u8> = scrambled
            .iter()
            .zip(pw_hash.iter())
            .map(|(a, b)| a ^ b)
            .collect();

        assert_eq!(&lhs[..], &rhs[..]);
    }

    #[test]
    fn native_scramble_uses_at_most_twenty_nonce_bytes() {
        let mut long_nonce = NONCE.to_vec();
        long_nonce.push(0x7F);

        assert_eq!(
            AuthPlugin::MySqlNativePassword.scramble("secret", NONCE),
            AuthPlugin::MySqlNativePassword.scramble("secret", &long_nonce)
        );
    }

    #[test]
    fn it_cycles_the_nonce_over_the_password() {
        let out = xor_cycled("aa", &[0x01]);

        // trailing NUL is obfuscated too
        assert_eq!(out, vec![b'a' ^ 1, b'a' ^ 1, 1]);
    }
}
