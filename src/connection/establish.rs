use std::{env, process};

use byteorder::LittleEndian;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::{MySqlConnection, MySqlStream};
use crate::done::MySqlDone;
use crate::error::Result;
use crate::io::BufMutExt;
use crate::net::Socket;
use crate::options::{MySqlConnectOptions, DEFAULT_MAX_ALLOWED_PACKET};
use crate::protocol::{Capabilities, Decode, Handshake, HandshakeResponse};

impl MySqlConnection<Socket> {
    /// Opens a socket per the options and establishes a session over it.
    pub async fn connect(options: &MySqlConnectOptions) -> Result<Self> {
        let socket = Socket::connect(options).await?;

        Self::establish(socket, options).await
    }
}

impl<S> MySqlConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Establishes a session over an already-connected stream: greeting,
    /// authentication, then post-connect configuration.
    pub async fn establish(socket: S, options: &MySqlConnectOptions) -> Result<Self> {
        let mut stream = MySqlStream::new(socket);

        // https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase.html

        let payload = stream.recv().await?;

        // an overloaded server may greet us with ERR directly
        if payload.first() == Some(&0xFF) {
            return Err(stream.handle_err(&payload));
        }

        let handshake = match Handshake::decode(&payload) {
            Ok(handshake) => handshake,
            Err(err) => return Err(stream.poison(err)),
        };

        if handshake.protocol_version != 10 {
            return Err(stream.poison(err_protocol!(
                "unsupported protocol version {}",
                handshake.protocol_version
            )));
        }

        if !handshake
            .server_capabilities
            .contains(Capabilities::PROTOCOL_41)
        {
            return Err(stream.poison(err_protocol!("server does not speak the 4.1 protocol")));
        }

        log::debug!(
            "connected to {} (connection id {}, server collation {}); authenticating with {}",
            handshake.server_version,
            handshake.connection_id,
            handshake.server_default_collation,
            handshake.auth_plugin.as_str(),
        );

        stream.status = handshake.status;
        stream.capabilities = client_capabilities(options);

        let mut conn = Self {
            stream,
            max_allowed_packet: options.max_allowed_packet,
            result: MySqlDone::default(),
        };

        let plugin = handshake.auth_plugin;
        let nonce = handshake.auth_plugin_data;
        let scrambled = plugin.scramble(&options.password, &nonce);
        let connect_attrs = encode_connect_attrs(options);

        // the response continues the handshake's sequence; no reset
        conn.stream
            .send(HandshakeResponse {
                max_packet_size: 0,
                collation: options.collation,
                username: &options.username,
                database: options.database.as_deref(),
                auth_plugin: plugin,
                auth_response: &scrambled,
                connect_attrs: &connect_attrs,
            })
            .await?;

        conn.handle_auth_result(plugin, &nonce, options).await?;

        if conn.max_allowed_packet == 0 {
            conn.max_allowed_packet = conn.fetch_max_allowed_packet().await?;
        }

        if let Some(charset) = &options.charset {
            conn.execute(&format!("SET NAMES {}", charset)).await?;
        }

        Ok(conn)
    }

    async fn fetch_max_allowed_packet(&mut self) -> Result<usize> {
        let mut size = None;

        let mut rows = self.fetch("SELECT @@max_allowed_packet").await?;
        while let Some(row) = rows.next().await? {
            size = row
                .get(0)
                .and_then(|value| std::str::from_utf8(value).ok())
                .and_then(|value| value.parse().ok());
        }

        Ok(size.unwrap_or(DEFAULT_MAX_ALLOWED_PACKET))
    }
}

fn client_capabilities(options: &MySqlConnectOptions) -> Capabilities {
    let mut capabilities = Capabilities::LONG_PASSWORD
        | Capabilities::FOUND_ROWS
        | Capabilities::LONG_FLAG
        | Capabilities::LOCAL_FILES
        | Capabilities::PROTOCOL_41
        | Capabilities::TRANSACTIONS
        | Capabilities::SECURE_CONNECTION
        | Capabilities::MULTI_RESULTS
        | Capabilities::PLUGIN_AUTH
        | Capabilities::CONNECT_ATTRS;

    if options.database.is_some() {
        capabilities |= Capabilities::CONNECT_WITH_DB;
    }

    capabilities
}

// https://dev.mysql.com/doc/refman/8.0/en/performance-schema-connection-attribute-tables.html
fn encode_connect_attrs(options: &MySqlConnectOptions) -> Vec<u8> {
    let mut attrs = Vec::new();

    attrs.put_str_lenenc::<LittleEndian>("_client_name");
    attrs.put_str_lenenc::<LittleEndian>("mysql-core");
    attrs.put_str_lenenc::<LittleEndian>("_os");
    attrs.put_str_lenenc::<LittleEndian>(env::consts::OS);
    attrs.put_str_lenenc::<LittleEndian>("_platform");
    attrs.put_str_lenenc::<LittleEndian>(env::consts::ARCH);
    attrs.put_str_lenenc::<LittleEndian>("_pid");
    attrs.put_str_lenenc::<LittleEndian>(&process::id().to_string());

    let host = options.host();
    if !host.is_empty() {
        attrs.put_str_lenenc::<LittleEndian>("_server_host");
        attrs.put_str_lenenc::<LittleEndian>(host);
    }

    attrs
}
