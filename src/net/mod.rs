use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::Result;
use crate::options::{MySqlConnectOptions, NetworkKind};

/// A connected stream to the server, over TCP or a Unix domain socket.
///
/// The protocol layers are generic over `AsyncRead + AsyncWrite`; this enum
/// is only the default transport behind
/// [`MySqlConnection::connect`][crate::MySqlConnection::connect].
pub enum Socket {
    Tcp(TcpStream),

    #[cfg(unix)]
    Unix(UnixStream),
}

impl Socket {
    pub(crate) async fn connect(options: &MySqlConnectOptions) -> Result<Self> {
        match options.network {
            NetworkKind::Tcp => Ok(Socket::Tcp(TcpStream::connect(&options.address).await?)),

            NetworkKind::Tcp6 => {
                let addr = tokio::net::lookup_host(&options.address)
                    .await?
                    .find(|addr| addr.is_ipv6())
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::AddrNotAvailable,
                            "address did not resolve to an IPv6 endpoint",
                        )
                    })?;

                Ok(Socket::Tcp(TcpStream::connect(addr).await?))
            }

            #[cfg(unix)]
            NetworkKind::Unix => Ok(Socket::Unix(UnixStream::connect(&options.address).await?)),

            #[cfg(not(unix))]
            NetworkKind::Unix => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Unix domain sockets are not available on this platform",
            )
            .into()),
        }
    }
}

impl AsyncRead for Socket {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),

            #[cfg(unix)]
            Socket::Unix(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Socket {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Socket::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),

            #[cfg(unix)]
            Socket::Unix(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(stream) => Pin::new(stream).poll_flush(cx),

            #[cfg(unix)]
            Socket::Unix(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Socket::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),

            #[cfg(unix)]
            Socket::Unix(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
