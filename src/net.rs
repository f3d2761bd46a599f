//! The UDP transport.
//!
//! A [`Transport`] performs exactly one exchange: send one query datagram,
//! then wait for a datagram that decodes to a response with the matching
//! transaction id. Retrying is the caller's business, so the resolver
//! engine stays in control of how often a logical query goes out and what
//! gets logged in between.
//!
//! [`UdpTransport`] is the real implementation. It binds one unconnected
//! socket when the resolver starts and reuses it for every query for the
//! lifetime of the process. Datagrams that fail to decode or carry a
//! foreign id are ignored; they must not end the wait, since the matching
//! response may still arrive within the timeout.

use crate::base::Response;
use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::trace;

/// Size of the receive buffer.
///
/// Plain DNS over UDP without EDNS limits responses to 512 octets; some
/// servers send more anyway, so leave generous room. Anything longer is
/// truncated by the kernel and will fail to decode sensibly, which this
/// tool treats like any other undecodable datagram.
const RECV_SIZE: usize = 1024;

//------------ Transport -----------------------------------------------------

/// A single query/response exchange with a nameserver.
pub trait Transport {
    /// Sends `wire` to `server` and waits for a response with the given
    /// transaction id.
    ///
    /// Resolves to [`TransportError::Timeout`] when no matching response
    /// arrives in time. One call makes one attempt; callers retry.
    fn exchange<'a>(
        &'a mut self,
        wire: &'a [u8],
        id: u16,
        server: SocketAddr,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<Response, TransportError>>
                + Send
                + 'a,
        >,
    >;
}

//------------ UdpTransport --------------------------------------------------

/// The process-lifetime UDP socket.
#[derive(Debug)]
pub struct UdpTransport {
    sock: UdpSocket,
    read_timeout: Duration,
}

impl UdpTransport {
    /// Binds a fresh unconnected socket on an ephemeral port.
    ///
    /// The socket is bound for the address family of `server`, the
    /// starting nameserver the resolver was created with.
    pub async fn bind(
        server: SocketAddr,
        read_timeout: Duration,
    ) -> io::Result<Self> {
        let local = if server.is_ipv4() {
            SocketAddr::from(([0u8; 4], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let sock = UdpSocket::bind(local).await?;
        Ok(UdpTransport { sock, read_timeout })
    }
}

impl Transport for UdpTransport {
    fn exchange<'a>(
        &'a mut self,
        wire: &'a [u8],
        id: u16,
        server: SocketAddr,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<Response, TransportError>>
                + Send
                + 'a,
        >,
    > {
        Box::pin(async move {
            let sent = self
                .sock
                .send_to(wire, server)
                .await
                .map_err(TransportError::Send)?;
            if sent != wire.len() {
                return Err(TransportError::Send(
                    io::ErrorKind::WriteZero.into(),
                ));
            }

            let mut buffer = [0u8; RECV_SIZE];
            tokio::time::timeout(self.read_timeout, async {
                loop {
                    let (len, from) = self
                        .sock
                        .recv_from(&mut buffer)
                        .await
                        .map_err(TransportError::Receive)?;
                    trace!("received {len} octets from {from}");
                    match Response::from_wire(&buffer[..len]) {
                        Ok(response) if response.id() == id => {
                            return Ok(response)
                        }
                        Ok(response) => {
                            trace!(
                                "ignoring response with foreign id {}",
                                response.id()
                            );
                        }
                        Err(err) => {
                            trace!("ignoring undecodable datagram: {err}");
                        }
                    }
                }
            })
            .await
            .unwrap_or(Err(TransportError::Timeout))
        })
    }
}

//------------ TransportError ------------------------------------------------

/// An exchange with a nameserver failed.
#[derive(Debug)]
pub enum TransportError {
    /// Sending the query datagram failed.
    Send(io::Error),

    /// Receiving a response datagram failed.
    Receive(io::Error),

    /// No matching response arrived within the read timeout.
    Timeout,
}

//--- Display and Error

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TransportError::Send(ref err) => {
                write!(f, "sending query: {}", err)
            }
            TransportError::Receive(ref err) => {
                write!(f, "receiving response: {}", err)
            }
            TransportError::Timeout => f.write_str("request timed out"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            TransportError::Send(ref err)
            | TransportError::Receive(ref err) => Some(err),
            TransportError::Timeout => None,
        }
    }
}
