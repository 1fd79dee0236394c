//! Dispatcher-side (client) half of the wire protocol.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};

use socket2::{Domain, Protocol, Socket, Type};

use super::header::RequestHeader;
use super::{body_read_timeout, WireError, ACCEPT_TIMEOUT, SOCKET_TIMEOUT};
use crate::core::WorkerInfo;

/// One dispatcher-to-worker connection, used for exactly one task request.
#[derive(Debug)]
pub struct DispatcherLink {
    stream: TcpStream,
}

impl DispatcherLink {
    /// Open a fresh connection to `worker` with a 1-second connect timeout,
    /// `SO_REUSEADDR`, and 1-second send/receive timeouts (§4.1 step 1).
    pub fn connect(worker: &WorkerInfo) -> Result<Self, WireError> {
        let addr = SocketAddr::V4(worker.addr());
        let mk_err = |source: std::io::Error| WireError::Connect { addr, source };

        let socket =
            Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(mk_err)?;
        socket.set_reuse_address(true).map_err(mk_err)?;
        socket
            .connect_timeout(&addr.into(), SOCKET_TIMEOUT)
            .map_err(mk_err)?;
        socket
            .set_read_timeout(Some(SOCKET_TIMEOUT))
            .map_err(mk_err)?;
        socket
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .map_err(mk_err)?;

        Ok(Self {
            stream: socket.into(),
        })
    }

    /// Send the fixed-size request header (§4.1 step 2).
    pub fn send_header(&mut self, header: RequestHeader) -> Result<(), WireError> {
        self.io("header send", |s| s.write_all(&header.to_bytes()))
    }

    /// Wait up to [`ACCEPT_TIMEOUT`] for the worker's accept/refuse byte
    /// (§4.1 step 3). `Ok(())` means accepted; a refuse byte or a timeout
    /// both surface as an error so the caller always re-queues.
    pub fn wait_accept(&mut self) -> Result<(), WireError> {
        self.stream
            .set_read_timeout(Some(ACCEPT_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "accept byte",
                source,
            })?;
        let mut byte = [0u8; 1];
        self.stream
            .read_exact(&mut byte)
            .map_err(|source| WireError::Io {
                stage: "accept byte",
                source,
            })?;
        if byte[0] == 1 {
            Ok(())
        } else {
            Err(WireError::Refused)
        }
    }

    /// Send the payload length (64-bit LE) followed by the payload bytes
    /// (§4.1 step 4).
    pub fn send_payload(&mut self, payload: &[u8]) -> Result<(), WireError> {
        self.io("payload send", |s| {
            s.write_all(&(payload.len() as u64).to_le_bytes())?;
            s.write_all(payload)
        })
    }

    /// Non-blocking check for a result size (§4.1 step 6, §5 "size-probe").
    ///
    /// Returns `Ok(None)` if fewer than 8 bytes are currently buffered —
    /// this is the single place in the protocol allowed to not block.
    /// Returns `Ok(Some(size))` and consumes exactly those 8 bytes once the
    /// full field has arrived.
    pub fn poll_result_size(&mut self) -> Result<Option<u64>, WireError> {
        self.stream
            .set_nonblocking(true)
            .map_err(|source| WireError::Io {
                stage: "size probe",
                source,
            })?;
        let mut buf = [0u8; 8];
        let peeked = self.stream.peek(&mut buf);
        let set_blocking = self.stream.set_nonblocking(false);

        let n = match peeked {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                set_blocking.map_err(|source| WireError::Io {
                    stage: "size probe",
                    source,
                })?;
                return Ok(None);
            }
            Err(source) => {
                return Err(WireError::Io {
                    stage: "size probe",
                    source,
                })
            }
        };
        set_blocking.map_err(|source| WireError::Io {
            stage: "size probe",
            source,
        })?;

        if n == 0 {
            return Err(WireError::Closed("size probe"));
        }
        if n < 8 {
            return Ok(None);
        }

        self.stream
            .set_read_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "size read",
                source,
            })?;
        self.stream
            .read_exact(&mut buf)
            .map_err(|source| WireError::Io {
                stage: "size read",
                source,
            })?;
        Ok(Some(u64::from_le_bytes(buf)))
    }

    /// Ack the size, read the result body with a timeout proportional to its
    /// size, then send the final ack (§4.1 step 7).
    pub fn read_result_body(&mut self, size: u64) -> Result<Vec<u8>, WireError> {
        self.io("size ack", |s| s.write_all(&[1u8]))?;

        self.stream
            .set_read_timeout(Some(body_read_timeout(size)))
            .map_err(|source| WireError::Io {
                stage: "result body",
                source,
            })?;
        let mut buf = vec![0u8; size as usize];
        self.stream
            .read_exact(&mut buf)
            .map_err(|source| WireError::Io {
                stage: "result body",
                source,
            })?;

        self.io("body ack", |s| s.write_all(&[1u8]))?;
        Ok(buf)
    }

    fn io(
        &mut self,
        stage: &'static str,
        f: impl FnOnce(&mut TcpStream) -> std::io::Result<()>,
    ) -> Result<(), WireError> {
        self.stream
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|source| WireError::Io { stage, source })?;
        f(&mut self.stream).map_err(|source| WireError::Io { stage, source })
    }
}
