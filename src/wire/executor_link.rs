//! Executor-side (server) half of the wire protocol.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use tracing::warn;

use super::header::{RequestHeader, HEADER_LEN};
use super::{WireError, ACCEPT_TIMEOUT, SOCKET_TIMEOUT, WORKER_ACK_TIMEOUT};

/// One connection accepted from the dispatcher, used for exactly one task.
pub struct ExecutorLink {
    stream: TcpStream,
}

impl ExecutorLink {
    /// Block on `listener.accept()` for the next incoming request.
    pub fn accept_one(listener: &TcpListener) -> Result<Self, WireError> {
        let (stream, _peer) = listener.accept().map_err(|source| WireError::Io {
            stage: "accept",
            source,
        })?;
        Self::from_stream(stream)
    }

    /// Wrap an already-accepted stream (e.g. one accepted by the caller off
    /// a non-blocking listener so it can poll a shutdown flag between
    /// connections) and apply the per-request read/write timeouts.
    ///
    /// # Errors
    /// Returns an error if the socket timeouts cannot be set.
    pub fn from_stream(stream: TcpStream) -> Result<Self, WireError> {
        stream
            .set_read_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "accept",
                source,
            })?;
        stream
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "accept",
                source,
            })?;
        Ok(Self { stream })
    }

    /// Read the fixed-size request header (§4.1 step 2).
    ///
    /// # Errors
    /// Returns an error if the header cannot be read within the socket timeout.
    pub fn read_header(&mut self) -> Result<RequestHeader, WireError> {
        let mut buf = [0u8; HEADER_LEN];
        self.stream
            .read_exact(&mut buf)
            .map_err(|source| WireError::Io {
                stage: "header read",
                source,
            })?;
        Ok(RequestHeader::from_bytes(&buf))
    }

    /// Send the accept (`true`) or refuse (`false`) byte (§4.1 step 3).
    ///
    /// # Errors
    /// Returns an error if the byte cannot be written within the accept timeout.
    pub fn send_accept(&mut self, accept: bool) -> Result<(), WireError> {
        self.stream
            .set_write_timeout(Some(ACCEPT_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "accept byte",
                source,
            })?;
        self.stream
            .write_all(&[u8::from(accept)])
            .map_err(|source| WireError::Io {
                stage: "accept byte",
                source,
            })
    }

    /// Read the length-prefixed payload (§4.1 step 4).
    ///
    /// # Errors
    /// Returns an error if the size prefix or body cannot be read.
    pub fn read_payload(&mut self) -> Result<Vec<u8>, WireError> {
        let mut len_buf = [0u8; 8];
        self.stream
            .read_exact(&mut len_buf)
            .map_err(|source| WireError::Io {
                stage: "payload size",
                source,
            })?;
        // Payloads are never expected to exceed usize::MAX bytes; this
        // protocol has no framing for anything that large anyway.
        #[allow(clippy::cast_possible_truncation)]
        let len = u64::from_le_bytes(len_buf) as usize;
        let mut buf = vec![0u8; len];
        self.stream
            .read_exact(&mut buf)
            .map_err(|source| WireError::Io {
                stage: "payload body",
                source,
            })?;
        Ok(buf)
    }

    /// Send the result: size, then wait for the size-ack, then the body,
    /// then wait for the body-ack (§4.1 steps 6-7).
    ///
    /// A missing ack is logged and otherwise ignored — per §4.1 the worker
    /// tears the connection down and returns to `accept` either way, since
    /// the dispatcher will simply re-issue the task if the result was lost.
    /// # Errors
    /// Returns an error if the result size or body cannot be written.
    pub fn send_result(&mut self, body: &[u8]) -> Result<(), WireError> {
        self.stream
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|source| WireError::Io {
                stage: "result size",
                source,
            })?;
        self.stream
            .write_all(&(body.len() as u64).to_le_bytes())
            .map_err(|source| WireError::Io {
                stage: "result size",
                source,
            })?;

        if !self.wait_ack("size-ack") {
            warn!("dispatcher did not ack result size within timeout");
        }

        self.stream
            .write_all(body)
            .map_err(|source| WireError::Io {
                stage: "result body",
                source,
            })?;

        if !self.wait_ack("body-ack") {
            warn!("dispatcher did not ack result body within timeout");
        }

        Ok(())
    }

    /// Wait up to [`WORKER_ACK_TIMEOUT`] for a single ack byte. Returns
    /// `false` (rather than erroring) on timeout or a short read, since a
    /// missing ack must not abort the worker's loop (§4.1 step 7).
    fn wait_ack(&mut self, stage: &'static str) -> bool {
        if self
            .stream
            .set_read_timeout(Some(WORKER_ACK_TIMEOUT))
            .is_err()
        {
            return false;
        }
        let mut byte = [0u8; 1];
        match self.stream.read_exact(&mut byte) {
            Ok(()) => byte[0] == 1,
            Err(e) => {
                warn!(stage, error = %e, "ack wait failed");
                false
            }
        }
    }
}
