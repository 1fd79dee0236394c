//! Errors for the dispatcher/executor wire protocol.

use thiserror::Error;

/// Failure reading/writing the wire protocol (§4.1).
///
/// Every variant here is, on the dispatcher side, a *transient* failure per
/// §7's taxonomy: the caller aborts this one dispatch attempt and the task
/// goes back on the pending queue. None of these should ever corrupt
/// dispatcher state.
#[derive(Debug, Error)]
pub enum WireError {
    /// Could not open the TCP connection within the connect timeout.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        /// The worker address that refused/timed out.
        addr: std::net::SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A read or write on an established connection failed or timed out.
    #[error("io error during {stage}: {source}")]
    Io {
        /// Which protocol stage failed, for logging.
        stage: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The peer closed the connection before the expected bytes arrived.
    #[error("connection closed during {0}")]
    Closed(&'static str),
    /// The worker replied with the refuse byte (`0`) instead of accept (`1`).
    #[error("worker refused the task")]
    Refused,
}
