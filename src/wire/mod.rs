//! Dispatcher/executor wire protocol (§4.1).
//!
//! One task request occupies one fresh TCP connection, opened by the
//! dispatcher and closed after the result acknowledgement. The executor is
//! the server, the dispatcher is the client — control flow is strictly
//! request/reply.

mod dispatcher_link;
mod error;
mod executor_link;
pub mod header;

pub use dispatcher_link::DispatcherLink;
pub use error::WireError;
pub use executor_link::ExecutorLink;
pub use header::{RequestHeader, HEADER_LEN};

use std::time::Duration;

/// Socket timeout used for connect and for small, fixed-size sends/receives.
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(1);

/// How long the dispatcher waits for the accept/refuse byte.
pub const ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the executor waits for the dispatcher's size-ack or body-ack.
pub const WORKER_ACK_TIMEOUT: Duration = Duration::from_mins(1);

/// The dispatcher's body-read timeout scales with the result size: `5 +
/// ceil(size/100)` seconds (§4.1 step 7, §8 S5).
#[must_use]
pub const fn body_read_timeout(size: u64) -> Duration {
    Duration::from_secs(5 + size.div_ceil(100))
}
