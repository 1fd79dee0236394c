//! Binds the dispatcher's legacy, never-accepted listening socket (§3, §9
//! open question (a)), probing the same 9000..9999 range the executor
//! probes when no port is configured (§6 "Ports").

use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

const PORT_RANGE: std::ops::RangeInclusive<u16> = 9000..=9999;

/// Bind the first free port in `9000..=9999` on `127.0.0.1`. Returns the
/// last bind error encountered if every port in the range is taken.
pub fn bind_legacy_listener() -> std::io::Result<TcpListener> {
    let mut last_err = None;
    for port in PORT_RANGE {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
        match TcpListener::bind(addr) {
            Ok(listener) => return Ok(listener),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "no free port in 9000..=9999")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_a_port_in_range() {
        let listener = bind_legacy_listener().unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(PORT_RANGE.contains(&port));
    }
}
