//! The fixed-size request header (§4.1, §6, Design Note "Header portability").
//!
//! The original C implementation transmits the request struct by raw memory
//! copy. That is not portable: field widths and byte order depend on the
//! compiler and target. This is an explicit little-endian record instead —
//! four fields, defined widths, no padding.

/// Encoded header size in bytes: `u32` kind + three `u64` fields.
pub const HEADER_LEN: usize = 4 + 8 + 8 + 8;

/// Task-request header sent by the dispatcher ahead of the payload.
///
/// The payload itself is never part of the header; it follows as a
/// separately length-prefixed blob (§4.1 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Numeric encoding of [`crate::core::TaskKind`].
    pub kind: u32,
    /// Task id.
    pub id: u64,
    /// Task sub-id.
    pub sub_id: u64,
    /// Max-wait deadline, in seconds.
    pub max_wait_secs: u64,
}

impl RequestHeader {
    /// Encode to the wire's little-endian byte layout.
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.kind.to_le_bytes());
        buf[4..12].copy_from_slice(&self.id.to_le_bytes());
        buf[12..20].copy_from_slice(&self.sub_id.to_le_bytes());
        buf[20..28].copy_from_slice(&self.max_wait_secs.to_le_bytes());
        buf
    }

    /// Decode from the wire's little-endian byte layout.
    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            kind: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            id: u64::from_le_bytes(buf[4..12].try_into().unwrap()),
            sub_id: u64::from_le_bytes(buf[12..20].try_into().unwrap()),
            max_wait_secs: u64::from_le_bytes(buf[20..28].try_into().unwrap()),
        }
    }
}
