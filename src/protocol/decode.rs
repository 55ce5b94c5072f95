use crate::error::Result;

/// A server-originated packet, decoded from one reassembled payload.
pub(crate) trait Decode {
    fn decode(buf: &[u8]) -> Result<Self>
    where
        Self: Sized;
}
