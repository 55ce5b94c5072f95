use crate::protocol::Capabilities;

/// A client-originated packet, written into the connection's staging buffer
/// after the 4 reserved frame-header bytes.
pub(crate) trait Encode {
    /// Capacity estimate for the staging buffer. An underestimate only
    /// costs a reallocation.
    fn size_hint(&self) -> usize;

    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities);
}
