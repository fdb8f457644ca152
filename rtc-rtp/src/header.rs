/// Fixed RTP header fields (RFC 3550 §5.1) of an already-parsed packet, as far
/// as receiver statistics need them.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Header {
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
}
