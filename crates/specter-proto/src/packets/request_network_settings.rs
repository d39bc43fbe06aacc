//! RequestNetworkSettings (0xC1) — Client → Server.
//!
//! First game packet of a connection. The relay reads the protocol version
//! here to pick the right block mapping for the session.

use bytes::Buf;

use crate::codec::{ensure_remaining, ProtoDecode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNetworkSettings {
    /// Protocol version (int32 big-endian, unlike everything else).
    pub protocol_version: i32,
}

impl ProtoDecode for RequestNetworkSettings {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 4)?;
        Ok(Self {
            protocol_version: buf.get_i32(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_big_endian_version() {
        let data = Bytes::from_static(&[0x00, 0x00, 0x03, 0x9C]); // 924
        let pkt = RequestNetworkSettings::proto_decode(&mut data.clone()).unwrap();
        assert_eq!(pkt.protocol_version, 924);
    }

    #[test]
    fn decode_buffer_too_short() {
        let data = Bytes::from_static(&[0x00, 0x00]);
        assert!(RequestNetworkSettings::proto_decode(&mut data.clone()).is_err());
    }
}
