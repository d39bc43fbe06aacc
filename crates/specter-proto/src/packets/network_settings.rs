//! NetworkSettings (0x8F) — Server → Client.
//!
//! Compression settings. Both directions of the relay switch their batch
//! codecs to the negotiated algorithm right after this packet passes.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::compression::Compression;
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// Packets smaller than this are sent uncompressed.
    pub compression_threshold: u16,
    /// 0 = Zlib, 1 = Snappy, 0xFFFF = None.
    pub compression_algorithm: u16,
    pub client_throttle_enabled: bool,
    pub client_throttle_threshold: u8,
    pub client_throttle_scalar: f32,
}

impl NetworkSettings {
    pub fn compression(&self) -> Result<Compression, ProtoError> {
        match self.compression_algorithm {
            0 => Ok(Compression::Zlib),
            1 => Ok(Compression::Snappy),
            0xFFFF => Ok(Compression::None),
            other => Err(ProtoError::invalid("compression algorithm", other)),
        }
    }
}

impl ProtoEncode for NetworkSettings {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.compression_threshold);
        buf.put_u16_le(self.compression_algorithm);
        buf.put_u8(self.client_throttle_enabled as u8);
        buf.put_u8(self.client_throttle_threshold);
        buf.put_f32_le(self.client_throttle_scalar);
    }
}

impl ProtoDecode for NetworkSettings {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 10)?;
        Ok(Self {
            compression_threshold: buf.get_u16_le(),
            compression_algorithm: buf.get_u16_le(),
            client_throttle_enabled: buf.get_u8() != 0,
            client_throttle_threshold: buf.get_u8(),
            client_throttle_scalar: buf.get_f32_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn roundtrip() {
        let settings = NetworkSettings {
            compression_threshold: 512,
            compression_algorithm: 1,
            client_throttle_enabled: true,
            client_throttle_threshold: 10,
            client_throttle_scalar: 1.5,
        };
        let mut buf = BytesMut::new();
        settings.proto_encode(&mut buf);
        assert_eq!(buf.len(), 10);
        let decoded = NetworkSettings::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, settings);
        assert_eq!(decoded.compression().unwrap(), Compression::Snappy);
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let settings = NetworkSettings {
            compression_threshold: 0,
            compression_algorithm: 7,
            client_throttle_enabled: false,
            client_throttle_threshold: 0,
            client_throttle_scalar: 0.0,
        };
        assert!(settings.compression().is_err());
    }
}
