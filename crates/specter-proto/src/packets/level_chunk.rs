//! LevelChunk (0x3A) — Server → Client.
//!
//! A full chunk column. The relay only needs the header to key its world
//! mirror; the terrain payload stays opaque and is forwarded untouched.

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{ensure_remaining, read_byte_array, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::ChunkPos;
use crate::varint::{VarInt, VarUInt32};

#[derive(Debug, Clone)]
pub struct LevelChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub dimension_id: i32,
    pub sub_chunk_count: u32,
    pub cache_enabled: bool,
    /// Opaque terrain payload: SubChunks[] + BiomeData + BorderBlocks.
    pub payload: Bytes,
}

impl LevelChunk {
    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }
}

impl ProtoEncode for LevelChunk {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.chunk_x).proto_encode(buf);
        VarInt(self.chunk_z).proto_encode(buf);
        VarInt(self.dimension_id).proto_encode(buf);
        VarUInt32(self.sub_chunk_count).proto_encode(buf);
        buf.put_u8(self.cache_enabled as u8);
        VarUInt32(self.payload.len() as u32).proto_encode(buf);
        buf.put_slice(&self.payload);
    }
}

impl ProtoDecode for LevelChunk {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let chunk_x = VarInt::proto_decode(buf)?.0;
        let chunk_z = VarInt::proto_decode(buf)?.0;
        let dimension_id = VarInt::proto_decode(buf)?.0;
        let sub_chunk_count = VarUInt32::proto_decode(buf)?.0;
        ensure_remaining(buf, 1)?;
        let cache_enabled = buf.get_u8() != 0;
        let payload = read_byte_array(buf)?;
        Ok(Self {
            chunk_x,
            chunk_z,
            dimension_id,
            sub_chunk_count,
            cache_enabled,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn roundtrip_header() {
        let pkt = LevelChunk {
            chunk_x: -3,
            chunk_z: 17,
            dimension_id: 0,
            sub_chunk_count: 24,
            cache_enabled: false,
            payload: Bytes::from_static(&[0x09, 0x01, 0xFF]),
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let decoded = LevelChunk::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.chunk_pos(), ChunkPos::new(-3, 17));
        assert_eq!(decoded.dimension_id, 0);
        assert_eq!(decoded.sub_chunk_count, 24);
        assert!(!decoded.cache_enabled);
        assert_eq!(&decoded.payload[..], &[0x09, 0x01, 0xFF]);
    }

    #[test]
    fn truncated_payload_rejected() {
        let pkt = LevelChunk {
            chunk_x: 0,
            chunk_z: 0,
            dimension_id: 0,
            sub_chunk_count: 1,
            cache_enabled: false,
            payload: Bytes::from_static(&[1, 2, 3, 4]),
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let truncated = buf.freeze().slice(..6);
        assert!(LevelChunk::proto_decode(&mut truncated.clone()).is_err());
    }
}
