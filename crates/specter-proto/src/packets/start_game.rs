//! StartGame (0x0B) — Server → Client.
//!
//! The largest packet in the protocol. The relay only needs the opening
//! fields, which identify the local player and where the session starts;
//! everything after the rotation is forwarded unread.

use bytes::Buf;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::math::{Vec2, Vec3};
use crate::varint::{VarInt, VarLong, VarUInt64};

/// Parsed head of a StartGame packet.
#[derive(Debug, Clone)]
pub struct StartGame {
    pub entity_unique_id: i64,
    pub entity_runtime_id: u64,
    pub player_gamemode: i32,
    pub player_position: Vec3,
    /// Pitch (x) and yaw (z).
    pub rotation: Vec2,
}

impl ProtoDecode for StartGame {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_unique_id = VarLong::proto_decode(buf)?.0;
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let player_gamemode = VarInt::proto_decode(buf)?.0;
        let player_position = Vec3::proto_decode(buf)?;
        let rotation = Vec2::proto_decode(buf)?;

        // Seed, game rules, item table and the rest stay unparsed.

        Ok(Self {
            entity_unique_id,
            entity_runtime_id,
            player_gamemode,
            player_position,
            rotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ProtoEncode;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn decode_head_ignores_tail() {
        let mut buf = BytesMut::new();
        VarLong(1).proto_encode(&mut buf);
        VarUInt64(1).proto_encode(&mut buf);
        VarInt(0).proto_encode(&mut buf);
        Vec3::new(0.5, 65.62, 0.5).proto_encode(&mut buf);
        Vec2::new(0.0, 90.0).proto_encode(&mut buf);
        buf.put_slice(&[0xDD; 200]); // world config tail

        let pkt = StartGame::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.entity_unique_id, 1);
        assert_eq!(pkt.entity_runtime_id, 1);
        assert_eq!(pkt.player_gamemode, 0);
        assert_eq!(pkt.player_position, Vec3::new(0.5, 65.62, 0.5));
        assert_eq!(pkt.rotation, Vec2::new(0.0, 90.0));
    }

    #[test]
    fn decode_truncated() {
        let mut buf = BytesMut::new();
        VarLong(1).proto_encode(&mut buf);
        assert!(StartGame::proto_decode(&mut buf.freeze()).is_err());
    }
}
