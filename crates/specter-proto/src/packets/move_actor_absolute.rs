//! MoveActorAbsolute (0x10) — Server → Client.
//!
//! Absolute position update for a non-player entity. Decoded to keep the
//! registry's last-known positions current.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::Vec3;
use crate::varint::VarUInt64;

pub const MOVE_ACTOR_FLAG_ON_GROUND: u16 = 0x01;
pub const MOVE_ACTOR_FLAG_TELEPORT: u16 = 0x02;

#[derive(Debug, Clone)]
pub struct MoveActorAbsolute {
    pub entity_runtime_id: u64,
    pub flags: u16,
    pub position: Vec3,
    /// Degrees; a compressed byte on the wire, so precision is 360/256.
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
}

impl MoveActorAbsolute {
    fn angle_to_byte(angle: f32) -> u8 {
        ((angle % 360.0 + 360.0) % 360.0 * (256.0 / 360.0)) as u8
    }

    fn byte_to_angle(b: u8) -> f32 {
        b as f32 * (360.0 / 256.0)
    }

    pub fn on_ground(&self) -> bool {
        self.flags & MOVE_ACTOR_FLAG_ON_GROUND != 0
    }
}

impl ProtoEncode for MoveActorAbsolute {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt64(self.entity_runtime_id).proto_encode(buf);
        buf.put_u16_le(self.flags);
        self.position.proto_encode(buf);
        buf.put_u8(Self::angle_to_byte(self.pitch));
        buf.put_u8(Self::angle_to_byte(self.yaw));
        buf.put_u8(Self::angle_to_byte(self.head_yaw));
    }
}

impl ProtoDecode for MoveActorAbsolute {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        ensure_remaining(buf, 2)?;
        let flags = buf.get_u16_le();
        let position = Vec3::proto_decode(buf)?;
        ensure_remaining(buf, 3)?;
        let pitch = Self::byte_to_angle(buf.get_u8());
        let yaw = Self::byte_to_angle(buf.get_u8());
        let head_yaw = Self::byte_to_angle(buf.get_u8());
        Ok(Self {
            entity_runtime_id,
            flags,
            position,
            pitch,
            yaw,
            head_yaw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn roundtrip_with_angle_loss() {
        let pkt = MoveActorAbsolute {
            entity_runtime_id: 42,
            flags: MOVE_ACTOR_FLAG_ON_GROUND,
            position: Vec3::new(10.0, 4.0, 10.0),
            pitch: 0.0,
            yaw: 90.0,
            head_yaw: 90.0,
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf.len(), 18);
        let decoded = MoveActorAbsolute::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.entity_runtime_id, 42);
        assert!(decoded.on_ground());
        assert_eq!(decoded.position, Vec3::new(10.0, 4.0, 10.0));
        // Angles survive within one compression step.
        assert!((decoded.yaw - 90.0).abs() < 360.0 / 256.0 + 1e-3);
    }

    #[test]
    fn angle_to_byte_conversions() {
        assert_eq!(MoveActorAbsolute::angle_to_byte(0.0), 0);
        assert_eq!(MoveActorAbsolute::angle_to_byte(90.0), 64);
        assert_eq!(MoveActorAbsolute::angle_to_byte(180.0), 128);
        assert_eq!(MoveActorAbsolute::angle_to_byte(-90.0), 192);
        assert_eq!(MoveActorAbsolute::angle_to_byte(360.0), 0);
    }
}
