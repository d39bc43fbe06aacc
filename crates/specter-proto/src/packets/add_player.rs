//! AddPlayer (0x0C) — Server → Client.
//!
//! Spawns a remote player entity. The relay decodes the head of the packet
//! to register the entity and learn its display name; ability data, entity
//! links and device info are left unparsed.

use bytes::Buf;

use crate::codec::{ensure_remaining, read_string, ProtoDecode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::math::Vec3;
use crate::varint::{VarInt, VarUInt64};

/// Parsed head of an AddPlayer packet.
///
/// Stops after the gamemode field; trailing sections survive because the
/// batch framing carries the packet length.
#[derive(Debug, Clone)]
pub struct AddPlayer {
    pub username: String,
    pub entity_runtime_id: u64,
    pub platform_chat_id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub held_item: ItemStack,
    pub gamemode: i32,
}

impl ProtoDecode for AddPlayer {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        // UUID, 16 bytes. The relay keys entities by runtime id instead.
        ensure_remaining(buf, 16)?;
        buf.advance(16);

        let username = read_string(buf)?;
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let platform_chat_id = read_string(buf)?;
        let position = Vec3::proto_decode(buf)?;
        let velocity = Vec3::proto_decode(buf)?;

        ensure_remaining(buf, 12)?;
        let pitch = buf.get_f32_le();
        let yaw = buf.get_f32_le();
        let head_yaw = buf.get_f32_le();

        let held_item = ItemStack::proto_decode(buf)?;
        let gamemode = VarInt::proto_decode(buf)?.0;

        // Entity metadata, ability data, links and device info follow.

        Ok(Self {
            username,
            entity_runtime_id,
            platform_chat_id,
            position,
            velocity,
            pitch,
            yaw,
            head_yaw,
            held_item,
            gamemode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{write_string, ProtoEncode};
    use bytes::{BufMut, BytesMut};

    fn encode_test_add_player(name: &str, runtime_id: u64, position: Vec3) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0u8; 16]); // uuid
        write_string(&mut buf, name);
        VarUInt64(runtime_id).proto_encode(&mut buf);
        write_string(&mut buf, ""); // platform chat id
        position.proto_encode(&mut buf);
        Vec3::ZERO.proto_encode(&mut buf); // velocity
        buf.put_f32_le(0.0);
        buf.put_f32_le(90.0);
        buf.put_f32_le(90.0);
        ItemStack::empty().proto_encode(&mut buf);
        VarInt(0).proto_encode(&mut buf); // gamemode
        buf.put_slice(&[0xBB; 32]); // unparsed metadata and ability data
        buf
    }

    #[test]
    fn decode_head() {
        let buf = encode_test_add_player("Steve", 7, Vec3::new(1.0, 64.0, -2.0));
        let pkt = AddPlayer::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.username, "Steve");
        assert_eq!(pkt.entity_runtime_id, 7);
        assert_eq!(pkt.position, Vec3::new(1.0, 64.0, -2.0));
        assert_eq!(pkt.yaw, 90.0);
        assert!(pkt.held_item.is_empty());
        assert_eq!(pkt.gamemode, 0);
    }

    #[test]
    fn decode_truncated_uuid() {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0u8; 8]);
        assert!(AddPlayer::proto_decode(&mut buf.freeze()).is_err());
    }
}
