//! AddActor (0x0D) — Server → Client.
//!
//! Spawns a non-player entity. The relay decodes through the attribute
//! list and stops before entity metadata.

use bytes::Buf;

use crate::codec::{ensure_remaining, read_string, ProtoDecode};
use crate::error::ProtoError;
use crate::math::Vec3;
use crate::varint::{VarLong, VarUInt32, VarUInt64};

/// Parsed head of an AddActor packet.
#[derive(Debug, Clone)]
pub struct AddActor {
    pub entity_unique_id: i64,
    pub entity_runtime_id: u64,
    /// Namespaced identifier, e.g. "minecraft:zombie".
    pub entity_type: String,
    pub position: Vec3,
    pub velocity: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub body_yaw: f32,
}

impl ProtoDecode for AddActor {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_unique_id = VarLong::proto_decode(buf)?.0;
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let entity_type = read_string(buf)?;
        let position = Vec3::proto_decode(buf)?;
        let velocity = Vec3::proto_decode(buf)?;

        ensure_remaining(buf, 16)?;
        let pitch = buf.get_f32_le();
        let yaw = buf.get_f32_le();
        let head_yaw = buf.get_f32_le();
        let body_yaw = buf.get_f32_le();

        // Skip attributes (name + 4 floats each); metadata and links follow
        // and are left unparsed.
        let attribute_count = VarUInt32::proto_decode(buf)?.0;
        for _ in 0..attribute_count {
            let _ = read_string(buf)?;
            ensure_remaining(buf, 16)?;
            buf.advance(16);
        }

        Ok(Self {
            entity_unique_id,
            entity_runtime_id,
            entity_type,
            position,
            velocity,
            pitch,
            yaw,
            head_yaw,
            body_yaw,
        })
    }
}
