//! AddItemEntity (0x0F) — Server → Client.
//!
//! Spawns a dropped item entity. Decoded so the registry can track drops;
//! the trailing metadata section is left unparsed.

use bytes::Buf;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::math::Vec3;
use crate::varint::{VarLong, VarUInt64};

#[derive(Debug, Clone)]
pub struct AddItemEntity {
    pub entity_unique_id: i64,
    pub entity_runtime_id: u64,
    pub item: ItemStack,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl ProtoDecode for AddItemEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_unique_id = VarLong::proto_decode(buf)?.0;
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let item = ItemStack::proto_decode(buf)?;
        let position = Vec3::proto_decode(buf)?;
        let velocity = Vec3::proto_decode(buf)?;
        // Metadata and the fishing flag follow; not needed.
        Ok(Self {
            entity_unique_id,
            entity_runtime_id,
            item,
            position,
            velocity,
        })
    }
}
