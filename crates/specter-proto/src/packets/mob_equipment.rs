//! MobEquipment (0x1F) — Bidirectional.
//!
//! Hotbar slot changes. Decoded serverbound so the relay knows what the
//! player holds; encoded when it forces a slot for an injected placement.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::varint::VarUInt64;

#[derive(Debug, Clone)]
pub struct MobEquipment {
    pub entity_runtime_id: u64,
    pub item: ItemStack,
    pub inventory_slot: u8,
    /// Hotbar slot (0-8).
    pub hotbar_slot: u8,
    /// Container window ID (0 = inventory).
    pub window_id: u8,
}

impl MobEquipment {
    /// A hotbar switch, as the client reports it.
    pub fn hotbar_switch(entity_runtime_id: u64, item: ItemStack, hotbar_slot: u8) -> Self {
        Self {
            entity_runtime_id,
            item,
            inventory_slot: hotbar_slot,
            hotbar_slot,
            window_id: 0,
        }
    }
}

impl ProtoEncode for MobEquipment {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt64(self.entity_runtime_id).proto_encode(buf);
        self.item.proto_encode(buf);
        buf.put_u8(self.inventory_slot);
        buf.put_u8(self.hotbar_slot);
        buf.put_u8(self.window_id);
    }
}

impl ProtoDecode for MobEquipment {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let item = ItemStack::proto_decode(buf)?;
        ensure_remaining(buf, 3)?;
        let inventory_slot = buf.get_u8();
        let hotbar_slot = buf.get_u8();
        let window_id = buf.get_u8();
        Ok(Self {
            entity_runtime_id,
            item,
            inventory_slot,
            hotbar_slot,
            window_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn roundtrip_hotbar_switch() {
        let pkt = MobEquipment::hotbar_switch(1, ItemStack::placeable(9, 64, 4242), 3);
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let decoded = MobEquipment::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.entity_runtime_id, 1);
        assert_eq!(decoded.hotbar_slot, 3);
        assert_eq!(decoded.inventory_slot, 3);
        assert_eq!(decoded.window_id, 0);
        assert_eq!(decoded.item.block_runtime_id, 4242);
    }

    #[test]
    fn roundtrip_empty_hand() {
        let pkt = MobEquipment::hotbar_switch(2, ItemStack::empty(), 0);
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let decoded = MobEquipment::proto_decode(&mut buf.freeze()).unwrap();
        assert!(decoded.item.is_empty());
    }
}
