//! InventoryContent (0x31) — Server → Client.
//!
//! Full contents of a container window. The relay mirrors window 0 so it
//! knows which hotbar slots hold placeable blocks.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::varint::VarUInt32;

/// The player inventory window.
pub const WINDOW_INVENTORY: u32 = 0;

#[derive(Debug, Clone)]
pub struct InventoryContent {
    pub window_id: u32,
    pub items: Vec<ItemStack>,
}

impl ProtoEncode for InventoryContent {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.window_id).proto_encode(buf);
        VarUInt32(self.items.len() as u32).proto_encode(buf);
        for item in &self.items {
            item.proto_encode(buf);
            // FullContainerName: container_id + dynamic_container_id.
            buf.put_u8(0);
            VarUInt32(0).proto_encode(buf);
        }
    }
}

impl ProtoDecode for InventoryContent {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let window_id = VarUInt32::proto_decode(buf)?.0;
        let count = VarUInt32::proto_decode(buf)?.0 as usize;
        let mut items = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            items.push(ItemStack::proto_decode(buf)?);
            ensure_remaining(buf, 1)?;
            buf.advance(1); // container_id
            let _ = VarUInt32::proto_decode(buf)?; // dynamic_container_id
        }
        Ok(Self { window_id, items })
    }
}
