//! InventorySlot (0x32) — Server → Client.
//!
//! Single-slot update for a container window.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::varint::VarUInt32;

#[derive(Debug, Clone)]
pub struct InventorySlot {
    pub window_id: u32,
    pub slot: u32,
    pub item: ItemStack,
}

impl ProtoEncode for InventorySlot {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.window_id).proto_encode(buf);
        VarUInt32(self.slot).proto_encode(buf);
        // FullContainerName.
        buf.put_u8(0);
        VarUInt32(0).proto_encode(buf);
        self.item.proto_encode(buf);
    }
}

impl ProtoDecode for InventorySlot {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let window_id = VarUInt32::proto_decode(buf)?.0;
        let slot = VarUInt32::proto_decode(buf)?.0;
        ensure_remaining(buf, 1)?;
        buf.advance(1); // container_id
        let _ = VarUInt32::proto_decode(buf)?; // dynamic_container_id
        let item = ItemStack::proto_decode(buf)?;
        Ok(Self {
            window_id,
            slot,
            item,
        })
    }
}
