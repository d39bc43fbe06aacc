//! `NetworkItemStackDescriptor` codec.
//!
//! The relay only materializes the fields it acts on (runtime id, count,
//! block runtime id); NBT user data is skipped on decode and never produced
//! on encode.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::varint::{VarInt, VarLong, VarUInt32};

/// An item stack slot. `runtime_id == 0` means empty (air).
#[derive(Debug, Clone, Default)]
pub struct ItemStack {
    pub runtime_id: i32,
    pub count: u16,
    pub metadata: u16,
    /// Block runtime ID when this item places a block.
    pub block_runtime_id: i32,
    /// Server-assigned stack network ID. 0 = none.
    pub stack_network_id: i32,
}

impl ItemStack {
    /// An empty slot (air).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(runtime_id: i32, count: u16) -> Self {
        Self {
            runtime_id,
            count,
            ..Self::default()
        }
    }

    /// An item that places the given block.
    pub fn placeable(runtime_id: i32, count: u16, block_runtime_id: i32) -> Self {
        Self {
            runtime_id,
            count,
            block_runtime_id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runtime_id == 0 || self.count == 0
    }
}

impl ProtoEncode for ItemStack {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.runtime_id).proto_encode(buf);
        if self.runtime_id == 0 {
            return;
        }
        buf.put_u16_le(self.count);
        VarUInt32(self.metadata as u32).proto_encode(buf);
        if self.stack_network_id != 0 {
            buf.put_u8(1);
            VarInt(self.stack_network_id).proto_encode(buf);
        } else {
            buf.put_u8(0);
        }
        VarInt(self.block_runtime_id).proto_encode(buf);
        // No user data.
        VarUInt32(0).proto_encode(buf);
        // CanPlaceOn + CanDestroy: empty.
        VarInt(0).proto_encode(buf);
        VarInt(0).proto_encode(buf);
    }
}

impl ProtoDecode for ItemStack {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let runtime_id = VarInt::proto_decode(buf)?.0;
        if runtime_id == 0 {
            return Ok(Self::empty());
        }
        ensure_remaining(buf, 2)?;
        let count = buf.get_u16_le();
        let metadata = VarUInt32::proto_decode(buf)?.0 as u16;

        ensure_remaining(buf, 1)?;
        let stack_network_id = if buf.get_u8() != 0 {
            VarInt::proto_decode(buf)?.0
        } else {
            0
        };

        let block_runtime_id = VarInt::proto_decode(buf)?.0;

        skip_user_data(buf)?;
        for _ in 0..2 {
            let count = VarInt::proto_decode(buf)?.0;
            for _ in 0..count {
                let _ = read_string(buf)?;
            }
        }

        Ok(Self {
            runtime_id,
            count,
            metadata,
            block_runtime_id,
            stack_network_id,
        })
    }
}

/// Skip the user data section (raw bytes or network NBT).
fn skip_user_data(buf: &mut impl Buf) -> Result<(), ProtoError> {
    let marker = VarUInt32::proto_decode(buf)?.0;
    if marker == 0xFFFF_FFFF {
        ensure_remaining(buf, 1)?;
        let version = buf.get_u8();
        if version == 1 {
            skip_nbt_compound(buf)?;
        }
    } else if marker > 0 {
        ensure_remaining(buf, marker as usize)?;
        buf.advance(marker as usize);
    }
    Ok(())
}

/// Skip a network-format NBT compound (root tag byte + name + children).
fn skip_nbt_compound(buf: &mut impl Buf) -> Result<(), ProtoError> {
    ensure_remaining(buf, 1)?;
    let root_type = buf.get_u8();
    if root_type != 10 {
        return Err(ProtoError::invalid("nbt root tag", root_type));
    }
    skip_string(buf)?;
    loop {
        ensure_remaining(buf, 1)?;
        let tag_type = buf.get_u8();
        if tag_type == 0 {
            return Ok(());
        }
        skip_string(buf)?;
        skip_nbt_payload(buf, tag_type)?;
    }
}

fn skip_string(buf: &mut impl Buf) -> Result<(), ProtoError> {
    let len = VarUInt32::proto_decode(buf)?.0 as usize;
    ensure_remaining(buf, len)?;
    buf.advance(len);
    Ok(())
}

/// Skip one NBT tag payload (network variant: VarInt ints, VarUInt32 string lengths).
fn skip_nbt_payload(buf: &mut impl Buf, tag_type: u8) -> Result<(), ProtoError> {
    match tag_type {
        1 => {
            ensure_remaining(buf, 1)?;
            buf.advance(1);
        }
        2 => {
            ensure_remaining(buf, 2)?;
            buf.advance(2);
        }
        3 => {
            let _ = VarInt::proto_decode(buf)?;
        }
        4 => {
            let _ = VarLong::proto_decode(buf)?;
        }
        5 => {
            ensure_remaining(buf, 4)?;
            buf.advance(4);
        }
        6 => {
            ensure_remaining(buf, 8)?;
            buf.advance(8);
        }
        7 => {
            let len = VarInt::proto_decode(buf)?.0.max(0) as usize;
            ensure_remaining(buf, len)?;
            buf.advance(len);
        }
        8 => skip_string(buf)?,
        9 => {
            ensure_remaining(buf, 1)?;
            let element_type = buf.get_u8();
            let count = VarInt::proto_decode(buf)?.0;
            for _ in 0..count {
                skip_nbt_payload(buf, element_type)?;
            }
        }
        10 => {
            // Nested compound: children only (no root byte/name).
            loop {
                ensure_remaining(buf, 1)?;
                let child_type = buf.get_u8();
                if child_type == 0 {
                    break;
                }
                skip_string(buf)?;
                skip_nbt_payload(buf, child_type)?;
            }
        }
        11 => {
            let count = VarInt::proto_decode(buf)?.0;
            for _ in 0..count {
                let _ = VarInt::proto_decode(buf)?;
            }
        }
        12 => {
            let count = VarInt::proto_decode(buf)?.0;
            for _ in 0..count {
                let _ = VarLong::proto_decode(buf)?;
            }
        }
        other => return Err(ProtoError::invalid("nbt tag type", other)),
    }
    Ok(())
}
