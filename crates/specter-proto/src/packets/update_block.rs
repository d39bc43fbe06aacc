//! UpdateBlock (0x15) — Server → Client.
//!
//! A single block change. Decoded to keep the world mirror current, and
//! encoded when the relay injects a client-side-only block.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::BlockPos;
use crate::varint::VarUInt32;

/// Flags: Neighbours (0x01) + Network (0x02).
pub const UPDATE_BLOCK_FLAGS_DEFAULT: u32 = 0x03;

#[derive(Debug, Clone)]
pub struct UpdateBlock {
    pub position: BlockPos,
    pub runtime_id: u32,
    pub flags: u32,
    pub layer: u32,
}

impl UpdateBlock {
    /// An update on the default layer with standard flags.
    pub fn new(position: BlockPos, runtime_id: u32) -> Self {
        Self {
            position,
            runtime_id,
            flags: UPDATE_BLOCK_FLAGS_DEFAULT,
            layer: 0,
        }
    }
}

impl ProtoEncode for UpdateBlock {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.position.proto_encode(buf);
        VarUInt32(self.runtime_id).proto_encode(buf);
        VarUInt32(self.flags).proto_encode(buf);
        VarUInt32(self.layer).proto_encode(buf);
    }
}

impl ProtoDecode for UpdateBlock {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let position = BlockPos::proto_decode(buf)?;
        let runtime_id = VarUInt32::proto_decode(buf)?.0;
        let flags = VarUInt32::proto_decode(buf)?.0;
        let layer = VarUInt32::proto_decode(buf)?.0;
        Ok(Self {
            position,
            runtime_id,
            flags,
            layer,
        })
    }
}
