//! SetEntityMotion (0x12) — Server → Client.
//!
//! Applies a velocity to an entity (knockback, explosions). While the
//! spoofer owns the controlled entity's movement these are decoded and
//! swallowed instead of forwarded.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::Vec3;
use crate::varint::VarUInt64;

#[derive(Debug, Clone)]
pub struct SetEntityMotion {
    pub entity_runtime_id: u64,
    pub motion: Vec3,
}

impl ProtoEncode for SetEntityMotion {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt64(self.entity_runtime_id).proto_encode(buf);
        self.motion.proto_encode(buf);
    }
}

impl ProtoDecode for SetEntityMotion {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let motion = Vec3::proto_decode(buf)?;
        Ok(Self {
            entity_runtime_id,
            motion,
        })
    }
}
