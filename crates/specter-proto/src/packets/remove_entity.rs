//! RemoveEntity (0x0E) — Server → Client.
//!
//! Despawns an entity. Keyed by unique id, not runtime id, so the registry
//! maintains a unique-to-runtime mapping to service it.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::varint::VarLong;

#[derive(Debug, Clone)]
pub struct RemoveEntity {
    pub entity_unique_id: i64,
}

impl ProtoEncode for RemoveEntity {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarLong(self.entity_unique_id).proto_encode(buf);
    }
}

impl ProtoDecode for RemoveEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            entity_unique_id: VarLong::proto_decode(buf)?.0,
        })
    }
}
