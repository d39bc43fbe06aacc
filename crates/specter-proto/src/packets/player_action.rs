//! PlayerAction (0x24) — Client → Server.
//!
//! Player state changes: mining start/stop, respawn, dimension ack. The
//! relay watches the break actions to keep its block mirror honest when
//! the server is slow to confirm.

use bytes::Buf;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::math::BlockPos;
use crate::varint::{VarInt, VarUInt64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerActionType {
    StartBreak,
    AbortBreak,
    StopBreak,
    PredictDestroyBlock,
    ContinueDestroyBlock,
    /// Any action type not handled specifically.
    Other(i32),
}

impl PlayerActionType {
    fn from_i32(v: i32) -> Self {
        match v {
            0 => Self::StartBreak,
            1 => Self::AbortBreak,
            2 => Self::StopBreak,
            22 => Self::PredictDestroyBlock,
            23 => Self::ContinueDestroyBlock,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerAction {
    pub entity_runtime_id: u64,
    pub action: PlayerActionType,
    pub block_position: BlockPos,
    pub result_position: BlockPos,
    pub face: i32,
}

impl ProtoDecode for PlayerAction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
        let action = PlayerActionType::from_i32(VarInt::proto_decode(buf)?.0);
        let block_position = BlockPos::proto_decode(buf)?;
        let result_position = BlockPos::proto_decode(buf)?;
        let face = VarInt::proto_decode(buf)?.0;

        Ok(Self {
            entity_runtime_id,
            action,
            block_position,
            result_position,
            face,
        })
    }
}
