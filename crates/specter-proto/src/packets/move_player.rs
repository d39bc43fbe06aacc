//! MovePlayer (0x13) — Bidirectional.
//!
//! Server → client it broadcasts or corrects a player position; client →
//! server it reports movement under client-authoritative mode. The relay
//! decodes both directions and encodes substitutes for the controlled
//! entity.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::Vec3;
use crate::varint::VarUInt64;

/// Movement mode for MovePlayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MoveMode {
    /// Regular position update.
    Normal = 0,
    /// Server-authoritative position correction.
    Reset = 1,
    /// Teleport with cause information.
    Teleport = 2,
    /// Rotation-only update.
    Rotation = 3,
}

impl MoveMode {
    fn from_u8(v: u8) -> Result<Self, ProtoError> {
        match v {
            0 => Ok(MoveMode::Normal),
            1 => Ok(MoveMode::Reset),
            2 => Ok(MoveMode::Teleport),
            3 => Ok(MoveMode::Rotation),
            other => Err(ProtoError::invalid("MovePlayer mode", other)),
        }
    }
}

/// MovePlayer packet.
#[derive(Debug, Clone)]
pub struct MovePlayer {
    pub runtime_entity_id: u64,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub mode: MoveMode,
    pub on_ground: bool,
    pub ridden_entity_runtime_id: u64,
    /// Only present when mode == Teleport.
    pub teleport_cause: Option<i32>,
    /// Only present when mode == Teleport.
    pub teleport_entity_type: Option<i32>,
    pub tick: u64,
}

impl MovePlayer {
    /// A Normal update, as a client would author it.
    pub fn normal(
        runtime_entity_id: u64,
        position: Vec3,
        pitch: f32,
        yaw: f32,
        head_yaw: f32,
        on_ground: bool,
        tick: u64,
    ) -> Self {
        Self {
            runtime_entity_id,
            position,
            pitch,
            yaw,
            head_yaw,
            mode: MoveMode::Normal,
            on_ground,
            ridden_entity_runtime_id: 0,
            teleport_cause: None,
            teleport_entity_type: None,
            tick,
        }
    }

    /// Whether this packet forcibly corrects the entity's position.
    pub fn is_correction(&self) -> bool {
        matches!(self.mode, MoveMode::Reset | MoveMode::Teleport)
    }
}

impl ProtoEncode for MovePlayer {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt64(self.runtime_entity_id).proto_encode(buf);
        self.position.proto_encode(buf);
        buf.put_f32_le(self.pitch);
        buf.put_f32_le(self.yaw);
        buf.put_f32_le(self.head_yaw);
        buf.put_u8(self.mode as u8);
        buf.put_u8(self.on_ground as u8);
        VarUInt64(self.ridden_entity_runtime_id).proto_encode(buf);
        if self.mode == MoveMode::Teleport {
            buf.put_i32_le(self.teleport_cause.unwrap_or(0));
            buf.put_i32_le(self.teleport_entity_type.unwrap_or(0));
        }
        VarUInt64(self.tick).proto_encode(buf);
    }
}

impl ProtoDecode for MovePlayer {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let runtime_entity_id = VarUInt64::proto_decode(buf)?.0;
        let position = Vec3::proto_decode(buf)?;

        ensure_remaining(buf, 14)?;
        let pitch = buf.get_f32_le();
        let yaw = buf.get_f32_le();
        let head_yaw = buf.get_f32_le();
        let mode = MoveMode::from_u8(buf.get_u8())?;
        let on_ground = buf.get_u8() != 0;

        let ridden_entity_runtime_id = VarUInt64::proto_decode(buf)?.0;

        let (teleport_cause, teleport_entity_type) = if mode == MoveMode::Teleport {
            ensure_remaining(buf, 8)?;
            (Some(buf.get_i32_le()), Some(buf.get_i32_le()))
        } else {
            (None, None)
        };

        let tick = VarUInt64::proto_decode(buf)?.0;

        Ok(Self {
            runtime_entity_id,
            position,
            pitch,
            yaw,
            head_yaw,
            mode,
            on_ground,
            ridden_entity_runtime_id,
            teleport_cause,
            teleport_entity_type,
            tick,
        })
    }
}
