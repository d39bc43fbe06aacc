//! PlayerAuthInput (0x90) — Client → Server.
//!
//! Sent every tick with position, rotation and input state. The relay reads
//! it for spoofer engagement (fly toggles, directional keys) and patches the
//! position fields in place when it owns the entity's movement.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::math::{Vec2, Vec3};
use crate::varint::{VarUInt32, VarUInt64};

/// Bitflags for the `input_data` field of [`PlayerAuthInput`].
pub mod input_flags {
    pub const ASCEND: u64 = 1 << 0;
    pub const DESCEND: u64 = 1 << 1;
    pub const JUMP_DOWN: u64 = 1 << 3;
    pub const SPRINT_DOWN: u64 = 1 << 4;
    pub const JUMPING: u64 = 1 << 6;
    pub const SNEAKING: u64 = 1 << 8;
    pub const SNEAK_DOWN: u64 = 1 << 9;
    pub const UP: u64 = 1 << 10;
    pub const DOWN: u64 = 1 << 11;
    pub const LEFT: u64 = 1 << 12;
    pub const RIGHT: u64 = 1 << 13;
    pub const UP_LEFT: u64 = 1 << 14;
    pub const UP_RIGHT: u64 = 1 << 15;
    pub const WANT_UP: u64 = 1 << 16;
    pub const WANT_DOWN: u64 = 1 << 17;
    pub const SPRINTING: u64 = 1 << 20;
    pub const START_SWIMMING: u64 = 1 << 25;
    pub const STOP_SWIMMING: u64 = 1 << 26;
    pub const START_SPRINTING: u64 = 1 << 27;
    pub const STOP_SPRINTING: u64 = 1 << 28;
    pub const START_SNEAKING: u64 = 1 << 29;
    pub const STOP_SNEAKING: u64 = 1 << 30;
    pub const START_FLYING: u64 = 1 << 33;
    pub const STOP_FLYING: u64 = 1 << 34;

    // Conditional sub-packet triggers; their payloads are never parsed.
    pub const PERFORM_ITEM_INTERACTION: u64 = 1 << 35;
    pub const PERFORM_BLOCK_ACTIONS: u64 = 1 << 36;
    pub const PERFORM_ITEM_STACK_REQUEST: u64 = 1 << 37;
}

/// Byte offset of the position Vec3 inside the packet body. Pitch and yaw
/// are fixed-width floats ahead of it, so the offset never moves.
pub const POSITION_OFFSET: usize = 8;

/// Core fields of the PlayerAuthInput packet.
///
/// Only the fixed-layout head is parsed; the decoder stops before the
/// conditional sub-packets. Sub-packets in a batch carry their own length
/// prefix, so a partial read is safe.
#[derive(Debug, Clone)]
pub struct PlayerAuthInput {
    pub pitch: f32,
    pub yaw: f32,
    pub position: Vec3,
    pub move_vector: Vec2,
    pub head_yaw: f32,
    pub input_data: u64,
    pub input_mode: u32,
    pub play_mode: u32,
    pub interaction_model: u32,
    pub tick: u64,
    pub position_delta: Vec3,
}

impl PlayerAuthInput {
    /// Check whether a specific input flag is set.
    pub fn has_flag(&self, flag: u64) -> bool {
        self.input_data & flag != 0
    }

    pub fn started_flying(&self) -> bool {
        self.has_flag(input_flags::START_FLYING)
    }

    pub fn stopped_flying(&self) -> bool {
        self.has_flag(input_flags::STOP_FLYING)
    }
}

/// Overwrite the position in a raw packet body without re-encoding.
///
/// The caller holds the full original body (id already stripped); only the
/// 12 position bytes change, so every unparsed trailing field survives.
pub fn patch_position(body: &mut [u8], position: Vec3) -> Result<(), ProtoError> {
    let end = POSITION_OFFSET + 12;
    if body.len() < end {
        return Err(ProtoError::BufferTooShort {
            needed: end,
            remaining: body.len(),
        });
    }
    let mut slot = &mut body[POSITION_OFFSET..end];
    position.proto_encode(&mut slot);
    Ok(())
}

impl ProtoDecode for PlayerAuthInput {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 8)?;
        let pitch = buf.get_f32_le();
        let yaw = buf.get_f32_le();

        let position = Vec3::proto_decode(buf)?;
        let move_vector = Vec2::proto_decode(buf)?;

        ensure_remaining(buf, 4)?;
        let head_yaw = buf.get_f32_le();

        let input_data = VarUInt64::proto_decode(buf)?.0;
        let input_mode = VarUInt32::proto_decode(buf)?.0;
        let play_mode = VarUInt32::proto_decode(buf)?.0;
        let interaction_model = VarUInt32::proto_decode(buf)?.0;

        // PlayMode 5 = VR: skip GazeDirection.
        if play_mode == 5 {
            let _gaze = Vec3::proto_decode(buf)?;
        }

        let tick = VarUInt64::proto_decode(buf)?.0;
        let position_delta = Vec3::proto_decode(buf)?;

        // Stop here, ahead of the conditional sub-packets.

        Ok(Self {
            pitch,
            yaw,
            position,
            move_vector,
            head_yaw,
            input_data,
            input_mode,
            play_mode,
            interaction_model,
            tick,
            position_delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn encode_test_input(pkt: &PlayerAuthInput) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_f32_le(pkt.pitch);
        buf.put_f32_le(pkt.yaw);
        pkt.position.proto_encode(&mut buf);
        pkt.move_vector.proto_encode(&mut buf);
        buf.put_f32_le(pkt.head_yaw);
        VarUInt64(pkt.input_data).proto_encode(&mut buf);
        VarUInt32(pkt.input_mode).proto_encode(&mut buf);
        VarUInt32(pkt.play_mode).proto_encode(&mut buf);
        VarUInt32(pkt.interaction_model).proto_encode(&mut buf);
        VarUInt64(pkt.tick).proto_encode(&mut buf);
        pkt.position_delta.proto_encode(&mut buf);
        buf
    }

    fn default_input() -> PlayerAuthInput {
        PlayerAuthInput {
            pitch: 0.0,
            yaw: 0.0,
            position: Vec3::ZERO,
            move_vector: Vec2::ZERO,
            head_yaw: 0.0,
            input_data: 0,
            input_mode: 0,
            play_mode: 0,
            interaction_model: 0,
            tick: 0,
            position_delta: Vec3::ZERO,
        }
    }

    #[test]
    fn decode_walking_forward() {
        let input = PlayerAuthInput {
            pitch: -5.0,
            yaw: 180.0,
            position: Vec3::new(10.0, 5.62, 20.0),
            move_vector: Vec2::new(0.0, 1.0),
            head_yaw: 180.0,
            input_data: input_flags::UP | input_flags::SPRINTING,
            tick: 100,
            position_delta: Vec3::new(0.0, 0.0, 0.2),
            ..default_input()
        };
        let buf = encode_test_input(&input);
        let pkt = PlayerAuthInput::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.position, Vec3::new(10.0, 5.62, 20.0));
        assert!(pkt.has_flag(input_flags::UP));
        assert!(pkt.has_flag(input_flags::SPRINTING));
        assert!(!pkt.has_flag(input_flags::SNEAKING));
        assert_eq!(pkt.tick, 100);
    }

    #[test]
    fn decode_fly_toggles() {
        let input = PlayerAuthInput {
            input_data: input_flags::START_FLYING,
            ..default_input()
        };
        let buf = encode_test_input(&input);
        let pkt = PlayerAuthInput::proto_decode(&mut buf.freeze()).unwrap();
        assert!(pkt.started_flying());
        assert!(!pkt.stopped_flying());
    }

    #[test]
    fn decode_vr_mode_skips_gaze() {
        let input = PlayerAuthInput {
            play_mode: 5,
            tick: 42,
            ..default_input()
        };
        let mut buf = BytesMut::new();
        buf.put_f32_le(input.pitch);
        buf.put_f32_le(input.yaw);
        input.position.proto_encode(&mut buf);
        input.move_vector.proto_encode(&mut buf);
        buf.put_f32_le(input.head_yaw);
        VarUInt64(input.input_data).proto_encode(&mut buf);
        VarUInt32(input.input_mode).proto_encode(&mut buf);
        VarUInt32(5).proto_encode(&mut buf);
        VarUInt32(input.interaction_model).proto_encode(&mut buf);
        Vec3::new(0.0, 0.0, 1.0).proto_encode(&mut buf); // GazeDirection
        VarUInt64(42).proto_encode(&mut buf);
        input.position_delta.proto_encode(&mut buf);

        let pkt = PlayerAuthInput::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.play_mode, 5);
        assert_eq!(pkt.tick, 42);
    }

    #[test]
    fn decode_ignores_trailing_sub_packets() {
        let input = PlayerAuthInput {
            input_data: input_flags::PERFORM_BLOCK_ACTIONS,
            tick: 9,
            ..default_input()
        };
        let mut buf = encode_test_input(&input);
        buf.extend_from_slice(&[0xAA; 16]); // unparsed sub-packet bytes
        let pkt = PlayerAuthInput::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.tick, 9);
    }

    #[test]
    fn patch_position_in_place() {
        let input = PlayerAuthInput {
            position: Vec3::new(1.0, 2.0, 3.0),
            tick: 5,
            ..default_input()
        };
        let mut body = encode_test_input(&input).to_vec();
        patch_position(&mut body, Vec3::new(-7.5, 64.0, 12.25)).unwrap();
        let pkt = PlayerAuthInput::proto_decode(&mut &body[..]).unwrap();
        assert_eq!(pkt.position, Vec3::new(-7.5, 64.0, 12.25));
        assert_eq!(pkt.tick, 5);
    }

    #[test]
    fn patch_position_too_short() {
        let mut body = vec![0u8; 10];
        assert!(patch_position(&mut body, Vec3::ZERO).is_err());
    }

    #[test]
    fn decode_buffer_too_short() {
        let mut buf = BytesMut::new();
        buf.put_f32_le(0.0);
        assert!(PlayerAuthInput::proto_decode(&mut buf.freeze()).is_err());
    }
}
