//! UpdateAbilities (0xBB) — Server → Client.
//!
//! Ability flags for a player. The relay injects one to grant mayfly so a
//! vanilla client can raise the fly toggle that engages the motion spoofer.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::varint::VarUInt32;

/// Every ability bit the base layer may set.
const ABILITIES_ALLOWED: u32 = 0x0001_BFFF;
/// mayfly + flying + instabuild alongside the basic build/mine bits.
const ABILITIES_FLIGHT: u32 = 0x0000_0477;
/// build + mine only.
const ABILITIES_BASIC: u32 = 0x0000_0003;

#[derive(Debug, Clone)]
pub struct UpdateAbilities {
    pub command_permission_level: u8,
    pub permission_level: u8,
    pub entity_unique_id: i64,
    /// Whether the values bitmask includes the flight abilities.
    pub allow_flight: bool,
}

impl UpdateAbilities {
    /// Grant flight to the given player.
    pub fn grant_flight(entity_unique_id: i64) -> Self {
        Self {
            command_permission_level: 0,
            permission_level: 1,
            entity_unique_id,
            allow_flight: true,
        }
    }
}

impl ProtoEncode for UpdateAbilities {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.command_permission_level);
        buf.put_u8(self.permission_level);
        buf.put_i64_le(self.entity_unique_id);
        // One Base (type 0) ability layer.
        VarUInt32(1).proto_encode(buf);
        buf.put_u16_le(0);
        buf.put_u32_le(ABILITIES_ALLOWED);
        buf.put_u32_le(if self.allow_flight {
            ABILITIES_FLIGHT
        } else {
            ABILITIES_BASIC
        });
        buf.put_f32_le(0.05); // fly speed
        buf.put_f32_le(0.1); // walk speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn grant_sets_flight_bits() {
        let pkt = UpdateAbilities::grant_flight(1);
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf.len(), 29);
        let values = u32::from_le_bytes([buf[17], buf[18], buf[19], buf[20]]);
        assert_eq!(values, ABILITIES_FLIGHT);
    }

    #[test]
    fn without_flight_only_basic_bits() {
        let pkt = UpdateAbilities {
            allow_flight: false,
            ..UpdateAbilities::grant_flight(1)
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let values = u32::from_le_bytes([buf[17], buf[18], buf[19], buf[20]]);
        assert_eq!(values, ABILITIES_BASIC);
    }
}
