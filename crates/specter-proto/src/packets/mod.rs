//! Game packet definitions and batch-level framing.
//!
//! Only the packets the relay acts on get a typed codec; everything else
//! flows through as an opaque [`PacketFrame`].

pub mod add_actor;
pub mod add_item_entity;
pub mod add_player;
pub mod inventory_content;
pub mod inventory_slot;
pub mod inventory_transaction;
pub mod level_chunk;
pub mod mob_equipment;
pub mod move_actor_absolute;
pub mod move_player;
pub mod network_settings;
pub mod player_action;
pub mod player_auth_input;
pub mod remove_entity;
pub mod request_network_settings;
pub mod set_entity_motion;
pub mod start_game;
pub mod text;
pub mod update_abilities;
pub mod update_block;

pub use add_actor::AddActor;
pub use add_item_entity::AddItemEntity;
pub use add_player::AddPlayer;
pub use inventory_content::{InventoryContent, WINDOW_INVENTORY};
pub use inventory_slot::InventorySlot;
pub use inventory_transaction::{
    InventoryTransaction, UseItemAction, UseItemData, UseItemOnEntityData,
};
pub use level_chunk::LevelChunk;
pub use mob_equipment::MobEquipment;
pub use move_actor_absolute::MoveActorAbsolute;
pub use move_player::{MoveMode, MovePlayer};
pub use network_settings::NetworkSettings;
pub use player_action::{PlayerAction, PlayerActionType};
pub use player_auth_input::{input_flags, PlayerAuthInput};
pub use remove_entity::RemoveEntity;
pub use request_network_settings::RequestNetworkSettings;
pub use set_entity_motion::SetEntityMotion;
pub use start_game::StartGame;
pub use text::{Text, TextType};
pub use update_abilities::UpdateAbilities;
pub use update_block::{UpdateBlock, UPDATE_BLOCK_FLAGS_DEFAULT};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::varint::VarUInt32;

/// Game packet IDs.
pub mod id {
    pub const TEXT: u32 = 0x09;
    pub const START_GAME: u32 = 0x0B;
    pub const ADD_PLAYER: u32 = 0x0C;
    pub const ADD_ACTOR: u32 = 0x0D;
    pub const REMOVE_ENTITY: u32 = 0x0E;
    pub const ADD_ITEM_ENTITY: u32 = 0x0F;
    pub const MOVE_ACTOR_ABSOLUTE: u32 = 0x10;
    pub const SET_ENTITY_MOTION: u32 = 0x12;
    pub const MOVE_PLAYER: u32 = 0x13;
    pub const UPDATE_BLOCK: u32 = 0x15;
    pub const INVENTORY_TRANSACTION: u32 = 0x1E;
    pub const MOB_EQUIPMENT: u32 = 0x1F;
    pub const PLAYER_ACTION: u32 = 0x24;
    pub const INVENTORY_CONTENT: u32 = 0x31;
    pub const INVENTORY_SLOT: u32 = 0x32;
    pub const LEVEL_CHUNK: u32 = 0x3A;
    pub const NETWORK_SETTINGS: u32 = 0x8F;
    pub const PLAYER_AUTH_INPUT: u32 = 0x90;
    pub const UPDATE_ABILITIES: u32 = 0xBB;
    pub const REQUEST_NETWORK_SETTINGS: u32 = 0xC1;
}

/// Low 10 bits of the game packet header hold the packet id; the rest are
/// sub-client sender/recipient fields.
const PACKET_ID_MASK: u32 = 0x3FF;

/// Which peer a packet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client → Server.
    Serverbound,
    /// Server → Client.
    Clientbound,
}

/// One sub-packet of a batch, split but not decoded.
///
/// `raw` keeps the untouched wire bytes (header included) so an
/// uninterested relay stage can forward without re-encoding.
#[derive(Debug, Clone)]
pub struct PacketFrame {
    pub id: u32,
    pub body: Bytes,
    pub raw: Bytes,
}

impl PacketFrame {
    /// Split the header off a raw sub-packet.
    pub fn parse(raw: Bytes) -> Result<Self, ProtoError> {
        let mut cursor = &raw[..];
        let header = VarUInt32::proto_decode(&mut cursor)?.0;
        let body = raw.slice(raw.len() - cursor.remaining()..);
        Ok(Self {
            id: header & PACKET_ID_MASK,
            body,
            raw,
        })
    }

    /// Build a frame for an injected packet.
    pub fn build(id: u32, packet: &impl ProtoEncode) -> Self {
        let mut buf = BytesMut::new();
        VarUInt32(id).proto_encode(&mut buf);
        packet.proto_encode(&mut buf);
        let raw = buf.freeze();
        // Header is canonical, so re-parse cannot fail.
        let mut cursor = &raw[..];
        let _ = VarUInt32::proto_decode(&mut cursor);
        let body = raw.slice(raw.len() - cursor.remaining()..);
        Self { id, body, raw }
    }
}

/// A decoded game packet, or `Unknown` for everything the relay does not
/// model. Malformed bodies of known ids also degrade to `Unknown` so a
/// protocol drift never stalls the pipe.
#[derive(Debug, Clone)]
pub enum GamePacket {
    RequestNetworkSettings(RequestNetworkSettings),
    NetworkSettings(NetworkSettings),
    Text(Text),
    StartGame(StartGame),
    AddPlayer(AddPlayer),
    AddActor(AddActor),
    AddItemEntity(AddItemEntity),
    RemoveEntity(RemoveEntity),
    MoveActorAbsolute(MoveActorAbsolute),
    SetEntityMotion(SetEntityMotion),
    MovePlayer(MovePlayer),
    UpdateBlock(UpdateBlock),
    InventoryTransaction(InventoryTransaction),
    MobEquipment(MobEquipment),
    PlayerAction(PlayerAction),
    InventoryContent(InventoryContent),
    InventorySlot(InventorySlot),
    LevelChunk(LevelChunk),
    PlayerAuthInput(PlayerAuthInput),
    Unknown { id: u32 },
}

impl GamePacket {
    /// Decode the frames the relay cares about; pass the rest through.
    pub fn decode(frame: &PacketFrame) -> Self {
        let mut body = frame.body.clone();
        let result = match frame.id {
            id::REQUEST_NETWORK_SETTINGS => {
                RequestNetworkSettings::proto_decode(&mut body).map(Self::RequestNetworkSettings)
            }
            id::NETWORK_SETTINGS => NetworkSettings::proto_decode(&mut body).map(Self::NetworkSettings),
            id::TEXT => Text::proto_decode(&mut body).map(Self::Text),
            id::START_GAME => StartGame::proto_decode(&mut body).map(Self::StartGame),
            id::ADD_PLAYER => AddPlayer::proto_decode(&mut body).map(Self::AddPlayer),
            id::ADD_ACTOR => AddActor::proto_decode(&mut body).map(Self::AddActor),
            id::ADD_ITEM_ENTITY => AddItemEntity::proto_decode(&mut body).map(Self::AddItemEntity),
            id::REMOVE_ENTITY => RemoveEntity::proto_decode(&mut body).map(Self::RemoveEntity),
            id::MOVE_ACTOR_ABSOLUTE => {
                MoveActorAbsolute::proto_decode(&mut body).map(Self::MoveActorAbsolute)
            }
            id::SET_ENTITY_MOTION => {
                SetEntityMotion::proto_decode(&mut body).map(Self::SetEntityMotion)
            }
            id::MOVE_PLAYER => MovePlayer::proto_decode(&mut body).map(Self::MovePlayer),
            id::UPDATE_BLOCK => UpdateBlock::proto_decode(&mut body).map(Self::UpdateBlock),
            id::INVENTORY_TRANSACTION => {
                InventoryTransaction::proto_decode(&mut body).map(Self::InventoryTransaction)
            }
            id::MOB_EQUIPMENT => MobEquipment::proto_decode(&mut body).map(Self::MobEquipment),
            id::PLAYER_ACTION => PlayerAction::proto_decode(&mut body).map(Self::PlayerAction),
            id::INVENTORY_CONTENT => {
                InventoryContent::proto_decode(&mut body).map(Self::InventoryContent)
            }
            id::INVENTORY_SLOT => InventorySlot::proto_decode(&mut body).map(Self::InventorySlot),
            id::LEVEL_CHUNK => LevelChunk::proto_decode(&mut body).map(Self::LevelChunk),
            id::PLAYER_AUTH_INPUT => {
                PlayerAuthInput::proto_decode(&mut body).map(Self::PlayerAuthInput)
            }
            other => return Self::Unknown { id: other },
        };

        match result {
            Ok(packet) => packet,
            Err(err) => {
                debug!(id = frame.id, %err, "malformed packet body, forwarding opaque");
                Self::Unknown { id: frame.id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn frame_parse_masks_subclient_bits() {
        let mut buf = BytesMut::new();
        // id 0x13 with sender sub-client 1 (bit 10).
        VarUInt32(0x13 | (1 << 10)).proto_encode(&mut buf);
        buf.put_slice(&[1, 2, 3]);
        let frame = PacketFrame::parse(buf.freeze()).unwrap();
        assert_eq!(frame.id, 0x13);
        assert_eq!(&frame.body[..], &[1, 2, 3]);
    }

    #[test]
    fn frame_build_and_decode() {
        let pkt = MovePlayer::normal(7, Vec3::new(1.0, 2.0, 3.0), 0.0, 0.0, 0.0, true, 10);
        let frame = PacketFrame::build(id::MOVE_PLAYER, &pkt);
        assert_eq!(frame.id, id::MOVE_PLAYER);
        let decoded = GamePacket::decode(&frame);
        let GamePacket::MovePlayer(mp) = decoded else {
            panic!("expected MovePlayer");
        };
        assert_eq!(mp.runtime_entity_id, 7);
        assert_eq!(mp.tick, 10);
    }

    #[test]
    fn unknown_id_passes_through() {
        let mut buf = BytesMut::new();
        VarUInt32(0x7A).proto_encode(&mut buf);
        buf.put_slice(&[0xFF; 4]);
        let frame = PacketFrame::parse(buf.freeze()).unwrap();
        let decoded = GamePacket::decode(&frame);
        assert!(matches!(decoded, GamePacket::Unknown { id: 0x7A }));
    }

    #[test]
    fn malformed_known_body_degrades_to_unknown() {
        let mut buf = BytesMut::new();
        VarUInt32(id::MOVE_PLAYER).proto_encode(&mut buf);
        buf.put_slice(&[0x01]); // far too short for MovePlayer
        let frame = PacketFrame::parse(buf.freeze()).unwrap();
        let decoded = GamePacket::decode(&frame);
        assert!(matches!(
            decoded,
            GamePacket::Unknown {
                id: id::MOVE_PLAYER
            }
        ));
    }

    #[test]
    fn frame_raw_preserves_wire_bytes() {
        let pkt = RemoveEntity {
            entity_unique_id: 3,
        };
        let frame = PacketFrame::build(id::REMOVE_ENTITY, &pkt);
        let reparsed = PacketFrame::parse(frame.raw.clone()).unwrap();
        assert_eq!(reparsed.id, id::REMOVE_ENTITY);
        assert_eq!(reparsed.body, frame.body);
    }
}
