//! InventoryTransaction (0x1E) — Client → Server.
//!
//! Block and item interactions. The relay decodes UseItem to predict block
//! placement and breaking, and encodes synthetic UseItem transactions when
//! it places blocks on the player's behalf.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::math::{BlockPos, Vec3};
use crate::varint::{VarInt, VarUInt32, VarUInt64};

/// Action type within a UseItem transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseItemAction {
    /// Click on a block face (places when the held item is placeable).
    ClickBlock = 0,
    /// Right-click in the air.
    ClickAir = 1,
    /// Break a block.
    BreakBlock = 2,
}

impl UseItemAction {
    fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::ClickBlock),
            1 => Some(Self::ClickAir),
            2 => Some(Self::BreakBlock),
            _ => None,
        }
    }
}

/// UseItem transaction (type 2).
#[derive(Debug, Clone)]
pub struct UseItemData {
    pub action: UseItemAction,
    pub block_position: BlockPos,
    pub face: i32,
    pub hotbar_slot: i32,
    pub held_item: ItemStack,
    pub player_position: Vec3,
    pub click_position: Vec3,
    /// Runtime id of the clicked (or broken) block.
    pub block_runtime_id: u32,
}

impl UseItemData {
    /// A synthetic block placement, clicking the top face of `against`.
    pub fn place_on_top(
        against: BlockPos,
        held_item: ItemStack,
        hotbar_slot: i32,
        player_position: Vec3,
        clicked_runtime_id: u32,
    ) -> Self {
        Self {
            action: UseItemAction::ClickBlock,
            block_position: against,
            face: 1, // up
            hotbar_slot,
            held_item,
            player_position,
            click_position: Vec3::new(0.5, 1.0, 0.5),
            block_runtime_id: clicked_runtime_id,
        }
    }
}

/// UseItemOnEntity transaction (type 3).
#[derive(Debug, Clone)]
pub struct UseItemOnEntityData {
    pub entity_runtime_id: u64,
    /// 0 = interact, 1 = attack.
    pub action: u32,
    pub hotbar_slot: i32,
    pub player_position: Vec3,
    pub click_position: Vec3,
}

/// Parsed InventoryTransaction.
#[derive(Debug, Clone)]
pub enum InventoryTransaction {
    UseItem(UseItemData),
    UseItemOnEntity(UseItemOnEntityData),
    /// Any transaction type the relay does not act on.
    Other,
}

/// Skip a NetworkInventoryAction.
fn skip_inventory_action(buf: &mut impl Buf) -> Result<(), ProtoError> {
    let source_type = VarUInt32::proto_decode(buf)?.0;
    match source_type {
        0 => {
            let _ = VarInt::proto_decode(buf)?; // WindowID
        }
        2 => {
            let _ = VarUInt32::proto_decode(buf)?; // WorldInteraction flags
        }
        _ if source_type >= 100 => {
            let _ = VarInt::proto_decode(buf)?; // crafting ContainerID
        }
        _ => {}
    }
    let _ = VarUInt32::proto_decode(buf)?; // Slot
    let _ = ItemStack::proto_decode(buf)?; // OldItem
    let _ = ItemStack::proto_decode(buf)?; // NewItem
    Ok(())
}

impl ProtoDecode for InventoryTransaction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        // LegacyRequestID != 0 means legacy slot info follows.
        let legacy_request_id = VarInt::proto_decode(buf)?.0;
        if legacy_request_id != 0 {
            let legacy_count = VarUInt32::proto_decode(buf)?.0;
            for _ in 0..legacy_count {
                ensure_remaining(buf, 1)?;
                buf.advance(1); // ContainerID
                let slot_count = VarUInt32::proto_decode(buf)?.0 as usize;
                ensure_remaining(buf, slot_count)?;
                buf.advance(slot_count); // changed slot indices
            }
        }

        let transaction_type = VarUInt32::proto_decode(buf)?.0;

        let action_count = VarUInt32::proto_decode(buf)?.0;
        for _ in 0..action_count {
            skip_inventory_action(buf)?;
        }

        match transaction_type {
            2 => {
                let action_raw = VarUInt32::proto_decode(buf)?.0;
                let block_position = BlockPos::proto_decode(buf)?;
                let face = VarInt::proto_decode(buf)?.0;
                let hotbar_slot = VarInt::proto_decode(buf)?.0;
                let held_item = ItemStack::proto_decode(buf)?;
                let player_position = Vec3::proto_decode(buf)?;
                let click_position = Vec3::proto_decode(buf)?;
                let block_runtime_id = VarUInt32::proto_decode(buf)?.0;

                match UseItemAction::from_u32(action_raw) {
                    Some(action) => Ok(Self::UseItem(UseItemData {
                        action,
                        block_position,
                        face,
                        hotbar_slot,
                        held_item,
                        player_position,
                        click_position,
                        block_runtime_id,
                    })),
                    None => Ok(Self::Other),
                }
            }
            3 => {
                let entity_runtime_id = VarUInt64::proto_decode(buf)?.0;
                let action = VarUInt32::proto_decode(buf)?.0;
                let hotbar_slot = VarInt::proto_decode(buf)?.0;
                let _held = ItemStack::proto_decode(buf)?;
                let player_position = Vec3::proto_decode(buf)?;
                let click_position = Vec3::proto_decode(buf)?;
                Ok(Self::UseItemOnEntity(UseItemOnEntityData {
                    entity_runtime_id,
                    action,
                    hotbar_slot,
                    player_position,
                    click_position,
                }))
            }
            _ => Ok(Self::Other),
        }
    }
}

/// Encodes a full UseItem transaction with an empty actions array, the
/// shape a vanilla client produces for a simple block placement.
impl ProtoEncode for UseItemData {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(0).proto_encode(buf); // LegacyRequestID
        VarUInt32(2).proto_encode(buf); // TransactionType = UseItem
        VarUInt32(0).proto_encode(buf); // no actions
        VarUInt32(self.action as u32).proto_encode(buf);
        self.block_position.proto_encode(buf);
        VarInt(self.face).proto_encode(buf);
        VarInt(self.hotbar_slot).proto_encode(buf);
        self.held_item.proto_encode(buf);
        self.player_position.proto_encode(buf);
        self.click_position.proto_encode(buf);
        VarUInt32(self.block_runtime_id).proto_encode(buf);
    }
}
