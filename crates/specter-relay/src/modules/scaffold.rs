//! Auto-placement under the player while airborne.
//!
//! Checks the block under the feet each input tick; when the mirror reads
//! air there, injects a hotbar switch, a use-item transaction placing a
//! block from the inventory, and a switch back to the client's own
//! selection. Unseen terrain reads as air by the mirror
//! contract, so the module simply places into it. Without a mapping no
//! item can be classified placeable and the module stays inert.

use specter_proto::item_stack::ItemStack;
use specter_proto::math::{BlockPos, Vec3};
use specter_proto::packets::{id, GamePacket, MobEquipment, PacketFrame, UseItemData};
use specter_state::world::AIR;

use crate::modules::{ModuleContext, RelayModule};

/// Vertical offset from the reported position down to the feet.
const EYE_HEIGHT: f32 = 1.62;

#[derive(Debug, Default)]
pub struct Scaffold {
    last_placed: Option<BlockPos>,
}

impl Scaffold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelayModule for Scaffold {
    fn name(&self) -> &'static str {
        "scaffold"
    }

    fn on_serverbound(&mut self, packet: &GamePacket, ctx: &mut ModuleContext<'_>) -> bool {
        let GamePacket::PlayerAuthInput(input) = packet else {
            return false;
        };
        let Some(mapping) = ctx.mapping else {
            return false;
        };
        let Some(local) = ctx.local else {
            return false;
        };

        let position = if ctx.spoofer.controls(local.runtime_id) {
            ctx.spoofer.position()
        } else {
            input.position
        };
        let feet = position + Vec3::new(0.0, -EYE_HEIGHT, 0.0);
        let support = BlockPos::from_vec3(&feet).below();

        if ctx.world.block_at(&support) != AIR {
            self.last_placed = None;
            return false;
        }
        if self.last_placed == Some(support) {
            return false;
        }

        let Some(slot) = ctx
            .inventory
            .iter()
            .take(9)
            .position(|item| !item.is_empty() && mapping.is_placeable(item.block_runtime_id as u32))
        else {
            return false;
        };
        let item = ctx.inventory[slot].clone();

        ctx.inject_serverbound(PacketFrame::build(
            id::MOB_EQUIPMENT,
            &MobEquipment::hotbar_switch(local.runtime_id, item.clone(), slot as u8),
        ));
        let against = support.below();
        let place = UseItemData::place_on_top(
            against,
            item,
            slot as i32,
            position,
            ctx.world.block_at(&against),
        );
        ctx.inject_serverbound(PacketFrame::build(id::INVENTORY_TRANSACTION, &place));

        // Put the client's own selection back behind the injected switch.
        if ctx.held_slot != slot as u8 {
            let held = ctx
                .inventory
                .get(ctx.held_slot as usize)
                .cloned()
                .unwrap_or_else(ItemStack::empty);
            ctx.inject_serverbound(PacketFrame::build(
                id::MOB_EQUIPMENT,
                &MobEquipment::hotbar_switch(local.runtime_id, held, ctx.held_slot),
            ));
        }

        self.last_placed = Some(support);
        false
    }

    fn on_disconnect(&mut self, _reason: &str) {
        self.last_placed = None;
    }
}
