//! Teleport-on-interact: step the player toward an entity it interacts
//! with, one bounded movement packet per step so the server accepts the
//! displacement as ordinary travel.

use specter_proto::packets::{id, GamePacket, InventoryTransaction, MovePlayer, PacketFrame};

use crate::modules::{ModuleContext, RelayModule};

#[derive(Debug, Default)]
pub struct Warp;

impl Warp {
    pub fn new() -> Self {
        Self
    }
}

impl RelayModule for Warp {
    fn name(&self) -> &'static str {
        "warp"
    }

    fn on_serverbound(&mut self, packet: &GamePacket, ctx: &mut ModuleContext<'_>) -> bool {
        let GamePacket::InventoryTransaction(InventoryTransaction::UseItemOnEntity(data)) = packet
        else {
            return false;
        };
        let Some(local) = ctx.local else {
            return false;
        };
        let Some(target) = ctx.entities.last_known_position(data.entity_runtime_id) else {
            return false;
        };

        let cfg = &ctx.config.warp;
        let from = data.player_position;
        let delta = target - from;
        let distance = from.distance(&target);
        if distance <= cfg.step_blocks || distance > cfg.max_distance {
            return false;
        }

        let (pitch, yaw, head_yaw) = ctx
            .entities
            .get(local.runtime_id)
            .map(|e| (e.pitch, e.yaw, e.yaw))
            .unwrap_or((0.0, 0.0, 0.0));

        let steps = (distance / cfg.step_blocks).ceil() as u32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let position = from + delta * t;
            ctx.inject_serverbound(PacketFrame::build(
                id::MOVE_PLAYER,
                &MovePlayer::normal(local.runtime_id, position, pitch, yaw, head_yaw, false, 0),
            ));
        }
        false
    }
}
