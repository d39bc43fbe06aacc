//! Overlay feed: camera pose plus entity snapshots on movement traffic.

use specter_proto::packets::GamePacket;

use crate::modules::{ModuleContext, RelayModule};
use crate::presentation::{CameraPose, PresentationFrame};

#[derive(Debug, Default)]
pub struct Vision;

impl Vision {
    pub fn new() -> Self {
        Self
    }

    fn post(&self, ctx: &ModuleContext<'_>, pitch: f32, yaw: f32) {
        let Some(local) = ctx.local else {
            return;
        };
        let position = if ctx.spoofer.controls(local.runtime_id) {
            ctx.spoofer.position()
        } else {
            local.position
        };
        ctx.presentation.post(PresentationFrame {
            camera: CameraPose {
                position,
                pitch,
                yaw,
                fov: ctx.config.vision.fov,
            },
            entities: ctx.entities.snapshot_for_display(),
        });
    }
}

impl RelayModule for Vision {
    fn name(&self) -> &'static str {
        "vision"
    }

    fn on_serverbound(&mut self, packet: &GamePacket, ctx: &mut ModuleContext<'_>) -> bool {
        // One input packet per tick makes a natural frame clock.
        if let GamePacket::PlayerAuthInput(input) = packet {
            self.post(ctx, input.pitch, input.yaw);
        }
        false
    }

    fn on_clientbound(&mut self, packet: &GamePacket, ctx: &mut ModuleContext<'_>) {
        match packet {
            GamePacket::MovePlayer(_) | GamePacket::MoveActorAbsolute(_) => {
                let (pitch, yaw) = ctx
                    .local
                    .and_then(|l| ctx.entities.get(l.runtime_id))
                    .map(|e| (e.pitch, e.yaw))
                    .unwrap_or((0.0, 0.0));
                self.post(ctx, pitch, yaw);
            }
            _ => {}
        }
    }
}
