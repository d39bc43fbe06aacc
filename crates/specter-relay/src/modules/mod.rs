//! Pipeline of packet-observing modules.
//!
//! The session runs every enabled module against every decoded packet.
//! Modules read shared state and queue packets for injection; only the
//! session writes world/entity state. A module claims interception by
//! returning `true` (or writing the flag explicitly); the last writer
//! wins, and a claim never stops later modules from observing.

pub mod scaffold;
pub mod trace;
pub mod vision;
pub mod warp;

pub use scaffold::Scaffold;
pub use trace::Trace;
pub use vision::Vision;
pub use warp::Warp;

use specter_proto::item_stack::ItemStack;
use specter_proto::packets::{GamePacket, PacketFrame};
use specter_state::entity::EntityRegistry;
use specter_state::mapping::Mapping;
use specter_state::world::WorldMirror;

use crate::config::RelayConfig;
use crate::motion::MotionSpoofer;
use crate::presentation::PresentationSender;
use crate::session::LocalIdentity;

/// Read view of the session plus the side channels a module may use.
pub struct ModuleContext<'a> {
    pub world: &'a WorldMirror,
    pub entities: &'a EntityRegistry,
    pub mapping: Option<&'a Mapping>,
    pub spoofer: &'a MotionSpoofer,
    pub local: Option<&'a LocalIdentity>,
    /// Mirrored contents of the player inventory window.
    pub inventory: &'a [ItemStack],
    /// Hotbar slot the client currently has selected.
    pub held_slot: u8,
    pub config: &'a RelayConfig,
    pub presentation: &'a PresentationSender,
    serverbound: Vec<PacketFrame>,
    clientbound: Vec<PacketFrame>,
    intercept: Option<bool>,
}

impl<'a> ModuleContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        world: &'a WorldMirror,
        entities: &'a EntityRegistry,
        mapping: Option<&'a Mapping>,
        spoofer: &'a MotionSpoofer,
        local: Option<&'a LocalIdentity>,
        inventory: &'a [ItemStack],
        held_slot: u8,
        config: &'a RelayConfig,
        presentation: &'a PresentationSender,
    ) -> Self {
        Self {
            world,
            entities,
            mapping,
            spoofer,
            local,
            inventory,
            held_slot,
            config,
            presentation,
            serverbound: Vec::new(),
            clientbound: Vec::new(),
            intercept: None,
        }
    }

    /// Queue a packet for the server, sent after the current one.
    pub fn inject_serverbound(&mut self, frame: PacketFrame) {
        self.serverbound.push(frame);
    }

    /// Queue a packet for the client.
    pub fn inject_clientbound(&mut self, frame: PacketFrame) {
        self.clientbound.push(frame);
    }

    /// Write the intercept flag. The last write during a pass decides
    /// whether the packet is delivered.
    pub fn set_intercept(&mut self, intercept: bool) {
        self.intercept = Some(intercept);
    }

    pub fn intercepted(&self) -> bool {
        self.intercept.unwrap_or(false)
    }

    pub(crate) fn finish(self) -> (Vec<PacketFrame>, Vec<PacketFrame>, bool) {
        let intercepted = self.intercepted();
        (self.serverbound, self.clientbound, intercepted)
    }
}

/// One stage of the pipeline.
pub trait RelayModule: Send {
    fn name(&self) -> &'static str;

    /// Observe a client→server packet. Returning `true` claims
    /// interception, equivalent to `ctx.set_intercept(true)`.
    fn on_serverbound(&mut self, _packet: &GamePacket, _ctx: &mut ModuleContext<'_>) -> bool {
        false
    }

    /// Observe a server→client packet.
    fn on_clientbound(&mut self, _packet: &GamePacket, _ctx: &mut ModuleContext<'_>) {}

    /// The session ended; drop any transient state.
    fn on_disconnect(&mut self, _reason: &str) {}
}
