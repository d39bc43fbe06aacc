//! Trace-level packet logging for protocol debugging.

use tracing::trace;

use specter_proto::packets::GamePacket;

use crate::modules::{ModuleContext, RelayModule};

#[derive(Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl RelayModule for Trace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn on_serverbound(&mut self, packet: &GamePacket, _ctx: &mut ModuleContext<'_>) -> bool {
        trace!(direction = "serverbound", ?packet);
        false
    }

    fn on_clientbound(&mut self, packet: &GamePacket, _ctx: &mut ModuleContext<'_>) {
        trace!(direction = "clientbound", ?packet);
    }
}
