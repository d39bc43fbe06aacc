//! Relay session: the per-connection brain of the pipe.
//!
//! Every game packet of both directions passes through here. The session
//! keeps the world mirror and entity registry current, runs the event
//! listeners and module pipeline, and decides for each packet whether it
//! is forwarded, replaced or dropped. It is the only writer of shared
//! state; modules and the spoofer read.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, info, warn};

use specter_proto::batch::{decode_batch, encode_batch, BatchConfig};
use specter_proto::error::ProtoError;
use specter_proto::item_stack::ItemStack;
use specter_proto::math::Vec3;
use specter_proto::packets::{
    id, player_auth_input, Direction, GamePacket, InventoryTransaction, MovePlayer, NetworkSettings,
    PacketFrame, PlayerActionType, PlayerAuthInput, StartGame, Text, TextType, UpdateAbilities,
    UseItemAction, WINDOW_INVENTORY,
};
use specter_state::entity::{EntityKind, EntityRegistry};
use specter_state::mapping::{craft_mapping, Mapping};
use specter_state::world::{WorldMirror, AIR};

use crate::config::RelayConfig;
use crate::modules::{ModuleContext, RelayModule, Scaffold, Trace, Vision, Warp};
use crate::motion::{MotionSpoofer, SpoofStep};
use crate::presentation::PresentationSender;

/// What the transport should do with a packet after the session saw it.
#[derive(Debug)]
pub enum Delivery {
    Forward,
    /// Forward this substitute instead of the original.
    Replace(PacketFrame),
    Drop,
}

/// Identity of the player behind this session, learned from StartGame
/// and from chat traffic.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    pub runtime_id: u64,
    pub unique_id: i64,
    pub gamemode: i32,
    pub position: Vec3,
}

/// A decoded packet on its way to the listeners.
pub struct PacketEvent<'a> {
    pub direction: Direction,
    pub packet: &'a GamePacket,
    cancelled: bool,
}

impl<'a> PacketEvent<'a> {
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

type Listener = Box<dyn FnMut(&mut PacketEvent<'_>) + Send>;

struct ModuleSlot {
    enabled: bool,
    module: Box<dyn RelayModule>,
}

pub struct RelaySession {
    config: RelayConfig,
    world: WorldMirror,
    entities: EntityRegistry,
    spoofer: MotionSpoofer,
    mapping: Option<Mapping>,
    mapping_attempted: bool,
    protocol_version: Option<i32>,
    local: Option<LocalIdentity>,
    local_name: Option<String>,
    inventory: Vec<ItemStack>,
    held_slot: u8,
    modules: Vec<ModuleSlot>,
    listeners: Vec<Listener>,
    presentation: PresentationSender,
    inject_serverbound: Vec<PacketFrame>,
    inject_clientbound: Vec<PacketFrame>,
    serverbound_codec: BatchConfig,
    clientbound_codec: BatchConfig,
    active: bool,
}

impl RelaySession {
    pub fn new(config: RelayConfig, presentation: PresentationSender) -> Self {
        let spoofer = MotionSpoofer::new(config.flight.clone());
        let modules = vec![
            ModuleSlot {
                enabled: config.vision.enabled,
                module: Box::new(Vision::new()) as Box<dyn RelayModule>,
            },
            ModuleSlot {
                enabled: config.scaffold.enabled,
                module: Box::new(Scaffold::new()),
            },
            ModuleSlot {
                enabled: config.warp.enabled,
                module: Box::new(Warp::new()),
            },
            ModuleSlot {
                enabled: config.trace.enabled,
                module: Box::new(Trace::new()),
            },
        ];
        Self {
            config,
            world: WorldMirror::new(),
            entities: EntityRegistry::new(),
            spoofer,
            mapping: None,
            mapping_attempted: false,
            protocol_version: None,
            local: None,
            local_name: None,
            inventory: Vec::new(),
            held_slot: 0,
            modules,
            listeners: Vec::new(),
            presentation,
            inject_serverbound: Vec::new(),
            inject_clientbound: Vec::new(),
            serverbound_codec: BatchConfig::default(),
            clientbound_codec: BatchConfig::default(),
            active: true,
        }
    }

    pub fn world(&self) -> &WorldMirror {
        &self.world
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn spoofer(&self) -> &MotionSpoofer {
        &self.spoofer
    }

    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }

    pub fn local(&self) -> Option<&LocalIdentity> {
        self.local.as_ref()
    }

    pub fn held_slot(&self) -> u8 {
        self.held_slot
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&mut PacketEvent<'_>) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Append a module to the end of the pipeline, enabled.
    pub fn add_module(&mut self, module: Box<dyn RelayModule>) {
        self.modules.push(ModuleSlot {
            enabled: true,
            module,
        });
    }

    /// Toggle a pipeline module by name. Returns false for unknown names.
    pub fn set_module_enabled(&mut self, name: &str, enabled: bool) -> bool {
        for slot in &mut self.modules {
            if slot.module.name() == name {
                slot.enabled = enabled;
                return true;
            }
        }
        false
    }

    pub fn module_enabled(&self, name: &str) -> Option<bool> {
        self.modules
            .iter()
            .find(|s| s.module.name() == name)
            .map(|s| s.enabled)
    }

    // -----------------------------------------------------------------
    // Batch plumbing
    // -----------------------------------------------------------------

    fn codec_for(&self, direction: Direction) -> &BatchConfig {
        match direction {
            Direction::Serverbound => &self.serverbound_codec,
            Direction::Clientbound => &self.clientbound_codec,
        }
    }

    fn drain_injected(&mut self, direction: Direction) -> Vec<PacketFrame> {
        match direction {
            Direction::Serverbound => std::mem::take(&mut self.inject_serverbound),
            Direction::Clientbound => std::mem::take(&mut self.inject_clientbound),
        }
    }

    /// Run a whole batch payload (0xFE marker already stripped) through
    /// the pipeline and re-encode whatever survives plus same-direction
    /// injections. `None` means everything was dropped.
    pub fn process_batch(
        &mut self,
        direction: Direction,
        payload: Bytes,
    ) -> Result<Option<Bytes>, ProtoError> {
        // Snapshot the codec first: a NetworkSettings inside this batch
        // switches compression for later batches, not this one.
        let codec = self.codec_for(direction).clone();
        let mut out: Vec<Bytes> = Vec::new();
        for raw in decode_batch(payload, &codec)? {
            let frame = PacketFrame::parse(raw)?;
            let delivery = match direction {
                Direction::Serverbound => self.handle_serverbound(&frame),
                Direction::Clientbound => self.handle_clientbound(&frame),
            };
            match delivery {
                Delivery::Forward => out.push(frame.raw),
                Delivery::Replace(substitute) => out.push(substitute.raw),
                Delivery::Drop => {}
            }
            out.extend(self.drain_injected(direction).into_iter().map(|f| f.raw));
        }
        if out.is_empty() {
            return Ok(None);
        }
        encode_batch(&out, &codec).map(Some)
    }

    /// Encode queued injections for a direction into a standalone batch.
    pub fn pending_batch(&mut self, direction: Direction) -> Result<Option<Bytes>, ProtoError> {
        let frames = self.drain_injected(direction);
        if frames.is_empty() {
            return Ok(None);
        }
        let raws: Vec<Bytes> = frames.into_iter().map(|f| f.raw).collect();
        encode_batch(&raws, self.codec_for(direction)).map(Some)
    }

    // -----------------------------------------------------------------
    // Client → server
    // -----------------------------------------------------------------

    pub fn handle_serverbound(&mut self, frame: &PacketFrame) -> Delivery {
        let packet = GamePacket::decode(frame);
        let mut replacement: Option<PacketFrame> = None;

        match &packet {
            GamePacket::RequestNetworkSettings(request) => {
                debug!(
                    protocol = request.protocol_version,
                    "client requested network settings"
                );
                self.protocol_version = Some(request.protocol_version);
            }
            GamePacket::Text(text) if text.text_type == TextType::Chat => {
                if self.local_name.is_none() && !text.source_name.is_empty() {
                    info!(name = %text.source_name, "learned local player name");
                    self.local_name = Some(text.source_name.clone());
                }
                if let Some(command) = text.message.strip_prefix('.') {
                    let reply = self.run_command(command);
                    self.inject_clientbound
                        .push(PacketFrame::build(id::TEXT, &Text::raw(reply)));
                    return Delivery::Drop;
                }
            }
            GamePacket::PlayerAuthInput(input) => {
                replacement = self.on_player_input(frame, input);
            }
            GamePacket::MobEquipment(equip) if equip.window_id == 0 => {
                self.held_slot = equip.hotbar_slot;
            }
            GamePacket::InventoryTransaction(InventoryTransaction::UseItem(use_item))
                if use_item.action == UseItemAction::BreakBlock =>
            {
                // Predicted break: mirror goes to air ahead of the
                // server's UpdateBlock confirmation.
                self.world.on_block_update(use_item.block_position, AIR);
            }
            GamePacket::PlayerAction(action)
                if action.action == PlayerActionType::PredictDestroyBlock =>
            {
                self.world.on_block_update(action.block_position, AIR);
            }
            _ => {}
        }

        let cancelled = self.fire_event(Direction::Serverbound, &packet);
        let intercepted = self.run_modules(Direction::Serverbound, &packet);

        if cancelled || intercepted {
            return Delivery::Drop;
        }
        match replacement {
            Some(frame) => Delivery::Replace(frame),
            None => Delivery::Forward,
        }
    }

    fn on_player_input(
        &mut self,
        frame: &PacketFrame,
        input: &PlayerAuthInput,
    ) -> Option<PacketFrame> {
        let local = self.local.clone()?;

        if input.started_flying() && !self.spoofer.is_engaged() {
            info!(runtime_id = local.runtime_id, "motion spoofer engaged");
            self.spoofer.engage(local.runtime_id, input.position);
        }

        if input.stopped_flying() && self.spoofer.controls(local.runtime_id) {
            info!("motion spoofer disengaged, flushing landing");
            let steps = self.spoofer.disengage();
            for step in steps {
                self.push_substitute_move(&local, input, &step);
            }
            return None;
        }

        if !self.spoofer.controls(local.runtime_id) {
            self.entities
                .update_position(local.runtime_id, input.position, input.yaw, input.pitch);
            if let Some(l) = self.local.as_mut() {
                l.position = input.position;
            }
            return None;
        }

        let step = self.spoofer.tick(input)?;
        self.entities
            .update_position(local.runtime_id, step.position, input.yaw, input.pitch);
        if let Some(l) = self.local.as_mut() {
            l.position = step.position;
        }
        self.push_substitute_move(&local, input, &step);

        match patch_input_frame(frame, step.position) {
            Ok(patched) => Some(patched),
            Err(err) => {
                warn!(%err, "input packet too short to patch, forwarding original");
                None
            }
        }
    }

    fn push_substitute_move(
        &mut self,
        local: &LocalIdentity,
        input: &PlayerAuthInput,
        step: &SpoofStep,
    ) {
        self.inject_serverbound.push(PacketFrame::build(
            id::MOVE_PLAYER,
            &MovePlayer::normal(
                local.runtime_id,
                step.position,
                input.pitch,
                input.yaw,
                input.head_yaw,
                step.on_ground,
                input.tick,
            ),
        ));
    }

    // -----------------------------------------------------------------
    // Server → client
    // -----------------------------------------------------------------

    pub fn handle_clientbound(&mut self, frame: &PacketFrame) -> Delivery {
        let packet = GamePacket::decode(frame);
        let mut suppressed = false;

        match &packet {
            GamePacket::NetworkSettings(settings) => self.apply_network_settings(settings),
            GamePacket::StartGame(start) => self.on_start_game(start),
            GamePacket::AddPlayer(add) => {
                // Vanilla servers hand players identical unique and
                // runtime ids; the unique id is not in the parsed head.
                self.entities.register(
                    add.entity_runtime_id,
                    add.entity_runtime_id as i64,
                    EntityKind::Player,
                    Some(add.username.clone()),
                    add.position,
                    add.yaw,
                    add.pitch,
                );
            }
            GamePacket::AddActor(add) => {
                self.entities.register(
                    add.entity_runtime_id,
                    add.entity_unique_id,
                    EntityKind::Entity,
                    Some(add.entity_type.clone()),
                    add.position,
                    add.yaw,
                    add.pitch,
                );
            }
            GamePacket::AddItemEntity(add) => {
                self.entities.register(
                    add.entity_runtime_id,
                    add.entity_unique_id,
                    EntityKind::Item,
                    None,
                    add.position,
                    0.0,
                    0.0,
                );
            }
            GamePacket::RemoveEntity(remove) => {
                self.entities.on_remove(remove.entity_unique_id);
            }
            GamePacket::MoveActorAbsolute(mv) => {
                self.entities
                    .update_position(mv.entity_runtime_id, mv.position, mv.yaw, mv.pitch);
            }
            GamePacket::MovePlayer(mv) => {
                if self.spoofer.controls(mv.runtime_entity_id) {
                    debug!(mode = ?mv.mode, "suppressing authoritative move for controlled entity");
                    suppressed = true;
                } else {
                    self.entities
                        .update_position(mv.runtime_entity_id, mv.position, mv.yaw, mv.pitch);
                    if let Some(l) = self.local.as_mut() {
                        if l.runtime_id == mv.runtime_entity_id {
                            l.position = mv.position;
                        }
                    }
                }
            }
            GamePacket::SetEntityMotion(motion) => {
                if self.spoofer.controls(motion.entity_runtime_id) {
                    suppressed = true;
                }
            }
            GamePacket::LevelChunk(chunk) => {
                self.world.on_chunk_load(chunk.chunk_x, chunk.chunk_z);
            }
            GamePacket::UpdateBlock(update) => {
                let runtime_id = self.normalized_block(update.runtime_id);
                self.world.on_block_update(update.position, runtime_id);
            }
            GamePacket::InventoryContent(content) if content.window_id == WINDOW_INVENTORY => {
                self.inventory = content.items.clone();
            }
            GamePacket::InventorySlot(slot) if slot.window_id == WINDOW_INVENTORY => {
                let index = slot.slot as usize;
                if index >= self.inventory.len() {
                    self.inventory.resize_with(index + 1, ItemStack::empty);
                }
                self.inventory[index] = slot.item.clone();
            }
            _ => {}
        }

        let cancelled = self.fire_event(Direction::Clientbound, &packet);
        let intercepted = self.run_modules(Direction::Clientbound, &packet);

        if suppressed || cancelled || intercepted {
            Delivery::Drop
        } else {
            Delivery::Forward
        }
    }

    fn apply_network_settings(&mut self, settings: &NetworkSettings) {
        match settings.compression() {
            Ok(compression) => {
                info!(
                    ?compression,
                    threshold = settings.compression_threshold,
                    "batch compression negotiated"
                );
                for codec in [&mut self.serverbound_codec, &mut self.clientbound_codec] {
                    codec.compression = compression;
                    codec.compression_threshold = settings.compression_threshold as usize;
                    codec.compression_enabled = true;
                }
            }
            Err(err) => warn!(%err, "unknown compression algorithm, codecs unchanged"),
        }
    }

    fn on_start_game(&mut self, start: &StartGame) {
        self.active = true;

        if !self.mapping_attempted {
            self.mapping_attempted = true;
            match self.protocol_version {
                Some(version) => match craft_mapping(version) {
                    Ok(mapping) => {
                        info!(protocol = version, "mapping tables ready");
                        self.mapping = Some(mapping);
                    }
                    Err(err) => {
                        warn!(%err, "mapping bootstrap failed, dependent modules stay inert");
                    }
                },
                None => warn!("protocol version never observed, mapping unavailable"),
            }
        }

        let identity = LocalIdentity {
            runtime_id: start.entity_runtime_id,
            unique_id: start.entity_unique_id,
            gamemode: start.player_gamemode,
            position: start.player_position,
        };
        info!(
            runtime_id = identity.runtime_id,
            gamemode = identity.gamemode,
            "session spawned at {}",
            identity.position
        );
        self.entities.register(
            identity.runtime_id,
            identity.unique_id,
            EntityKind::LocalPlayer,
            self.local_name.clone(),
            identity.position,
            start.rotation.z,
            start.rotation.x,
        );

        if self.config.flight.grant_flight {
            self.inject_clientbound.push(PacketFrame::build(
                id::UPDATE_ABILITIES,
                &UpdateAbilities::grant_flight(identity.unique_id),
            ));
        }
        self.local = Some(identity);
    }

    /// Store the mirror's canonical air (0) for whatever runtime id the
    /// mapping says is air.
    fn normalized_block(&self, runtime_id: u32) -> u32 {
        match &self.mapping {
            Some(mapping) if mapping.air_runtime_id() == runtime_id => AIR,
            _ => runtime_id,
        }
    }

    // -----------------------------------------------------------------
    // Events, modules, commands
    // -----------------------------------------------------------------

    fn fire_event(&mut self, direction: Direction, packet: &GamePacket) -> bool {
        let mut event = PacketEvent {
            direction,
            packet,
            cancelled: false,
        };
        for listener in &mut self.listeners {
            listener(&mut event);
        }
        event.cancelled
    }

    fn run_modules(&mut self, direction: Direction, packet: &GamePacket) -> bool {
        let mut modules = std::mem::take(&mut self.modules);
        let mut ctx = ModuleContext::new(
            &self.world,
            &self.entities,
            self.mapping.as_ref(),
            &self.spoofer,
            self.local.as_ref(),
            &self.inventory,
            self.held_slot,
            &self.config,
            &self.presentation,
        );
        for slot in modules.iter_mut().filter(|s| s.enabled) {
            match direction {
                Direction::Serverbound => {
                    if slot.module.on_serverbound(packet, &mut ctx) {
                        ctx.set_intercept(true);
                    }
                }
                Direction::Clientbound => slot.module.on_clientbound(packet, &mut ctx),
            }
        }
        let (serverbound, clientbound, intercepted) = ctx.finish();
        self.modules = modules;
        self.inject_serverbound.extend(serverbound);
        self.inject_clientbound.extend(clientbound);
        intercepted
    }

    fn run_command(&mut self, command: &str) -> String {
        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("status"), None) => {
                let states: Vec<String> = self
                    .modules
                    .iter()
                    .map(|s| {
                        format!(
                            "{} {}",
                            s.module.name(),
                            if s.enabled { "on" } else { "off" }
                        )
                    })
                    .collect();
                format!("[specter] {}", states.join(", "))
            }
            (Some(name), Some(state @ ("on" | "off"))) => {
                if self.set_module_enabled(name, state == "on") {
                    format!("[specter] {name} {state}")
                } else {
                    format!("[specter] no module named {name}")
                }
            }
            _ => "[specter] usage: .<module> on|off, .status".to_string(),
        }
    }

    // -----------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------

    /// Tear the session state down. Safe to call more than once; only
    /// the first call after activity does anything.
    pub fn on_disconnect(&mut self, reason: &str) {
        if !self.active {
            return;
        }
        self.active = false;
        info!(reason, "session disconnected");

        self.world.clear();
        self.entities.clear();
        self.spoofer.reset();
        self.mapping = None;
        self.mapping_attempted = false;
        self.protocol_version = None;
        self.local = None;
        self.local_name = None;
        self.inventory.clear();
        self.held_slot = 0;
        self.inject_serverbound.clear();
        self.inject_clientbound.clear();
        self.serverbound_codec = BatchConfig::default();
        self.clientbound_codec = BatchConfig::default();

        for slot in &mut self.modules {
            slot.module.on_disconnect(reason);
        }
    }
}

/// Rebuild an input frame with the position bytes overwritten, keeping
/// the original header and every unparsed trailing field.
fn patch_input_frame(frame: &PacketFrame, position: Vec3) -> Result<PacketFrame, ProtoError> {
    let header_len = frame.raw.len() - frame.body.len();
    let mut body = frame.body.to_vec();
    player_auth_input::patch_position(&mut body, position)?;

    let mut raw = BytesMut::with_capacity(frame.raw.len());
    raw.put_slice(&frame.raw[..header_len]);
    raw.put_slice(&body);
    let raw = raw.freeze();
    let body = raw.slice(header_len..);
    Ok(PacketFrame {
        id: frame.id,
        body,
        raw,
    })
}
