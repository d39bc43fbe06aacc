//! Whole-session tests: synthetic packets of both directions driven
//! through the relay pipeline.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::{BufMut, BytesMut};

use specter_proto::batch::{decode_batch, encode_batch, BatchConfig};
use specter_proto::codec::{write_string, ProtoEncode};
use specter_proto::item_stack::ItemStack;
use specter_proto::math::{BlockPos, Vec2, Vec3};
use specter_proto::packets::{
    id, input_flags, Direction, GamePacket, InventoryContent, InventoryTransaction, MobEquipment,
    MoveMode, MovePlayer, NetworkSettings, PacketFrame, RemoveEntity, SetEntityMotion, Text,
    TextType, UpdateBlock, UseItemAction, WINDOW_INVENTORY,
};
use specter_proto::varint::{VarInt, VarLong, VarUInt32, VarUInt64};
use specter_relay::config::RelayConfig;
use specter_relay::modules::{ModuleContext, RelayModule};
use specter_relay::presentation::{self, PresentationReceiver};
use specter_relay::session::{Delivery, RelaySession};
use specter_relay::transport;

const SPAWN: Vec3 = Vec3 {
    x: 0.5,
    y: 66.62,
    z: 0.5,
};

fn frame(packet_id: u32, body: &[u8]) -> PacketFrame {
    let mut raw = BytesMut::new();
    VarUInt32(packet_id).proto_encode(&mut raw);
    raw.put_slice(body);
    PacketFrame::parse(raw.freeze()).unwrap()
}

fn request_settings_frame(protocol: i32) -> PacketFrame {
    let mut body = BytesMut::new();
    body.put_i32(protocol);
    frame(id::REQUEST_NETWORK_SETTINGS, &body)
}

fn start_game_frame(runtime_id: u64, position: Vec3) -> PacketFrame {
    let mut body = BytesMut::new();
    VarLong(runtime_id as i64).proto_encode(&mut body);
    VarUInt64(runtime_id).proto_encode(&mut body);
    VarInt(0).proto_encode(&mut body); // gamemode
    position.proto_encode(&mut body);
    Vec2::new(0.0, 0.0).proto_encode(&mut body);
    body.put_slice(&[0xAB; 64]); // unparsed world config tail
    frame(id::START_GAME, &body)
}

fn add_player_frame(name: &str, runtime_id: u64, position: Vec3) -> PacketFrame {
    let mut body = BytesMut::new();
    body.put_slice(&[0u8; 16]); // uuid
    write_string(&mut body, name);
    VarUInt64(runtime_id).proto_encode(&mut body);
    write_string(&mut body, "");
    position.proto_encode(&mut body);
    Vec3::ZERO.proto_encode(&mut body);
    body.put_f32_le(0.0);
    body.put_f32_le(0.0);
    body.put_f32_le(0.0);
    ItemStack::empty().proto_encode(&mut body);
    VarInt(0).proto_encode(&mut body);
    frame(id::ADD_PLAYER, &body)
}

fn input_frame(position: Vec3, move_vector: Vec2, yaw: f32, flags: u64, tick: u64) -> PacketFrame {
    let mut body = BytesMut::new();
    body.put_f32_le(0.0); // pitch
    body.put_f32_le(yaw);
    position.proto_encode(&mut body);
    move_vector.proto_encode(&mut body);
    body.put_f32_le(yaw); // head yaw
    VarUInt64(flags).proto_encode(&mut body);
    VarUInt32(0).proto_encode(&mut body); // input mode
    VarUInt32(0).proto_encode(&mut body); // play mode
    VarUInt32(0).proto_encode(&mut body); // interaction model
    VarUInt64(tick).proto_encode(&mut body);
    Vec3::ZERO.proto_encode(&mut body);
    frame(id::PLAYER_AUTH_INPUT, &body)
}

fn chat_frame(source: &str, message: &str) -> PacketFrame {
    let text = Text {
        text_type: TextType::Chat,
        needs_translation: false,
        source_name: source.to_string(),
        message: message.to_string(),
        parameters: Vec::new(),
        xuid: String::new(),
        platform_chat_id: String::new(),
        filtered_message: String::new(),
    };
    PacketFrame::build(id::TEXT, &text)
}

fn session_with(config: RelayConfig) -> (RelaySession, PresentationReceiver) {
    let (tx, rx) = presentation::channel();
    (RelaySession::new(config, tx), rx)
}

/// Negotiate protocol 924 and spawn the local player as runtime id 1.
fn begin_session(session: &mut RelaySession) {
    assert!(matches!(
        session.handle_serverbound(&request_settings_frame(924)),
        Delivery::Forward
    ));
    assert!(matches!(
        session.handle_clientbound(&start_game_frame(1, SPAWN)),
        Delivery::Forward
    ));
    // Flush the injected ability grant.
    let _ = session.pending_batch(Direction::Clientbound).unwrap();
}

fn drain(session: &mut RelaySession, direction: Direction) -> Vec<GamePacket> {
    match session.pending_batch(direction).unwrap() {
        Some(payload) => decode_batch(payload, &BatchConfig::default())
            .unwrap()
            .into_iter()
            .map(|raw| GamePacket::decode(&PacketFrame::parse(raw).unwrap()))
            .collect(),
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------
// Ghosts
// ---------------------------------------------------------------------

#[test]
fn vanished_player_leaves_a_ghost_until_reappearing() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    begin_session(&mut session);

    let pos = Vec3::new(30.0, 64.0, 30.0);
    session.handle_clientbound(&add_player_frame("Steve", 7, pos));
    assert!(session.entities().is_live(7));

    session.handle_clientbound(&PacketFrame::build(
        id::REMOVE_ENTITY,
        &RemoveEntity { entity_unique_id: 7 },
    ));
    assert!(!session.entities().is_live(7));

    let snapshot = session.entities().snapshot_for_display();
    let ghost = snapshot.iter().find(|s| s.runtime_id == 7).unwrap();
    assert!(ghost.vanished);
    assert_eq!(ghost.name, "Steve");
    assert_eq!(ghost.position, pos);

    session.handle_clientbound(&add_player_frame("Steve", 7, pos));
    let snapshot = session.entities().snapshot_for_display();
    let rows: Vec<_> = snapshot.iter().filter(|s| s.runtime_id == 7).collect();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].vanished);
}

// ---------------------------------------------------------------------
// Flight
// ---------------------------------------------------------------------

#[test]
fn flight_toggle_substitutes_and_suppresses_movement() {
    let mut config = RelayConfig::default();
    config.flight.ground_jitter = 0.0;
    let (mut session, _rx) = session_with(config);
    begin_session(&mut session);

    // The client raises the fly toggle.
    let delivery = session.handle_serverbound(&input_frame(
        SPAWN,
        Vec2::ZERO,
        0.0,
        input_flags::START_FLYING,
        1,
    ));
    assert!(session.spoofer().is_engaged());
    assert!(matches!(delivery, Delivery::Replace(_)));
    let injected = drain(&mut session, Direction::Serverbound);
    assert!(injected
        .iter()
        .any(|p| matches!(p, GamePacket::MovePlayer(mv) if mv.runtime_entity_id == 1)));

    // Forward input accumulates spoofed displacement.
    for tick in 2..20 {
        let delivery =
            session.handle_serverbound(&input_frame(SPAWN, Vec2::new(0.0, 1.0), 0.0, 0, tick));
        let Delivery::Replace(substitute) = delivery else {
            panic!("expected a patched input");
        };
        let GamePacket::PlayerAuthInput(patched) = GamePacket::decode(&substitute) else {
            panic!("substitute should still be an input packet");
        };
        assert_eq!(patched.position, session.spoofer().position());
        drain(&mut session, Direction::Serverbound);
    }
    assert!(session.spoofer().position().z > SPAWN.z + 1.0);

    // Authoritative corrections for the controlled entity are dropped...
    let correction = MovePlayer {
        mode: MoveMode::Reset,
        ..MovePlayer::normal(1, SPAWN, 0.0, 0.0, 0.0, true, 0)
    };
    assert!(matches!(
        session.handle_clientbound(&PacketFrame::build(id::MOVE_PLAYER, &correction)),
        Delivery::Drop
    ));
    assert!(matches!(
        session.handle_clientbound(&PacketFrame::build(
            id::SET_ENTITY_MOTION,
            &SetEntityMotion {
                entity_runtime_id: 1,
                motion: Vec3::new(0.0, -1.0, 0.0),
            },
        )),
        Delivery::Drop
    ));
    // ...but other entities' movement passes.
    assert!(matches!(
        session.handle_clientbound(&PacketFrame::build(
            id::MOVE_PLAYER,
            &MovePlayer::normal(9, SPAWN, 0.0, 0.0, 0.0, true, 0),
        )),
        Delivery::Forward
    ));

    // Dropping the toggle lands the player.
    let end = session.spoofer().position();
    let delivery = session.handle_serverbound(&input_frame(
        end,
        Vec2::ZERO,
        0.0,
        input_flags::STOP_FLYING,
        30,
    ));
    assert!(matches!(delivery, Delivery::Forward));
    assert!(!session.spoofer().is_engaged());
    let landing = drain(&mut session, Direction::Serverbound);
    let moves: Vec<&MovePlayer> = landing
        .iter()
        .filter_map(|p| match p {
            GamePacket::MovePlayer(mv) => Some(mv),
            _ => None,
        })
        .collect();
    assert_eq!(moves.len(), 4);
    assert!(moves.iter().all(|mv| mv.on_ground && mv.position == end));

    // Corrections flow again once idle.
    assert!(matches!(
        session.handle_clientbound(&PacketFrame::build(id::MOVE_PLAYER, &correction)),
        Delivery::Forward
    ));
}

// ---------------------------------------------------------------------
// Scaffold
// ---------------------------------------------------------------------

fn give_cobblestone(session: &mut RelaySession) {
    let content = InventoryContent {
        window_id: WINDOW_INVENTORY,
        items: vec![
            ItemStack::empty(),
            ItemStack::placeable(4, 64, 2_550_019), // cobblestone
        ],
    };
    session.handle_clientbound(&PacketFrame::build(id::INVENTORY_CONTENT, &content));
}

#[test]
fn scaffold_places_into_the_air_below() {
    let mut config = RelayConfig::default();
    config.scaffold.enabled = true;
    let (mut session, _rx) = session_with(config);
    begin_session(&mut session);
    give_cobblestone(&mut session);

    // The client selects slot 2 before the module acts.
    session.handle_serverbound(&PacketFrame::build(
        id::MOB_EQUIPMENT,
        &MobEquipment::hotbar_switch(1, ItemStack::empty(), 2),
    ));
    assert_eq!(session.held_slot(), 2);

    // Feet at y=65; the mirror has no data, so the support block is air.
    session.handle_serverbound(&input_frame(SPAWN, Vec2::ZERO, 0.0, 0, 1));
    let injected = drain(&mut session, Direction::Serverbound);

    let equips: Vec<&MobEquipment> = injected
        .iter()
        .filter_map(|p| match p {
            GamePacket::MobEquipment(e) => Some(e),
            _ => None,
        })
        .collect();
    assert_eq!(equips.len(), 2);
    assert_eq!(equips[0].hotbar_slot, 1);
    assert_eq!(equips[0].item.block_runtime_id, 2_550_019);
    // The client's own selection comes back behind the placement.
    assert_eq!(equips[1].hotbar_slot, 2);

    let place = injected
        .iter()
        .find_map(|p| match p {
            GamePacket::InventoryTransaction(InventoryTransaction::UseItem(d)) => Some(d),
            _ => None,
        })
        .expect("placement transaction");
    assert_eq!(place.action, UseItemAction::ClickBlock);
    assert_eq!(place.block_position, BlockPos::new(0, 63, 0));
    assert_eq!(place.face, 1);

    // Same spot again: no duplicate placement.
    session.handle_serverbound(&input_frame(SPAWN, Vec2::ZERO, 0.0, 0, 2));
    assert!(drain(&mut session, Direction::Serverbound).is_empty());

    // Server confirms the block; the support is no longer air.
    session.handle_clientbound(&PacketFrame::build(
        id::UPDATE_BLOCK,
        &UpdateBlock::new(BlockPos::new(0, 64, 0), 2_550_019),
    ));
    session.handle_serverbound(&input_frame(SPAWN, Vec2::ZERO, 0.0, 0, 3));
    assert!(drain(&mut session, Direction::Serverbound).is_empty());
}

#[test]
fn scaffold_is_inert_without_a_mapping() {
    let mut config = RelayConfig::default();
    config.scaffold.enabled = true;
    let (mut session, _rx) = session_with(config);

    // Unsupported protocol: the bootstrap fails and is not retried.
    session.handle_serverbound(&request_settings_frame(700));
    session.handle_clientbound(&start_game_frame(1, SPAWN));
    let _ = session.pending_batch(Direction::Clientbound).unwrap();
    assert!(session.mapping().is_none());
    give_cobblestone(&mut session);

    session.handle_serverbound(&input_frame(SPAWN, Vec2::ZERO, 0.0, 0, 1));
    assert!(drain(&mut session, Direction::Serverbound).is_empty());
}

// ---------------------------------------------------------------------
// Chat surface and identity
// ---------------------------------------------------------------------

#[test]
fn chat_commands_toggle_modules_and_never_reach_the_server() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    begin_session(&mut session);
    assert_eq!(session.module_enabled("scaffold"), Some(false));

    let delivery = session.handle_serverbound(&chat_frame("Steve", ".scaffold on"));
    assert!(matches!(delivery, Delivery::Drop));
    assert_eq!(session.module_enabled("scaffold"), Some(true));

    let replies = drain(&mut session, Direction::Clientbound);
    assert!(replies.iter().any(|p| matches!(
        p,
        GamePacket::Text(t) if t.message.contains("scaffold on")
    )));

    // Ordinary chat passes through.
    assert!(matches!(
        session.handle_serverbound(&chat_frame("Steve", "hello there")),
        Delivery::Forward
    ));
}

#[test]
fn local_name_is_learned_from_chat() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    session.handle_serverbound(&request_settings_frame(924));
    session.handle_serverbound(&chat_frame("Steve", "first message"));
    session.handle_clientbound(&start_game_frame(1, SPAWN));

    assert_eq!(session.entities().display_name(1).as_deref(), Some("Steve"));
}

// ---------------------------------------------------------------------
// Pipeline semantics
// ---------------------------------------------------------------------

struct Claimer {
    seen: Arc<AtomicUsize>,
}

impl RelayModule for Claimer {
    fn name(&self) -> &'static str {
        "claimer"
    }

    fn on_serverbound(&mut self, _packet: &GamePacket, _ctx: &mut ModuleContext<'_>) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst);
        true
    }
}

struct Releaser {
    seen: Arc<AtomicUsize>,
}

impl RelayModule for Releaser {
    fn name(&self) -> &'static str {
        "releaser"
    }

    fn on_serverbound(&mut self, _packet: &GamePacket, ctx: &mut ModuleContext<'_>) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst);
        ctx.set_intercept(false);
        false
    }
}

#[test]
fn intercept_goes_to_the_last_writer_and_everyone_observes() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    let claims = Arc::new(AtomicUsize::new(0));
    let releases = Arc::new(AtomicUsize::new(0));
    session.add_module(Box::new(Claimer {
        seen: claims.clone(),
    }));
    session.add_module(Box::new(Releaser {
        seen: releases.clone(),
    }));

    let packet = PacketFrame::build(id::TEXT, &Text::raw("hello"));
    assert!(matches!(
        session.handle_serverbound(&packet),
        Delivery::Forward
    ));
    assert_eq!(claims.load(Ordering::SeqCst), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);

    // Without the releaser, the claim stands.
    assert!(session.set_module_enabled("releaser", false));
    assert!(matches!(
        session.handle_serverbound(&packet),
        Delivery::Drop
    ));
    assert_eq!(claims.load(Ordering::SeqCst), 2);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn listeners_can_cancel_delivery() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    session.add_listener(|event| {
        if matches!(event.packet, GamePacket::Text(_)) {
            event.cancel();
        }
    });

    assert!(matches!(
        session.handle_serverbound(&PacketFrame::build(id::TEXT, &Text::raw("blocked"))),
        Delivery::Drop
    ));
    assert!(matches!(
        session.handle_serverbound(&request_settings_frame(924)),
        Delivery::Forward
    ));
}

// ---------------------------------------------------------------------
// Disconnect
// ---------------------------------------------------------------------

struct DisconnectCounter {
    count: Arc<AtomicUsize>,
}

impl RelayModule for DisconnectCounter {
    fn name(&self) -> &'static str {
        "disconnect-counter"
    }

    fn on_disconnect(&mut self, _reason: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn disconnect_is_idempotent_and_resets_the_bootstrap() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    let disconnects = Arc::new(AtomicUsize::new(0));
    session.add_module(Box::new(DisconnectCounter {
        count: disconnects.clone(),
    }));

    begin_session(&mut session);
    session.handle_clientbound(&add_player_frame("Steve", 7, Vec3::ZERO));
    assert!(session.mapping().is_some());

    session.on_disconnect("server closed");
    session.on_disconnect("server closed");
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    assert_eq!(session.entities().live_count(), 0);
    assert_eq!(session.world().chunk_count(), 0);
    assert!(session.mapping().is_none());
    assert!(session.local().is_none());

    // A fresh connection bootstraps the mapping again.
    begin_session(&mut session);
    assert!(session.mapping().is_some());
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[test]
fn new_client_address_ends_the_previous_session() {
    let mut config = RelayConfig::default();
    config.flight.ground_jitter = 0.0;
    let (mut session, _rx) = session_with(config);
    let mut bound: Option<SocketAddr> = None;

    let first: SocketAddr = "127.0.0.1:50000".parse().unwrap();
    transport::bind_client(&mut session, &mut bound, first);
    begin_session(&mut session);
    session.handle_serverbound(&input_frame(
        SPAWN,
        Vec2::ZERO,
        0.0,
        input_flags::START_FLYING,
        1,
    ));
    drain(&mut session, Direction::Serverbound);
    assert!(session.spoofer().is_engaged());

    // Same source again: the session carries on.
    transport::bind_client(&mut session, &mut bound, first);
    assert!(session.spoofer().is_engaged());

    // A datagram from a different address is a new connection; nothing
    // learned from the first client may touch its traffic.
    let second: SocketAddr = "127.0.0.1:50001".parse().unwrap();
    transport::bind_client(&mut session, &mut bound, second);
    assert_eq!(bound, Some(second));
    assert!(!session.spoofer().is_engaged());
    assert!(session.local().is_none());
    assert_eq!(session.entities().live_count(), 0);

    // The new client's movement passes through unrewritten.
    let input = input_frame(Vec3::new(100.0, 50.0, 100.0), Vec2::ZERO, 0.0, 0, 1);
    assert!(matches!(
        session.handle_serverbound(&input),
        Delivery::Forward
    ));
    assert!(drain(&mut session, Direction::Serverbound).is_empty());
}

// ---------------------------------------------------------------------
// Batch path
// ---------------------------------------------------------------------

#[test]
fn compression_switches_after_network_settings_batch() {
    let (mut session, _rx) = session_with(RelayConfig::default());

    let settings = NetworkSettings {
        compression_threshold: 1,
        compression_algorithm: 0,
        client_throttle_enabled: false,
        client_throttle_threshold: 0,
        client_throttle_scalar: 0.0,
    };
    let plain = BatchConfig::default();
    let batch = encode_batch(
        &[PacketFrame::build(id::NETWORK_SETTINGS, &settings).raw],
        &plain,
    )
    .unwrap();

    let out = session
        .process_batch(Direction::Clientbound, batch)
        .unwrap()
        .unwrap();
    // The carrying batch itself stays uncompressed.
    assert_eq!(decode_batch(out, &plain).unwrap().len(), 1);

    // Later traffic arrives compressed and is understood.
    let compressed = BatchConfig {
        compression_enabled: true,
        compression_threshold: 0,
        ..BatchConfig::default()
    };
    let login = encode_batch(&[frame(0x01, &[0u8; 40]).raw], &compressed).unwrap();
    let relayed = session
        .process_batch(Direction::Serverbound, login)
        .unwrap()
        .unwrap();
    assert_eq!(decode_batch(relayed, &compressed).unwrap().len(), 1);
}

#[test]
fn dropped_packets_leave_the_batch() {
    let (mut session, _rx) = session_with(RelayConfig::default());
    begin_session(&mut session);

    let plain = BatchConfig::default();
    let batch = encode_batch(
        &[
            chat_frame("Steve", ".status").raw,
            frame(0x7A, &[1, 2, 3]).raw,
        ],
        &plain,
    )
    .unwrap();
    let out = session
        .process_batch(Direction::Serverbound, batch)
        .unwrap()
        .unwrap();
    let survivors = decode_batch(out, &plain).unwrap();
    assert_eq!(survivors.len(), 1);
    let survivor = GamePacket::decode(&PacketFrame::parse(survivors[0].clone()).unwrap());
    assert!(matches!(survivor, GamePacket::Unknown { id: 0x7A }));

    // The command reply waits on the clientbound side.
    let replies = drain(&mut session, Direction::Clientbound);
    assert!(matches!(replies.as_slice(), [GamePacket::Text(_)]));
}
