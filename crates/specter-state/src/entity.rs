//! Entity registry with ghost retention.
//!
//! Live entities come and go with spawn/despawn packets; players that
//! despawn leave a ghost carrying their last observed position and name,
//! purged when the id reappears or the session ends.

use dashmap::DashMap;

use specter_proto::math::Vec3;

/// What kind of thing an entity entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// The player this session belongs to.
    LocalPlayer,
    /// A remote player.
    Player,
    /// A mob or other non-player actor.
    Entity,
    /// A dropped item.
    Item,
}

/// A live entity.
#[derive(Debug, Clone)]
pub struct EntityEntry {
    pub runtime_id: u64,
    pub kind: EntityKind,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone)]
struct GhostRecord {
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

/// One row of a display snapshot: a live entity or a ghost.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    pub runtime_id: u64,
    pub kind: EntityKind,
    pub name: String,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// True for ghost rows synthesized from retained state.
    pub vanished: bool,
}

/// Concurrent registry of everything the traffic has spawned.
///
/// Despawns arrive keyed by unique id while everything else uses runtime
/// ids, so a unique→runtime table is maintained alongside.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    live: DashMap<u64, EntityEntry>,
    ghosts: DashMap<u64, GhostRecord>,
    last_known: DashMap<u64, Vec3>,
    names: DashMap<u64, String>,
    unique_to_runtime: DashMap<i64, u64>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned entity. A ghost with the same id is purged; the
    /// live row replaces it in the same call.
    pub fn register(
        &self,
        runtime_id: u64,
        unique_id: i64,
        kind: EntityKind,
        name: Option<String>,
        position: Vec3,
        yaw: f32,
        pitch: f32,
    ) {
        self.ghosts.remove(&runtime_id);
        if let Some(name) = name {
            self.names.insert(runtime_id, name);
        }
        self.unique_to_runtime.insert(unique_id, runtime_id);
        self.last_known.insert(runtime_id, position);
        self.live.insert(
            runtime_id,
            EntityEntry {
                runtime_id,
                kind,
                position,
                yaw,
                pitch,
            },
        );
    }

    /// Record an observed position for a live entity. Unknown ids are
    /// ignored rather than implicitly spawned.
    pub fn update_position(&self, runtime_id: u64, position: Vec3, yaw: f32, pitch: f32) {
        if let Some(mut entry) = self.live.get_mut(&runtime_id) {
            entry.position = position;
            entry.yaw = yaw;
            entry.pitch = pitch;
            self.last_known.insert(runtime_id, position);
        }
    }

    /// Handle a despawn, keyed by unique id. Players leave a ghost.
    pub fn on_remove(&self, unique_id: i64) {
        let Some((_, runtime_id)) = self.unique_to_runtime.remove(&unique_id) else {
            return;
        };
        let Some((_, entry)) = self.live.remove(&runtime_id) else {
            return;
        };
        if entry.kind == EntityKind::Player {
            self.ghosts.insert(
                runtime_id,
                GhostRecord {
                    position: entry.position,
                    yaw: entry.yaw,
                    pitch: entry.pitch,
                },
            );
        }
    }

    pub fn get(&self, runtime_id: u64) -> Option<EntityEntry> {
        self.live.get(&runtime_id).map(|e| e.value().clone())
    }

    pub fn last_known_position(&self, runtime_id: u64) -> Option<Vec3> {
        self.last_known.get(&runtime_id).map(|e| *e.value())
    }

    pub fn display_name(&self, runtime_id: u64) -> Option<String> {
        self.names.get(&runtime_id).map(|e| e.value().clone())
    }

    pub fn is_live(&self, runtime_id: u64) -> bool {
        self.live.contains_key(&runtime_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    /// Live set plus ghosts whose id has not reappeared. Each id occurs at
    /// most once; a live row always shadows its ghost.
    pub fn snapshot_for_display(&self) -> Vec<EntitySnapshot> {
        let mut rows: Vec<EntitySnapshot> = self
            .live
            .iter()
            .map(|entry| {
                let e = entry.value();
                EntitySnapshot {
                    runtime_id: e.runtime_id,
                    kind: e.kind,
                    name: self.display_name(e.runtime_id).unwrap_or_else(|| "unknown".into()),
                    position: e.position,
                    yaw: e.yaw,
                    pitch: e.pitch,
                    vanished: false,
                }
            })
            .collect();

        for ghost in self.ghosts.iter() {
            let runtime_id = *ghost.key();
            if self.live.contains_key(&runtime_id) {
                continue;
            }
            let g = ghost.value();
            rows.push(EntitySnapshot {
                runtime_id,
                kind: EntityKind::Player,
                name: self.display_name(runtime_id).unwrap_or_else(|| "unknown".into()),
                position: g.position,
                yaw: g.yaw,
                pitch: g.pitch,
                vanished: true,
            });
        }

        rows
    }

    pub fn purge_ghosts(&self) {
        self.ghosts.clear();
    }

    /// Forget everything; used on disconnect.
    pub fn clear(&self) {
        self.live.clear();
        self.ghosts.clear();
        self.last_known.clear();
        self.names.clear();
        self.unique_to_runtime.clear();
    }
}
