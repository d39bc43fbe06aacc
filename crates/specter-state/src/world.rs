//! Client-side mirror of the block world, fed by observed packets.
//!
//! Only two packet kinds mutate it: LevelChunk resets a column, UpdateBlock
//! records a single change. Terrain payloads are never palette-decoded, so
//! a freshly loaded chunk reads as all air until updates arrive. Absent
//! data means "air", never "unknown".

use dashmap::DashMap;

use specter_proto::math::{BlockPos, ChunkPos};

/// Air runtime id as the mirror reports it for absent entries.
pub const AIR: u32 = 0;

/// Packed chunk coordinates, the key of the chunk map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey(u64);

impl ChunkKey {
    pub fn new(x: i32, z: i32) -> Self {
        Self(((x as u32 as u64) << 32) | z as u32 as u64)
    }

    /// Chunk containing a block position (arithmetic shift, correct for
    /// negative coordinates).
    pub fn from_block(pos: &BlockPos) -> Self {
        Self::new(pos.x >> 4, pos.z >> 4)
    }

    pub fn x(&self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    pub fn z(&self) -> i32 {
        self.0 as u32 as i32
    }
}

impl From<ChunkPos> for ChunkKey {
    fn from(pos: ChunkPos) -> Self {
        Self::new(pos.x, pos.z)
    }
}

/// Concurrent block cache. Reads take no external lock and are safe from
/// any thread; the session is the only writer.
#[derive(Debug, Default)]
pub struct WorldMirror {
    chunks: DashMap<ChunkKey, DashMap<BlockPos, u32>>,
}

impl WorldMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chunk column arrived. Any previously tracked updates for the same
    /// column are stale and dropped with it.
    pub fn on_chunk_load(&self, chunk_x: i32, chunk_z: i32) {
        self.chunks
            .insert(ChunkKey::new(chunk_x, chunk_z), DashMap::new());
    }

    /// A single block changed. The chunk entry is created lazily so an
    /// update ahead of its LevelChunk is never lost.
    pub fn on_block_update(&self, pos: BlockPos, runtime_id: u32) {
        self.chunks
            .entry(ChunkKey::from_block(&pos))
            .or_default()
            .insert(pos, runtime_id);
    }

    /// Runtime id at a position; [`AIR`] when nothing is tracked there.
    pub fn block_at(&self, pos: &BlockPos) -> u32 {
        self.chunks
            .get(&ChunkKey::from_block(pos))
            .and_then(|chunk| chunk.value().get(pos).map(|entry| *entry.value()))
            .unwrap_or(AIR)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Tracked block updates in one column, if loaded.
    pub fn tracked_in_chunk(&self, chunk_x: i32, chunk_z: i32) -> Option<usize> {
        self.chunks
            .get(&ChunkKey::new(chunk_x, chunk_z))
            .map(|chunk| chunk.value().len())
    }

    /// Forget everything; used on disconnect.
    pub fn clear(&self) {
        self.chunks.clear();
    }
}
