//! Protocol-version mapping tables.
//!
//! Runtime ids are per-version FNV hashes of block states, so nothing can
//! be interpreted without a table crafted for the protocol the client
//! negotiated. Tables ship as embedded JSON, one file per supported
//! version.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

/// Curated table for protocol 924 (Bedrock 1.26.0).
const MAPPING_924_JSON: &str = include_str!("../data/block_mapping_924.json");

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no mapping table for protocol version {0}")]
    UnsupportedProtocol(i32),
    #[error("mapping table parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawMapping {
    protocol: i32,
    blocks: Vec<RawBlock>,
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
struct RawBlock {
    name: String,
    runtime_id: u32,
    placeable: bool,
}

#[derive(Deserialize)]
struct RawItem {
    name: String,
    runtime_id: i32,
    block_runtime_id: u32,
}

/// An item that places a block.
#[derive(Debug, Clone)]
pub struct ItemInfo {
    pub name: String,
    pub runtime_id: i32,
    pub block_runtime_id: u32,
}

/// Resolved lookup tables for one protocol version.
#[derive(Debug)]
pub struct Mapping {
    protocol: i32,
    air_runtime_id: u32,
    block_names: HashMap<u32, String>,
    block_ids: HashMap<String, u32>,
    placeable: HashSet<u32>,
    items_by_id: HashMap<i32, ItemInfo>,
}

impl Mapping {
    pub fn protocol(&self) -> i32 {
        self.protocol
    }

    pub fn air_runtime_id(&self) -> u32 {
        self.air_runtime_id
    }

    pub fn block_name(&self, runtime_id: u32) -> Option<&str> {
        self.block_names.get(&runtime_id).map(String::as_str)
    }

    pub fn block_runtime_id(&self, name: &str) -> Option<u32> {
        self.block_ids.get(name).copied()
    }

    /// Whether a block runtime id is a solid, placeable block. Unknown ids
    /// are not placeable.
    pub fn is_placeable(&self, runtime_id: u32) -> bool {
        self.placeable.contains(&runtime_id)
    }

    /// Item info for an item runtime id, when the item places a block.
    pub fn placing_item(&self, item_runtime_id: i32) -> Option<&ItemInfo> {
        self.items_by_id.get(&item_runtime_id)
    }
}

/// Build the mapping for a negotiated protocol version.
pub fn craft_mapping(protocol_version: i32) -> Result<Mapping, MappingError> {
    let json = match protocol_version {
        924 => MAPPING_924_JSON,
        other => return Err(MappingError::UnsupportedProtocol(other)),
    };

    let raw: RawMapping = serde_json::from_str(json)?;

    let mut block_names = HashMap::with_capacity(raw.blocks.len());
    let mut block_ids = HashMap::with_capacity(raw.blocks.len());
    let mut placeable = HashSet::new();
    let mut air_runtime_id = 0;

    for block in raw.blocks {
        if block.name == "minecraft:air" {
            air_runtime_id = block.runtime_id;
        }
        if block.placeable {
            placeable.insert(block.runtime_id);
        }
        block_names.insert(block.runtime_id, block.name.clone());
        block_ids.insert(block.name, block.runtime_id);
    }

    let items_by_id = raw
        .items
        .into_iter()
        .map(|item| {
            (
                item.runtime_id,
                ItemInfo {
                    name: item.name,
                    runtime_id: item.runtime_id,
                    block_runtime_id: item.block_runtime_id,
                },
            )
        })
        .collect();

    Ok(Mapping {
        protocol: raw.protocol,
        air_runtime_id,
        block_names,
        block_ids,
        placeable,
        items_by_id,
    })
}
