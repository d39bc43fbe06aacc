//! Minecraft Bedrock Edition wire types and packet codecs for the relay path.
//!
//! Unlike a server, a relay needs both codec directions for most packets:
//! it decodes what the server sends so it can mirror world state, and it
//! encodes what a client would send so it can substitute traffic.

pub mod batch;
pub mod codec;
pub mod compression;
pub mod error;
pub mod item_stack;
pub mod math;
pub mod packets;
pub mod varint;
