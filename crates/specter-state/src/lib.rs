//! Session state mirrored from observed traffic: block cache, entity
//! registry, and protocol-version mapping tables.

pub mod entity;
pub mod mapping;
pub mod world;
