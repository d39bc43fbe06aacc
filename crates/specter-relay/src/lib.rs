//! Transparent relay between a Bedrock client and its server.
//!
//! Sits on the UDP path, decodes the game batches of both directions,
//! mirrors world and entity state, and lets a pipeline of modules
//! observe, inject and intercept traffic. The interesting parts live in
//! [`session`] (the per-connection pipeline) and [`motion`] (the
//! movement spoofer).

pub mod config;
pub mod error;
pub mod modules;
pub mod motion;
pub mod presentation;
pub mod session;
pub mod transport;
