//! Relay configuration, loaded from a TOML file.
//!
//! Every section and field has a default, so a missing file section only
//! falls back instead of failing the load.

use std::path::Path;

use serde::Deserialize;

use crate::error::RelayError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub relay: RelaySection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub flight: FlightConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub scaffold: ScaffoldConfig,
    #[serde(default)]
    pub warp: WarpConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl RelayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelaySection {
    /// Address the relay listens on for the client.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Address of the real server.
    #[serde(default = "default_upstream_address")]
    pub upstream_address: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:19134".to_string()
}

fn default_upstream_address() -> String {
    "127.0.0.1:19132".to_string()
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            upstream_address: default_upstream_address(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Motion spoofer tunables. Speeds and caps are blocks per tick.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightConfig {
    #[serde(default = "default_horizontal_speed")]
    pub horizontal_speed: f32,
    #[serde(default = "default_vertical_speed")]
    pub vertical_speed: f32,
    /// Blend factor toward the target velocity, 0..1 per tick.
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    /// Retained fraction of velocity on axes without input.
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_max_horizontal")]
    pub max_horizontal: f32,
    #[serde(default = "default_max_vertical")]
    pub max_vertical: f32,
    /// Force the reported on-ground flag every this many ticks.
    #[serde(default = "default_ground_interval")]
    pub ground_interval: u64,
    /// |vy| at or below this also reports on-ground.
    #[serde(default = "default_ground_tolerance")]
    pub ground_tolerance: f32,
    /// Bound of the random Y offset applied to forced ground contacts.
    #[serde(default = "default_ground_jitter")]
    pub ground_jitter: f32,
    /// On-ground packets flushed when flight disengages.
    #[serde(default = "default_landing_packets")]
    pub landing_packets: u32,
    /// Inject an ability grant at spawn so a survival client can raise
    /// the fly toggle at all.
    #[serde(default = "default_grant_flight")]
    pub grant_flight: bool,
}

fn default_horizontal_speed() -> f32 {
    0.65
}

fn default_vertical_speed() -> f32 {
    0.5
}

fn default_acceleration() -> f32 {
    0.35
}

fn default_friction() -> f32 {
    0.8
}

fn default_max_horizontal() -> f32 {
    1.1
}

fn default_max_vertical() -> f32 {
    0.9
}

fn default_ground_interval() -> u64 {
    10
}

fn default_ground_tolerance() -> f32 {
    0.08
}

fn default_ground_jitter() -> f32 {
    0.02
}

fn default_landing_packets() -> u32 {
    4
}

fn default_grant_flight() -> bool {
    true
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            horizontal_speed: default_horizontal_speed(),
            vertical_speed: default_vertical_speed(),
            acceleration: default_acceleration(),
            friction: default_friction(),
            max_horizontal: default_max_horizontal(),
            max_vertical: default_max_vertical(),
            ground_interval: default_ground_interval(),
            ground_tolerance: default_ground_tolerance(),
            ground_jitter: default_ground_jitter(),
            landing_packets: default_landing_packets(),
            grant_flight: default_grant_flight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_fov")]
    pub fov: f32,
}

fn default_fov() -> f32 {
    70.0
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fov: default_fov(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScaffoldConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarpConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Distance covered by each injected movement step.
    #[serde(default = "default_step_blocks")]
    pub step_blocks: f32,
    /// Targets farther than this are left alone.
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

fn default_step_blocks() -> f32 {
    3.0
}

fn default_max_distance() -> f32 {
    48.0
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            step_blocks: default_step_blocks(),
            max_distance: default_max_distance(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}
