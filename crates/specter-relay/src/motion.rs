//! Motion spoofer: owns the controlled entity's position while engaged.
//!
//! Engagement follows the client's own fly toggle (START_FLYING in the
//! input flags), so the player drives it without any extra UI. While
//! engaged the spoofer integrates its own velocity from the raw inputs
//! and the session reports the spoofed position to the server instead of
//! the client's.

use rand::Rng;

use specter_proto::math::Vec3;
use specter_proto::packets::{input_flags, PlayerAuthInput};

use crate::config::FlightConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpooferState {
    Idle,
    Engaged,
}

/// Position and ground flag to report for one input tick.
#[derive(Debug, Clone)]
pub struct SpoofStep {
    pub position: Vec3,
    pub on_ground: bool,
}

#[derive(Debug)]
pub struct MotionSpoofer {
    config: FlightConfig,
    state: SpooferState,
    controlled: Option<u64>,
    position: Vec3,
    velocity: Vec3,
    ticks_engaged: u64,
}

impl MotionSpoofer {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            state: SpooferState::Idle,
            controlled: None,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            ticks_engaged: 0,
        }
    }

    pub fn state(&self) -> SpooferState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state == SpooferState::Engaged
    }

    /// Whether this spoofer currently owns the given entity's movement.
    pub fn controls(&self, runtime_id: u64) -> bool {
        self.is_engaged() && self.controlled == Some(runtime_id)
    }

    /// Tracked position; meaningful only while engaged.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Take ownership of an entity's movement, starting from where the
    /// client last reported it.
    pub fn engage(&mut self, runtime_id: u64, position: Vec3) {
        self.state = SpooferState::Engaged;
        self.controlled = Some(runtime_id);
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.ticks_engaged = 0;
    }

    /// Advance one input tick. Returns the step to report, or `None`
    /// while idle.
    pub fn tick(&mut self, input: &PlayerAuthInput) -> Option<SpoofStep> {
        if !self.is_engaged() {
            return None;
        }

        let world_move = input.move_vector.rotated_by_yaw(input.yaw);
        let target_x = world_move.x * self.config.horizontal_speed;
        let target_z = world_move.z * self.config.horizontal_speed;

        let up = input.has_flag(input_flags::ASCEND) || input.has_flag(input_flags::JUMPING);
        let down = input.has_flag(input_flags::DESCEND) || input.has_flag(input_flags::SNEAKING);
        // No vertical intent leaves target_y at zero, so vy decays.
        let target_y = match (up, down) {
            (true, false) => self.config.vertical_speed,
            (false, true) => -self.config.vertical_speed,
            _ => 0.0,
        };

        let accel = self.config.acceleration;
        self.velocity.x += (target_x - self.velocity.x) * accel;
        self.velocity.y += (target_y - self.velocity.y) * accel;
        self.velocity.z += (target_z - self.velocity.z) * accel;

        if target_x == 0.0 {
            self.velocity.x *= self.config.friction;
        }
        if target_y == 0.0 {
            self.velocity.y *= self.config.friction;
        }
        if target_z == 0.0 {
            self.velocity.z *= self.config.friction;
        }

        let max_h = self.config.max_horizontal;
        let max_v = self.config.max_vertical;
        self.velocity.x = self.velocity.x.clamp(-max_h, max_h);
        self.velocity.y = self.velocity.y.clamp(-max_v, max_v);
        self.velocity.z = self.velocity.z.clamp(-max_h, max_h);

        self.position = self.position + self.velocity;
        self.ticks_engaged += 1;

        let forced = self.config.ground_interval > 0
            && self.ticks_engaged % self.config.ground_interval == 0;
        let settled = self.velocity.y.abs() <= self.config.ground_tolerance;
        let on_ground = forced || settled;

        let mut reported = self.position;
        if forced && self.config.ground_jitter > 0.0 {
            let jitter = self.config.ground_jitter;
            reported.y += rand::thread_rng().gen_range(-jitter..=jitter);
        }

        Some(SpoofStep {
            position: reported,
            on_ground,
        })
    }

    /// Release the entity. Returns the landing flush: a burst of on-ground
    /// steps at the final position so the server sees a settled player.
    pub fn disengage(&mut self) -> Vec<SpoofStep> {
        if !self.is_engaged() {
            return Vec::new();
        }
        let landing = (0..self.config.landing_packets)
            .map(|_| SpoofStep {
                position: self.position,
                on_ground: true,
            })
            .collect();
        self.state = SpooferState::Idle;
        self.controlled = None;
        self.velocity = Vec3::ZERO;
        landing
    }

    /// Hard reset on disconnect: no landing flush, nothing to send to.
    pub fn reset(&mut self) {
        self.state = SpooferState::Idle;
        self.controlled = None;
        self.position = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.ticks_engaged = 0;
    }
}
