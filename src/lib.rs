//! Station Strike - simulation core for a small first-person station shooter
//! and its platform-collection sibling.
//!
//! Core modules:
//! - `sim`: Deterministic per-tick simulation (movement, collision, combat, AI, pickups)
//! - `level`: Level layouts handed to the simulation at load time
//! - `settings`: Tunables and per-mode configuration
//! - `audio`: Fire-and-forget cue identifiers derived from simulation events

pub mod audio;
pub mod level;
pub mod settings;
pub mod sim;

pub use level::LevelLayout;
pub use settings::{GameMode, ModeConfig, Settings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 0.4;
    pub const PLAYER_HEIGHT: f32 = 1.8;
    pub const PLAYER_EYE_HEIGHT: f32 = 1.6;

    /// Player movement (units/s, units/s²)
    pub const PLAYER_MOVE_SPEED: f32 = 5.0;
    pub const PLAYER_JUMP_IMPULSE: f32 = 6.0;
    pub const GRAVITY: f32 = 18.0;
    /// Look pitch limit (radians, ~85 degrees)
    pub const MAX_PITCH: f32 = 1.48;

    /// Surfaces within this height of each other count as level
    pub const STEP_EPSILON: f32 = 0.05;
    /// Largest drop a grounded actor snaps down instead of falling
    pub const STEP_DOWN_TOLERANCE: f32 = 0.3;

    /// Knockback velocity decay rate (1/s)
    pub const KNOCKBACK_DAMPING: f32 = 8.0;
    /// Horizontal knockback speed applied by an enemy strike
    pub const KNOCKBACK_SPEED: f32 = 7.0;
    /// Invincibility granted after taking a hit (seconds)
    pub const HIT_INVINCIBILITY: f32 = 0.75;

    /// Player resources
    pub const MAX_HEALTH: u32 = 100;
    pub const MAX_ARMOR: u32 = 100;
    pub const MAX_AMMO: u32 = 99;

    /// Weapon
    pub const WEAPON_DAMAGE: u32 = 34;
    pub const WEAPON_RANGE: f32 = 100.0;
    pub const WEAPON_FIRE_INTERVAL: f32 = 0.25;
    pub const HIT_BONUS: i64 = 10;
    pub const KILL_BONUS: i64 = 100;
    /// Muzzle offset in camera space (right, up, forward)
    pub const MUZZLE_OFFSET: [f32; 3] = [0.25, -0.2, 0.5];
    /// How long the tracer stays visible (seconds)
    pub const TRACER_DURATION: f32 = 0.1;

    /// Pickup trigger radius (units)
    pub const PICKUP_RADIUS: f32 = 1.2;
    /// Pickup spin rate (radians/s)
    pub const PICKUP_SPIN_RATE: f32 = 2.0;

    /// Effect pools
    pub const MAX_PARTICLES: usize = 256;
    pub const MAX_MESSAGES: usize = 8;
    pub const PARTICLE_GRAVITY: f32 = 9.8;
    /// Life lost per second (life starts at 1.0)
    pub const PARTICLE_DECAY: f32 = 1.5;
    pub const MESSAGE_DECAY: f32 = 0.5;

    /// Screen flash durations (seconds)
    pub const DAMAGE_FLASH: f32 = 0.3;
    pub const PICKUP_FLASH: f32 = 0.2;

    /// Score bonus per whole second left on the clock at a win
    pub const TIME_BONUS_PER_SECOND: i64 = 10;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Horizontal unit vector a yaw angle looks along (yaw 0 looks down -Z)
#[inline]
pub fn yaw_to_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

/// Yaw angle of a horizontal direction (inverse of [`yaw_to_forward`])
#[inline]
pub fn forward_to_yaw(dir: Vec3) -> f32 {
    normalize_angle(dir.x.atan2(-dir.z))
}

/// Project a vector onto the horizontal plane
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
