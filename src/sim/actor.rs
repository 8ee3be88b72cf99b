//! The player-controlled actor
//!
//! Resources are clamped at every mutation, so health, armor and ammo can
//! never leave their ranges even transiently.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::world::SurfaceId;
use crate::consts::*;
use crate::{horizontal, normalize_angle, yaw_to_forward};

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Grounded,
    Airborne,
}

/// Starting resources for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub health: u32,
    pub armor: u32,
    pub ammo: u32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            armor: 0,
            ammo: 50,
        }
    }
}

/// Caller-side rate limit for the hitscan weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    /// Seconds between shots
    pub fire_interval: f32,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
}

impl Weapon {
    pub fn new(fire_interval: f32) -> Self {
        Self {
            fire_interval: fire_interval.max(0.0),
            cooldown: 0.0,
        }
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown = self.fire_interval;
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }
}

/// How an incoming hit was split between armor and health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageTaken {
    pub armor_absorbed: u32,
    pub health_lost: u32,
}

/// The player
#[derive(Debug, Clone)]
pub struct Actor {
    /// Feet position
    pub position: Vec3,
    /// Horizontal part is knockback, vertical part is gravity integration
    pub velocity: Vec3,
    /// Radians, normalized to [-π, π)
    pub yaw: f32,
    /// Radians, clamped to ±MAX_PITCH
    pub pitch: f32,
    pub motion: MotionState,
    /// Surface under the feet while grounded
    pub standing_on: Option<SurfaceId>,
    pub health: u32,
    pub armor: u32,
    pub ammo: u32,
    /// While > 0 incoming damage is ignored
    pub invincibility: f32,
    pub weapon: Weapon,
}

impl Actor {
    pub fn new(spawn: Vec3, yaw: f32, loadout: &Loadout, fire_interval: f32) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            yaw: normalize_angle(yaw),
            pitch: 0.0,
            motion: MotionState::Grounded,
            standing_on: None,
            health: loadout.health.min(MAX_HEALTH),
            armor: loadout.armor.min(MAX_ARMOR),
            ammo: loadout.ammo.min(MAX_AMMO),
            invincibility: 0.0,
            weapon: Weapon::new(fire_interval),
        }
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.motion == MotionState::Grounded
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Collision box of the body
    pub fn body(&self, radius: f32, height: f32) -> Aabb {
        Aabb::from_feet(self.position, radius, height)
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::Y * PLAYER_EYE_HEIGHT
    }

    /// Horizontal forward direction
    pub fn forward(&self) -> Vec3 {
        yaw_to_forward(self.yaw)
    }

    /// Horizontal right direction
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Full view direction including pitch
    pub fn view_dir(&self) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        self.forward() * cos_p + Vec3::Y * sin_p
    }

    /// Apply a look delta (yaw, pitch) in radians
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = normalize_angle(self.yaw + yaw_delta);
        self.pitch = (self.pitch + pitch_delta).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Returns the health actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
        self.health - before
    }

    pub fn add_armor(&mut self, amount: u32) -> u32 {
        let before = self.armor;
        self.armor = self.armor.saturating_add(amount).min(MAX_ARMOR);
        self.armor - before
    }

    pub fn add_ammo(&mut self, amount: u32) -> u32 {
        let before = self.ammo;
        self.ammo = self.ammo.saturating_add(amount).min(MAX_AMMO);
        self.ammo - before
    }

    /// Take a hit. Armor soaks up to half of it; health never drops below zero.
    pub fn take_damage(&mut self, amount: u32) -> DamageTaken {
        let armor_absorbed = self.armor.min(amount / 2);
        self.armor -= armor_absorbed;
        let health_lost = (amount - armor_absorbed).min(self.health);
        self.health -= health_lost;
        DamageTaken {
            armor_absorbed,
            health_lost,
        }
    }

    /// Add a horizontal shove
    pub fn apply_knockback(&mut self, impulse: Vec3) {
        self.velocity += horizontal(impulse);
    }

    /// Age invincibility and the weapon cooldown
    pub fn tick_timers(&mut self, dt: f32) {
        self.invincibility = (self.invincibility - dt).max(0.0);
        self.weapon.tick(dt);
    }
}
