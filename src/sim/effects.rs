//! Short-lived visual state: particles, floating text, screen flashes
//!
//! Pools have a fixed number of slots chosen at construction. Spawning into a
//! full pool drops the request; pools never grow. Freed slots are reused
//! first-free, so there is no ordering among live effects.

use glam::Vec3;

use crate::consts::*;

/// What the renderer should draw for an effect
#[derive(Debug, Clone, PartialEq)]
pub enum VisualTag {
    /// Impact spark off a wall
    Spark,
    /// Hit on an enemy
    Blood,
    /// Pickup or box sparkle, packed 0xRRGGBB
    Glitter(u32),
    /// Floating damage number or kill-feed line
    Text(String),
}

/// A single live effect
#[derive(Debug, Clone, PartialEq)]
pub struct Transient {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Counts down from 1.0; the slot frees at or below zero
    pub life: f32,
    pub tag: VisualTag,
}

impl Transient {
    /// Fade fraction for the renderer
    pub fn life_fraction(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }
}

/// Fixed-capacity pool of transients
#[derive(Debug, Clone)]
pub struct EffectPool {
    slots: Vec<Option<Transient>>,
    /// Downward acceleration applied to every live effect
    gravity: f32,
    /// Life lost per second
    decay: f32,
}

impl EffectPool {
    pub fn new(capacity: usize, gravity: f32, decay: f32) -> Self {
        Self {
            slots: vec![None; capacity],
            gravity,
            decay,
        }
    }

    /// Pool for particles (falls under gravity)
    pub fn particles(capacity: usize) -> Self {
        Self::new(capacity, PARTICLE_GRAVITY, PARTICLE_DECAY)
    }

    /// Pool for floating text (drifts, no gravity)
    pub fn messages(capacity: usize) -> Self {
        Self::new(capacity, 0.0, MESSAGE_DECAY)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live effects
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Fill the first free slot. Returns false (and drops the request) when full.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3, tag: VisualTag) -> bool {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(Transient {
                    position,
                    velocity,
                    life: 1.0,
                    tag,
                });
                true
            }
            None => false,
        }
    }

    /// Integrate and age every live effect, freeing expired slots
    pub fn tick(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let Some(effect) = slot.as_mut() else {
                continue;
            };
            effect.position += effect.velocity * dt;
            effect.velocity.y -= self.gravity * dt;
            effect.life -= self.decay * dt;
            if effect.life <= 0.0 {
                *slot = None;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transient> {
        self.slots.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// Full-screen tints, counted down in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenFlash {
    pub damage: f32,
    pub pickup: f32,
}

impl ScreenFlash {
    pub fn flash_damage(&mut self) {
        self.damage = DAMAGE_FLASH;
    }

    pub fn flash_pickup(&mut self) {
        self.pickup = PICKUP_FLASH;
    }

    pub fn tick(&mut self, dt: f32) {
        self.damage = (self.damage - dt).max(0.0);
        self.pickup = (self.pickup - dt).max(0.0);
    }

    /// Intensities in [0, 1] for the renderer
    pub fn intensities(&self) -> (f32, f32) {
        (
            (self.damage / DAMAGE_FLASH).clamp(0.0, 1.0),
            (self.pickup / PICKUP_FLASH).clamp(0.0, 1.0),
        )
    }
}
