//! Pickups and interactable boxes
//!
//! A pickup is a point with a trigger radius. Triggering flips `collected`
//! once and for all; a collected pickup never triggers again, so its reward
//! and score delta are applied exactly once.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use crate::consts::{PICKUP_RADIUS, PICKUP_SPIN_RATE};

/// Where a reward box drops its collectible, relative to the box
pub const REWARD_DROP_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 1.5);

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Ammo,
    Armor,
    /// Counts toward the collection goal
    Collectible,
    /// Mystery box holding a collectible
    RewardBox,
    /// Mystery box holding nothing
    EmptyBox,
}

impl PickupKind {
    /// Score change applied when triggered
    pub fn score_delta(&self) -> i64 {
        match self {
            PickupKind::Health | PickupKind::Ammo | PickupKind::Armor => 5,
            PickupKind::Collectible => 0,
            PickupKind::RewardBox => 25,
            PickupKind::EmptyBox => -10,
        }
    }

    /// Amount used when a level does not give one
    pub fn default_value(&self) -> u32 {
        match self {
            PickupKind::Health => 25,
            PickupKind::Ammo => 20,
            PickupKind::Armor => 50,
            PickupKind::Collectible | PickupKind::RewardBox => 100,
            PickupKind::EmptyBox => 0,
        }
    }

    /// Boxes are opened rather than walked over
    pub fn is_box(&self) -> bool {
        matches!(self, PickupKind::RewardBox | PickupKind::EmptyBox)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::Health => "health",
            PickupKind::Ammo => "ammo",
            PickupKind::Armor => "armor",
            PickupKind::Collectible => "collectible",
            PickupKind::RewardBox => "box",
            PickupKind::EmptyBox => "empty box",
        }
    }
}

/// What a triggered pickup grants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    Health(u32),
    Ammo(u32),
    Armor(u32),
    /// One collectible worth `value` points
    Collect { value: u32 },
    /// Drop a new collectible at `position`
    SpawnCollectible { position: Vec3, value: u32 },
    Nothing,
}

/// A triggered pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupEffect {
    pub index: usize,
    pub kind: PickupKind,
    pub reward: Reward,
    pub score_delta: i64,
}

/// A pickup or box in the level
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub position: Vec3,
    pub kind: PickupKind,
    /// Amount granted (health, ammo, armor) or points for collectibles
    pub value: u32,
    /// One-way: false -> true
    pub collected: bool,
    /// Display rotation, radians in [0, τ)
    pub spin: f32,
}

impl Pickup {
    pub fn new(kind: PickupKind, position: Vec3, value: u32) -> Self {
        Self {
            position,
            kind,
            value,
            collected: false,
            spin: 0.0,
        }
    }

    /// Rotate for display
    pub fn animate(&mut self, dt: f32) {
        if !self.collected {
            self.spin = (self.spin + PICKUP_SPIN_RATE * dt).rem_euclid(std::f32::consts::TAU);
        }
    }
}

/// Whether `point` is within the trigger radius of an uncollected pickup
pub fn check_proximity(point: Vec3, pickup: &Pickup) -> bool {
    !pickup.collected && point.distance_squared(pickup.position) <= PICKUP_RADIUS * PICKUP_RADIUS
}

/// Mark a pickup collected and report its effect
///
/// Returns `None` if it was already collected.
pub fn trigger(index: usize, pickup: &mut Pickup) -> Option<PickupEffect> {
    if pickup.collected {
        return None;
    }
    pickup.collected = true;

    let reward = match pickup.kind {
        PickupKind::Health => Reward::Health(pickup.value),
        PickupKind::Ammo => Reward::Ammo(pickup.value),
        PickupKind::Armor => Reward::Armor(pickup.value),
        PickupKind::Collectible => Reward::Collect { value: pickup.value },
        PickupKind::RewardBox => Reward::SpawnCollectible {
            position: pickup.position + REWARD_DROP_OFFSET,
            value: pickup.value,
        },
        PickupKind::EmptyBox => Reward::Nothing,
    };

    Some(PickupEffect {
        index,
        kind: pickup.kind,
        reward,
        score_delta: pickup.kind.score_delta(),
    })
}

/// Apply actor-side rewards (resources are clamped by the actor)
pub fn apply_to_actor(reward: &Reward, actor: &mut Actor) {
    match *reward {
        Reward::Health(amount) => {
            actor.heal(amount);
        }
        Reward::Ammo(amount) => {
            actor.add_ammo(amount);
        }
        Reward::Armor(amount) => {
            actor.add_armor(amount);
        }
        Reward::Collect { .. } | Reward::SpawnCollectible { .. } | Reward::Nothing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_HEALTH, WEAPON_FIRE_INTERVAL};
    use crate::sim::actor::Loadout;

    #[test]
    fn test_proximity_uses_trigger_radius() {
        let pickup = Pickup::new(PickupKind::Ammo, Vec3::new(1.0, 0.0, 0.0), 10);
        assert!(check_proximity(Vec3::ZERO, &pickup));
        assert!(check_proximity(Vec3::new(1.0 + PICKUP_RADIUS - 0.1, 0.0, 0.0), &pickup));
        assert!(!check_proximity(Vec3::new(3.0, 0.0, 0.0), &pickup));
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let mut actor = Actor::new(Vec3::ZERO, 0.0, &Loadout::default(), WEAPON_FIRE_INTERVAL);
        actor.health = 50;
        let mut pickup = Pickup::new(PickupKind::Health, Vec3::ZERO, 25);

        let effect = trigger(0, &mut pickup).unwrap();
        apply_to_actor(&effect.reward, &mut actor);
        assert_eq!(actor.health, 75);
        assert_eq!(effect.score_delta, 5);

        assert!(trigger(0, &mut pickup).is_none());
        assert!(!check_proximity(Vec3::ZERO, &pickup));
        assert_eq!(actor.health, 75);
    }

    #[test]
    fn test_health_reward_clamps() {
        let mut actor = Actor::new(Vec3::ZERO, 0.0, &Loadout::default(), WEAPON_FIRE_INTERVAL);
        actor.health = 95;
        apply_to_actor(&Reward::Health(25), &mut actor);
        assert_eq!(actor.health, MAX_HEALTH);
    }

    #[test]
    fn test_reward_box_drops_collectible_at_offset() {
        let mut pickup = Pickup::new(PickupKind::RewardBox, Vec3::new(4.0, 1.0, -2.0), 100);
        let effect = trigger(3, &mut pickup).unwrap();
        assert_eq!(effect.index, 3);
        assert_eq!(
            effect.reward,
            Reward::SpawnCollectible {
                position: Vec3::new(4.0, 1.0, -0.5),
                value: 100
            }
        );
    }

    #[test]
    fn test_empty_box_opens_with_penalty() {
        let mut pickup = Pickup::new(PickupKind::EmptyBox, Vec3::ZERO, 0);
        let effect = trigger(0, &mut pickup).unwrap();
        assert!(pickup.collected);
        assert_eq!(effect.reward, Reward::Nothing);
        assert!(effect.score_delta < 0);
        assert!(trigger(0, &mut pickup).is_none());
    }

    #[test]
    fn test_spin_wraps() {
        let mut pickup = Pickup::new(PickupKind::Armor, Vec3::ZERO, 10);
        for _ in 0..100 {
            pickup.animate(0.1);
        }
        assert!(pickup.spin >= 0.0 && pickup.spin < std::f32::consts::TAU);
    }
}
