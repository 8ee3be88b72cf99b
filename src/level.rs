//! Level layouts
//!
//! A layout is the immutable snapshot the simulation is built from at load
//! time: bounds, solid boxes, moving platforms, enemy and pickup spawns and the
//! player spawn. Layouts come from JSON files or the two built-in levels.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::ai::{Enemy, EnemyKind, PatrolAxis, PatrolRoute};
use crate::sim::collision::Aabb;
use crate::sim::pickups::{Pickup, PickupKind};
use crate::sim::world::{LevelBounds, MovingPlatform, World};

/// Errors that can occur when loading a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in level '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid level: {0}")]
    Invalid(String),
}

/// Half-width of the patrol used when a spawn does not give one
const DEFAULT_PATROL_HALF_WIDTH: f32 = 3.0;

/// Where and what an enemy is at level start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub position: Vec3,
    /// Defaults to a short run along X centered on the spawn
    #[serde(default)]
    pub patrol: Option<PatrolRoute>,
}

impl EnemySpawn {
    pub fn new(kind: EnemyKind, position: Vec3, axis: PatrolAxis, a: f32, b: f32) -> Self {
        Self {
            kind,
            position,
            patrol: Some(PatrolRoute::new(axis, a, b)),
        }
    }

    pub fn spawn(&self) -> Enemy {
        let route = match self.patrol {
            Some(route) => PatrolRoute::new(route.axis, route.min, route.max),
            None => PatrolRoute::new(
                PatrolAxis::X,
                self.position.x - DEFAULT_PATROL_HALF_WIDTH,
                self.position.x + DEFAULT_PATROL_HALF_WIDTH,
            ),
        };
        Enemy::new(self.kind, self.position, route)
    }
}

/// Where and what a pickup is at level start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub kind: PickupKind,
    pub position: Vec3,
    /// Defaults to the kind's standard amount
    #[serde(default)]
    pub value: Option<u32>,
}

impl PickupSpawn {
    pub fn new(kind: PickupKind, position: Vec3) -> Self {
        Self {
            kind,
            position,
            value: None,
        }
    }

    pub fn spawn(&self) -> Pickup {
        Pickup::new(
            self.kind,
            self.position,
            self.value.unwrap_or_else(|| self.kind.default_value()),
        )
    }
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub name: String,
    pub bounds: LevelBounds,
    /// Infinite floor height; `None` for a level floating over a void
    pub floor: Option<f32>,
    pub colliders: Vec<Aabb>,
    pub platforms: Vec<MovingPlatform>,
    pub enemies: Vec<EnemySpawn>,
    pub pickups: Vec<PickupSpawn>,
    pub player_spawn: Vec3,
    /// Radians, 0 looks down -Z
    pub player_yaw: f32,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            name: "empty".to_string(),
            bounds: LevelBounds::default(),
            floor: Some(0.0),
            colliders: Vec::new(),
            platforms: Vec::new(),
            enemies: Vec::new(),
            pickups: Vec::new(),
            player_spawn: Vec3::ZERO,
            player_yaw: 0.0,
        }
    }
}

impl LevelLayout {
    /// Parse and validate a layout from JSON
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let layout: Self = serde_json::from_str(json).map_err(|source| LevelError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a layout file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout: Self = serde_json::from_str(&json).map_err(|source| LevelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        layout.validate()?;
        log::info!(
            "Loaded level '{}' from {} ({} colliders, {} enemies, {} pickups)",
            layout.name,
            path.display(),
            layout.colliders.len(),
            layout.enemies.len(),
            layout.pickups.len()
        );
        Ok(layout)
    }

    /// Reject layouts the simulation cannot run
    pub fn validate(&self) -> Result<(), LevelError> {
        let b = &self.bounds;
        let finite = [b.min_x, b.max_x, b.min_z, b.max_z, b.death_height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || b.min_x >= b.max_x || b.min_z >= b.max_z {
            return Err(LevelError::Invalid(format!(
                "empty bounds x [{}, {}] z [{}, {}]",
                b.min_x, b.max_x, b.min_z, b.max_z
            )));
        }
        if !self.player_spawn.is_finite() || !b.contains_horizontal(self.player_spawn) {
            return Err(LevelError::Invalid(format!(
                "player spawn {} outside bounds",
                self.player_spawn
            )));
        }
        if self.player_spawn.y <= b.death_height {
            return Err(LevelError::Invalid(format!(
                "player spawn height {} at or below death height {}",
                self.player_spawn.y, b.death_height
            )));
        }
        if let Some(i) = self
            .platforms
            .iter()
            .position(|p| !p.speed.is_finite() || p.speed < 0.0)
        {
            return Err(LevelError::Invalid(format!("platform {i} has a negative speed")));
        }
        if let Some(i) = self.enemies.iter().position(|e| !e.position.is_finite()) {
            return Err(LevelError::Invalid(format!("enemy {i} has a non-finite position")));
        }
        Ok(())
    }

    /// Static and scripted geometry for a fresh run
    pub fn build_world(&self) -> World {
        World {
            bounds: self.bounds,
            floor: self.floor,
            colliders: self.colliders.clone(),
            platforms: self
                .platforms
                .iter()
                .map(|p| MovingPlatform::new(p.start, p.end, p.half_extents, p.speed))
                .collect(),
        }
    }

    pub fn spawn_enemies(&self) -> Vec<Enemy> {
        self.enemies.iter().map(EnemySpawn::spawn).collect()
    }

    pub fn spawn_pickups(&self) -> Vec<Pickup> {
        self.pickups.iter().map(PickupSpawn::spawn).collect()
    }

    /// Walled arena on a flat floor: crates, cover and a mixed squad
    pub fn shooter_arena() -> Self {
        let crate_box = |x: f32, z: f32, h: f32| {
            Aabb::new(Vec3::new(x - 1.0, 0.0, z - 1.0), Vec3::new(x + 1.0, h, z + 1.0))
        };
        Self {
            name: "Shooter Arena".to_string(),
            bounds: LevelBounds {
                min_x: -30.0,
                max_x: 30.0,
                min_z: -30.0,
                max_z: 30.0,
                death_height: -20.0,
            },
            floor: Some(0.0),
            colliders: vec![
                // Cover wall across the middle, open at both ends
                Aabb::new(Vec3::new(-10.0, 0.0, -1.0), Vec3::new(-4.0, 3.0, 0.0)),
                Aabb::new(Vec3::new(4.0, 0.0, -1.0), Vec3::new(10.0, 3.0, 0.0)),
                crate_box(-2.0, 6.0, 1.0),
                crate_box(3.0, 8.0, 1.5),
                crate_box(-14.0, -12.0, 1.0),
                crate_box(15.0, -8.0, 2.0),
                // Sniper ledge in the back
                Aabb::new(Vec3::new(-6.0, 0.0, -28.0), Vec3::new(6.0, 2.0, -25.0)),
            ],
            platforms: Vec::new(),
            enemies: vec![
                EnemySpawn::new(EnemyKind::Grunt, Vec3::new(-6.0, 0.0, -6.0), PatrolAxis::X, -10.0, -2.0),
                EnemySpawn::new(EnemyKind::Grunt, Vec3::new(6.0, 0.0, -10.0), PatrolAxis::X, 2.0, 10.0),
                EnemySpawn::new(EnemyKind::Drone, Vec3::new(0.0, 0.0, -18.0), PatrolAxis::Z, -22.0, -14.0),
                EnemySpawn::new(EnemyKind::Brute, Vec3::new(14.0, 0.0, -18.0), PatrolAxis::Z, -22.0, -14.0),
                EnemySpawn::new(EnemyKind::Grunt, Vec3::new(-14.0, 0.0, -20.0), PatrolAxis::X, -18.0, -10.0),
            ],
            pickups: vec![
                PickupSpawn::new(PickupKind::Health, Vec3::new(10.0, 0.0, 12.0)),
                PickupSpawn::new(PickupKind::Ammo, Vec3::new(-10.0, 0.0, 12.0)),
                PickupSpawn::new(PickupKind::Armor, Vec3::new(0.0, 0.0, -4.0)),
                PickupSpawn::new(PickupKind::Health, Vec3::new(20.0, 0.0, -20.0)),
                PickupSpawn::new(PickupKind::Ammo, Vec3::new(-20.0, 0.0, -4.0)),
            ],
            player_spawn: Vec3::new(0.0, 0.0, 20.0),
            player_yaw: 0.0,
        }
    }

    /// Floating pads over a void, linked by jumps and a sliding platform
    pub fn space_station() -> Self {
        let pad = |x: f32, z: f32, half: f32, top: f32| {
            Aabb::new(Vec3::new(x - half, top - 1.0, z - half), Vec3::new(x + half, top, z + half))
        };
        Self {
            name: "Space Station".to_string(),
            bounds: LevelBounds {
                min_x: -20.0,
                max_x: 30.0,
                min_z: -40.0,
                max_z: 10.0,
                death_height: -10.0,
            },
            floor: None,
            colliders: vec![
                // Spawn pad
                pad(0.0, 0.0, 3.0, 0.0),
                // East pad, a short jump across
                pad(8.0, 0.0, 3.0, 0.0),
                // Raised north pad
                pad(0.0, -9.0, 3.0, 1.0),
                // Far pad reached by the sliding platform
                pad(8.0, -24.0, 3.0, 0.0),
                // Pillar on the far pad
                Aabb::new(Vec3::new(7.5, 0.0, -22.5), Vec3::new(8.5, 3.0, -21.5)),
            ],
            platforms: vec![MovingPlatform::new(
                Vec3::new(8.0, -0.5, -5.0),
                Vec3::new(8.0, -0.5, -19.0),
                Vec3::new(2.0, 0.5, 2.0),
                2.0,
            )],
            enemies: vec![
                EnemySpawn::new(EnemyKind::Sentinel, Vec3::new(8.0, 0.0, 1.0), PatrolAxis::X, 6.0, 10.0),
                EnemySpawn::new(EnemyKind::Sentinel, Vec3::new(8.0, 0.0, -26.0), PatrolAxis::X, 6.0, 10.0),
                EnemySpawn::new(EnemyKind::Drone, Vec3::new(0.0, 1.0, -10.0), PatrolAxis::X, -2.0, 2.0),
            ],
            pickups: vec![
                PickupSpawn::new(PickupKind::RewardBox, Vec3::new(9.5, 0.0, -2.0)),
                PickupSpawn::new(PickupKind::RewardBox, Vec3::new(1.5, 1.0, -10.5)),
                PickupSpawn::new(PickupKind::RewardBox, Vec3::new(9.5, 0.0, -25.5)),
                PickupSpawn::new(PickupKind::EmptyBox, Vec3::new(-1.5, 1.0, -7.5)),
                PickupSpawn::new(PickupKind::Health, Vec3::new(6.5, 0.0, -23.0)),
                PickupSpawn::new(PickupKind::Ammo, Vec3::new(-2.0, 0.0, 2.0)),
            ],
            player_spawn: Vec3::ZERO,
            player_yaw: 0.0,
        }
    }
}
