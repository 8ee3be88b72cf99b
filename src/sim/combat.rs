//! Hitscan weapon resolution
//!
//! A shot is a ray from the eye along the view direction. Live enemies are
//! tested as spheres; static geometry occludes. The closest enemy in front of
//! any wall takes the hit, ties going to the earlier enemy in the list.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ai::Enemy;
use super::collision::{Ray, ray_intersects_sphere};
use super::world::World;
use crate::consts::*;

/// Weapon numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub damage: u32,
    pub range: f32,
    pub fire_interval: f32,
    pub hit_bonus: i64,
    pub kill_bonus: i64,
    /// Muzzle offset in camera space (right, up, forward)
    pub muzzle_offset: Vec3,
    pub tracer_duration: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            damage: WEAPON_DAMAGE,
            range: WEAPON_RANGE,
            fire_interval: WEAPON_FIRE_INTERVAL,
            hit_bonus: HIT_BONUS,
            kill_bonus: KILL_BONUS,
            muzzle_offset: Vec3::from_array(MUZZLE_OFFSET),
            tracer_duration: TRACER_DURATION,
        }
    }
}

/// Where the shot comes from, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Camera basis used to place the muzzle
    pub right: Vec3,
    pub up: Vec3,
}

impl Shot {
    /// Build a shot looking along `direction` with a level horizon
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let forward = direction.normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = right.cross(forward).normalize_or_zero();
        Self {
            origin,
            direction: forward,
            right,
            up,
        }
    }

    /// Muzzle position: camera-local offset transformed to world space
    pub fn muzzle(&self, offset: Vec3) -> Vec3 {
        self.origin + self.right * offset.x + self.up * offset.y + self.direction * offset.z
    }
}

/// Visual line segment for a fired shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracer {
    pub start: Vec3,
    pub end: Vec3,
    pub remaining: f32,
    pub duration: f32,
}

impl Tracer {
    /// Fade fraction for the renderer, 1 when fresh
    pub fn life_fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Age the tracer; returns false once it has expired
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining > 0.0
    }
}

/// The enemy a shot landed on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotHit {
    pub target: usize,
    pub distance: f32,
    pub point: Vec3,
    pub killed: bool,
}

/// Result of a fire request
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FireResult {
    pub consumed_ammo: bool,
    pub hit: Option<ShotHit>,
    /// Where the shot struck a wall, when nothing alive was in front of it
    pub impact: Option<Vec3>,
    pub tracer: Option<Tracer>,
    pub score_delta: i64,
}

/// Fire one round
///
/// With no ammo nothing happens: no tracer, no ammo change, no damage.
pub fn fire(
    shot: &Shot,
    ammo: &mut u32,
    enemies: &mut [Enemy],
    world: &World,
    tuning: &WeaponTuning,
) -> FireResult {
    if *ammo == 0 {
        return FireResult::default();
    }
    *ammo -= 1;

    let mut result = FireResult {
        consumed_ammo: true,
        ..Default::default()
    };

    let ray = Ray::new(shot.origin, shot.direction);
    let wall = world.raycast_static(&ray, tuning.range);
    let reach = wall.unwrap_or(tuning.range);

    let mut closest: Option<(usize, f32)> = None;
    for (i, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() {
            continue;
        }
        let Some(t) = ray_intersects_sphere(&ray, &enemy.hit_sphere()) else {
            continue;
        };
        if t > reach {
            continue;
        }
        // Strict comparison keeps the earlier enemy on ties
        if closest.is_none_or(|(_, best)| t < best) {
            closest = Some((i, t));
        }
    }

    let end = match closest {
        Some((target, distance)) => {
            let killed = enemies[target].take_damage(tuning.damage);
            result.score_delta = tuning.hit_bonus + if killed { tuning.kill_bonus } else { 0 };
            let point = ray.at(distance);
            result.hit = Some(ShotHit {
                target,
                distance,
                point,
                killed,
            });
            point
        }
        None => {
            let end = ray.at(reach);
            if wall.is_some() {
                result.impact = Some(end);
            }
            end
        }
    };

    result.tracer = Some(Tracer {
        start: shot.muzzle(tuning.muzzle_offset),
        end,
        remaining: tuning.tracer_duration,
        duration: tuning.tracer_duration,
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ai::{BehaviorState, EnemyKind, PatrolAxis, PatrolRoute};
    use crate::sim::collision::Aabb;
    use crate::sim::world::LevelBounds;

    fn open_world() -> World {
        World {
            bounds: LevelBounds::default(),
            floor: Some(0.0),
            colliders: Vec::new(),
            platforms: Vec::new(),
        }
    }

    fn grunt_at(x: f32, z: f32) -> Enemy {
        Enemy::new(EnemyKind::Grunt, Vec3::new(x, 0.0, z), PatrolRoute::new(PatrolAxis::X, x, x))
    }

    /// Eye at hit-sphere height looking down -Z
    fn shot_down_z() -> Shot {
        Shot::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_closest_enemy_takes_the_hit() {
        let world = open_world();
        let mut enemies = vec![grunt_at(0.0, -20.0), grunt_at(0.0, -10.0)];
        let mut ammo = 5;

        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &WeaponTuning::default());
        let hit = result.hit.unwrap();
        assert_eq!(hit.target, 1);
        assert!((hit.distance - 9.4).abs() < 1e-3);
        assert_eq!(ammo, 4);
    }

    #[test]
    fn test_tie_goes_to_insertion_order() {
        let world = open_world();
        // Same distance, mirrored off the ray
        let mut enemies = vec![grunt_at(0.3, -10.0), grunt_at(-0.3, -10.0)];
        let mut ammo = 1;
        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &WeaponTuning::default());
        assert_eq!(result.hit.unwrap().target, 0);
    }

    #[test]
    fn test_one_shot_kill_scores_hit_and_kill() {
        let world = open_world();
        let mut enemies = vec![grunt_at(0.0, -10.0)];
        let tuning = WeaponTuning::default();
        let mut ammo = 1;

        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &tuning);
        assert!(result.consumed_ammo);
        assert_eq!(ammo, 0);
        assert_eq!(enemies[0].state, BehaviorState::Dead);
        assert_eq!(result.score_delta, tuning.hit_bonus + tuning.kill_bonus);
        assert!(result.hit.unwrap().killed);
        assert!(result.tracer.is_some());

        let again = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &tuning);
        assert!(!again.consumed_ammo);
        assert!(again.tracer.is_none());
        assert_eq!(again.score_delta, 0);
        assert_eq!(ammo, 0);
    }

    #[test]
    fn test_dead_enemies_are_transparent() {
        let world = open_world();
        let mut enemies = vec![grunt_at(0.0, -5.0), grunt_at(0.0, -10.0)];
        enemies[0].take_damage(100);
        let mut ammo = 1;
        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &WeaponTuning::default());
        assert_eq!(result.hit.unwrap().target, 1);
    }

    #[test]
    fn test_walls_block_shots() {
        let world = World {
            colliders: vec![Aabb::new(Vec3::new(-2.0, 0.0, -6.0), Vec3::new(2.0, 3.0, -5.0))],
            ..open_world()
        };
        let mut enemies = vec![grunt_at(0.0, -10.0)];
        let mut ammo = 1;
        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &WeaponTuning::default());
        assert!(result.hit.is_none());
        assert!(result.consumed_ammo);
        let impact = result.impact.unwrap();
        assert!((impact.z - (-5.0)).abs() < 1e-4);
        assert_eq!(result.tracer.unwrap().end, impact);
        assert_eq!(enemies[0].health, enemies[0].profile().health);
    }

    #[test]
    fn test_miss_tracer_runs_to_max_range() {
        let world = open_world();
        let mut enemies = Vec::new();
        let mut ammo = 1;
        let tuning = WeaponTuning::default();
        let result = fire(&shot_down_z(), &mut ammo, &mut enemies, &world, &tuning);
        let tracer = result.tracer.unwrap();
        assert!((tracer.end.z - (-tuning.range)).abs() < 1e-3);
        assert!(result.impact.is_none());
    }

    #[test]
    fn test_muzzle_offset_in_camera_space() {
        let shot = shot_down_z();
        // Looking down -Z: right is +X, up is +Y
        let muzzle = shot.muzzle(Vec3::new(0.25, -0.2, 0.5));
        assert!((muzzle - Vec3::new(0.25, 0.8, -0.5)).length() < 1e-5);
    }

    #[test]
    fn test_tracer_expires_after_duration() {
        let mut tracer = Tracer {
            start: Vec3::ZERO,
            end: Vec3::ONE,
            remaining: 0.1,
            duration: 0.1,
        };
        assert!(tracer.tick(0.05));
        assert!((tracer.life_fraction() - 0.5).abs() < 1e-5);
        assert!(!tracer.tick(0.05));
    }
}
