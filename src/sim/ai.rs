//! Enemy behavior: patrol, chase, attack, dead
//!
//! Distances are measured on the horizontal plane. Chase is entered inside
//! `detection_radius` and left only beyond the larger `lose_radius`, so an
//! actor standing on the boundary does not make the enemy flap between states.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Sphere, box_intersects, resolve_box_overlap};
use super::world::World;
use crate::consts::{HIT_INVINCIBILITY, KNOCKBACK_SPEED};
use crate::{forward_to_yaw, horizontal};

/// Horizontal body half-width used against walls
const ENEMY_BODY_RADIUS: f32 = 0.4;
/// Closer than this the enemy stops advancing
const CHASE_STOP_DISTANCE: f32 = 0.1;

/// Behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    Patrol,
    Chase,
    Attack,
    Dead,
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Shooter rank and file
    Grunt,
    /// Fast, fragile
    Drone,
    /// Slow, tough, hits hard
    Brute,
    /// Station guard; patrols platforms and rushes when close
    Sentinel,
}

/// Per-kind stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub health: u32,
    pub damage: u32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub urgent_speed: f32,
    pub urgent_distance: f32,
    pub detection_radius: f32,
    pub lose_radius: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Hit sphere radius and its height above the feet
    pub hit_radius: f32,
    pub hit_offset: f32,
    pub body_height: f32,
}

impl EnemyKind {
    pub fn profile(&self) -> EnemyProfile {
        match self {
            EnemyKind::Grunt => EnemyProfile {
                health: 34,
                damage: 10,
                patrol_speed: 1.5,
                chase_speed: 3.0,
                urgent_speed: 3.0,
                urgent_distance: 0.0,
                detection_radius: 12.0,
                lose_radius: 15.0,
                attack_range: 1.6,
                attack_cooldown: 1.0,
                hit_radius: 0.6,
                hit_offset: 1.0,
                body_height: 1.8,
            },
            EnemyKind::Drone => EnemyProfile {
                health: 20,
                damage: 5,
                patrol_speed: 2.5,
                chase_speed: 4.5,
                urgent_speed: 5.5,
                urgent_distance: 4.0,
                detection_radius: 15.0,
                lose_radius: 19.0,
                attack_range: 1.4,
                attack_cooldown: 0.6,
                hit_radius: 0.45,
                hit_offset: 1.4,
                body_height: 1.8,
            },
            EnemyKind::Brute => EnemyProfile {
                health: 102,
                damage: 25,
                patrol_speed: 1.0,
                chase_speed: 2.2,
                urgent_speed: 2.2,
                urgent_distance: 0.0,
                detection_radius: 10.0,
                lose_radius: 13.0,
                attack_range: 2.0,
                attack_cooldown: 1.6,
                hit_radius: 0.9,
                hit_offset: 1.2,
                body_height: 2.4,
            },
            EnemyKind::Sentinel => EnemyProfile {
                health: 34,
                damage: 15,
                patrol_speed: 2.0,
                chase_speed: 2.5,
                urgent_speed: 4.0,
                urgent_distance: 3.0,
                detection_radius: 6.0,
                lose_radius: 7.5,
                attack_range: 1.2,
                attack_cooldown: 1.2,
                hit_radius: 0.6,
                hit_offset: 0.8,
                body_height: 1.6,
            },
        }
    }
}

/// Horizontal axis a patrol runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolAxis {
    X,
    Z,
}

impl PatrolAxis {
    fn index(&self) -> usize {
        match self {
            PatrolAxis::X => 0,
            PatrolAxis::Z => 2,
        }
    }

    fn unit(&self) -> Vec3 {
        match self {
            PatrolAxis::X => Vec3::X,
            PatrolAxis::Z => Vec3::Z,
        }
    }
}

/// Closed interval an enemy oscillates across
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    pub axis: PatrolAxis,
    pub min: f32,
    pub max: f32,
}

impl PatrolRoute {
    pub fn new(axis: PatrolAxis, a: f32, b: f32) -> Self {
        Self {
            axis,
            min: a.min(b),
            max: a.max(b),
        }
    }
}

/// A strike the actor has to absorb
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub enemy: usize,
    /// Zero when the actor was invincible
    pub damage: u32,
    pub knockback: Vec3,
    pub invincibility: f32,
}

/// What the AI needs to know about the actor
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub position: Vec3,
    pub invincible: bool,
}

/// An enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub health: u32,
    pub state: BehaviorState,
    pub patrol: PatrolRoute,
    /// +1 or -1 along the patrol axis
    pub patrol_dir: f32,
    pub attack_cooldown: f32,
    profile: EnemyProfile,
}

impl Enemy {
    pub fn new(kind: EnemyKind, position: Vec3, patrol: PatrolRoute) -> Self {
        let profile = kind.profile();
        let mut enemy = Self {
            kind,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            health: profile.health,
            state: BehaviorState::Patrol,
            patrol,
            patrol_dir: 1.0,
            attack_cooldown: 0.0,
            profile,
        };
        enemy.face(patrol.axis.unit());
        enemy
    }

    #[inline]
    pub fn profile(&self) -> &EnemyProfile {
        &self.profile
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != BehaviorState::Dead
    }

    /// Sphere the hitscan weapon tests against
    pub fn hit_sphere(&self) -> Sphere {
        Sphere::new(
            self.position + Vec3::Y * self.profile.hit_offset,
            self.profile.hit_radius,
        )
    }

    pub fn body(&self) -> Aabb {
        Aabb::from_feet(self.position, ENEMY_BODY_RADIUS, self.profile.body_height)
    }

    /// Apply weapon damage. Returns true if this hit killed the enemy.
    ///
    /// Dead enemies take no damage, so a kill is reported exactly once.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.die();
            return true;
        }
        false
    }

    fn die(&mut self) {
        self.state = BehaviorState::Dead;
        self.velocity = Vec3::ZERO;
    }

    fn face(&mut self, dir: Vec3) {
        let flat = horizontal(dir);
        if flat.length_squared() > 1e-8 {
            self.yaw = forward_to_yaw(flat);
        }
    }

    /// Run one tick of behavior. Returns a strike if the enemy attacked.
    pub fn update(&mut self, index: usize, target: &Target, world: &World, dt: f32) -> Option<Strike> {
        if self.health == 0 && self.state != BehaviorState::Dead {
            self.die();
        }
        if self.state == BehaviorState::Dead {
            return None;
        }

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        let to_target = horizontal(target.position - self.position);
        let distance = to_target.length();
        self.state = self.next_state(distance);

        let strike = match self.state {
            BehaviorState::Patrol => {
                self.patrol_step(dt);
                None
            }
            BehaviorState::Chase => {
                self.chase_step(to_target, distance, world, dt);
                None
            }
            BehaviorState::Attack => {
                self.velocity = Vec3::ZERO;
                self.face(to_target);
                self.try_attack(index, to_target, target)
            }
            BehaviorState::Dead => None,
        };

        self.resolve_walls(world);
        strike
    }

    fn next_state(&self, distance: f32) -> BehaviorState {
        let p = &self.profile;
        match self.state {
            BehaviorState::Patrol if distance < p.detection_radius => {
                if distance < p.attack_range {
                    BehaviorState::Attack
                } else {
                    BehaviorState::Chase
                }
            }
            BehaviorState::Chase | BehaviorState::Attack if distance >= p.lose_radius => {
                BehaviorState::Patrol
            }
            BehaviorState::Chase if distance < p.attack_range => BehaviorState::Attack,
            BehaviorState::Attack if distance >= p.attack_range => BehaviorState::Chase,
            state => state,
        }
    }

    /// Oscillate across the patrol interval, turning exactly at each bound
    fn patrol_step(&mut self, dt: f32) {
        let axis = self.patrol.axis.index();
        let (min, max) = (self.patrol.min, self.patrol.max);
        let current = self.position[axis];

        // Off the route after a chase: head back toward it
        if current > max {
            self.patrol_dir = -1.0;
        } else if current < min {
            self.patrol_dir = 1.0;
        }

        let mut next = current + self.patrol_dir * self.profile.patrol_speed * dt;
        let mut reversed = false;
        if self.patrol_dir > 0.0 && current <= max && next >= max {
            next = max;
            reversed = true;
        } else if self.patrol_dir < 0.0 && current >= min && next <= min {
            next = min;
            reversed = true;
        }

        self.position[axis] = next;
        self.velocity = self.patrol.axis.unit() * self.patrol_dir * self.profile.patrol_speed;
        self.face(self.velocity);
        if reversed {
            self.patrol_dir = -self.patrol_dir;
            self.face(self.patrol.axis.unit() * self.patrol_dir);
        }
    }

    fn chase_step(&mut self, to_target: Vec3, distance: f32, world: &World, dt: f32) {
        if distance <= CHASE_STOP_DISTANCE {
            self.velocity = Vec3::ZERO;
            return;
        }
        let p = &self.profile;
        let speed = if distance < p.urgent_distance {
            p.urgent_speed
        } else {
            p.chase_speed
        };
        let dir = to_target / distance;
        // Never overshoot the target in one tick
        let travel = (speed * dt).min(distance - CHASE_STOP_DISTANCE);
        self.face(dir);

        // Hold at a ledge: the body center must stay over something solid
        let next = self.position + dir * travel;
        let center = Aabb::from_feet(next, 0.0, self.profile.body_height);
        if world.ground_below(&center, next.y).is_none() {
            self.velocity = Vec3::ZERO;
            return;
        }
        self.velocity = dir * speed;
        self.position = next;
    }

    fn try_attack(&mut self, index: usize, to_target: Vec3, target: &Target) -> Option<Strike> {
        if self.attack_cooldown > 0.0 {
            return None;
        }
        self.attack_cooldown = self.profile.attack_cooldown;

        let away = to_target.normalize_or_zero();
        let away = if away == Vec3::ZERO { crate::yaw_to_forward(self.yaw) } else { away };
        let (damage, invincibility) = if target.invincible {
            (0, 0.0)
        } else {
            (self.profile.damage, HIT_INVINCIBILITY)
        };
        Some(Strike {
            enemy: index,
            damage,
            knockback: away * KNOCKBACK_SPEED,
            invincibility,
        })
    }

    /// Keep the body out of static walls (horizontal push only)
    fn resolve_walls(&mut self, world: &World) {
        for solid in &world.colliders {
            let body = self.body();
            if !box_intersects(&body, solid) {
                continue;
            }
            let push = resolve_box_overlap(&body, solid);
            self.position += horizontal(push);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::LevelBounds;

    const DT: f32 = 0.1;

    fn open_world() -> World {
        World {
            bounds: LevelBounds::default(),
            floor: Some(0.0),
            colliders: Vec::new(),
            platforms: Vec::new(),
        }
    }

    fn grunt() -> Enemy {
        Enemy::new(EnemyKind::Grunt, Vec3::ZERO, PatrolRoute::new(PatrolAxis::X, -2.0, 2.0))
    }

    fn far_target() -> Target {
        Target {
            position: Vec3::new(0.0, 0.0, 40.0),
            invincible: false,
        }
    }

    #[test]
    fn test_patrol_turns_exactly_at_bounds() {
        let world = open_world();
        let mut enemy = grunt();
        let target = far_target();

        // 1.5 u/s for 0.1s per tick; after enough ticks it must sit on max
        let mut hit_max = false;
        for _ in 0..20 {
            enemy.update(0, &target, &world, DT);
            assert!(enemy.position.x <= 2.0 && enemy.position.x >= -2.0);
            if enemy.position.x == 2.0 {
                hit_max = true;
                assert_eq!(enemy.patrol_dir, -1.0);
                // Facing flipped to -X
                assert!((enemy.yaw + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
                break;
            }
        }
        assert!(hit_max);

        enemy.update(0, &target, &world, DT);
        assert!(enemy.position.x < 2.0);
        assert_eq!(enemy.state, BehaviorState::Patrol);
    }

    #[test]
    fn test_detection_and_hysteresis() {
        let world = open_world();
        let mut enemy = grunt();
        let profile = *enemy.profile();

        let inside = Target {
            position: Vec3::new(0.0, 0.0, profile.detection_radius - 0.5),
            invincible: false,
        };
        enemy.update(0, &inside, &world, DT);
        assert_eq!(enemy.state, BehaviorState::Chase);

        // Between detection and lose radius: keep chasing
        let boundary = Target {
            position: enemy.position + Vec3::new(0.0, 0.0, profile.detection_radius + 1.0),
            invincible: false,
        };
        enemy.update(0, &boundary, &world, DT);
        assert_eq!(enemy.state, BehaviorState::Chase);

        let gone = Target {
            position: enemy.position + Vec3::new(0.0, 0.0, profile.lose_radius + 1.0),
            invincible: false,
        };
        enemy.update(0, &gone, &world, DT);
        assert_eq!(enemy.state, BehaviorState::Patrol);
    }

    #[test]
    fn test_chase_moves_toward_target_and_faces_it() {
        let world = open_world();
        let mut enemy = grunt();
        enemy.state = BehaviorState::Chase;
        let target = Target {
            position: Vec3::new(5.0, 0.0, 0.0),
            invincible: false,
        };

        enemy.update(0, &target, &world, DT);
        assert!((enemy.position.x - 0.3).abs() < 1e-5);
        assert!((enemy.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_urgent_speed_inside_short_range() {
        let world = open_world();
        let mut enemy = Enemy::new(
            EnemyKind::Sentinel,
            Vec3::ZERO,
            PatrolRoute::new(PatrolAxis::Z, -1.0, 1.0),
        );
        enemy.state = BehaviorState::Chase;
        let target = Target {
            position: Vec3::new(2.5, 0.0, 0.0),
            invincible: false,
        };
        enemy.update(0, &target, &world, DT);
        let urgent = enemy.profile().urgent_speed;
        assert!((enemy.position.x - urgent * DT).abs() < 1e-5);
    }

    #[test]
    fn test_attack_respects_cooldown_and_invincibility() {
        let world = open_world();
        let mut enemy = grunt();
        let target = Target {
            position: Vec3::new(1.0, 0.0, 0.0),
            invincible: false,
        };

        let strike = enemy.update(3, &target, &world, DT).unwrap();
        assert_eq!(enemy.state, BehaviorState::Attack);
        assert_eq!(strike.enemy, 3);
        assert_eq!(strike.damage, enemy.profile().damage);
        assert!(strike.knockback.x > 0.0);
        assert!(strike.invincibility > 0.0);

        // Cooling down
        assert!(enemy.update(3, &target, &world, DT).is_none());

        // Ready again, but the actor is invincible: knockback only
        enemy.attack_cooldown = 0.0;
        let shielded = Target {
            invincible: true,
            ..target
        };
        let strike = enemy.update(3, &shielded, &world, DT).unwrap();
        assert_eq!(strike.damage, 0);
        assert!(strike.knockback.length() > 0.0);
    }

    #[test]
    fn test_dead_is_terminal() {
        let world = open_world();
        let mut enemy = grunt();
        assert!(enemy.take_damage(34));
        assert_eq!(enemy.state, BehaviorState::Dead);

        // No second kill, no movement, no strikes
        assert!(!enemy.take_damage(34));
        let target = Target {
            position: Vec3::new(0.5, 0.0, 0.0),
            invincible: false,
        };
        assert!(enemy.update(0, &target, &world, DT).is_none());
        assert_eq!(enemy.state, BehaviorState::Dead);
        assert_eq!(enemy.position, Vec3::ZERO);
    }

    #[test]
    fn test_attack_falls_back_to_chase_outside_range() {
        let world = open_world();
        let mut enemy = grunt();
        let range = enemy.profile().attack_range;
        let close = Target {
            position: Vec3::new(range - 0.5, 0.0, 0.0),
            invincible: false,
        };
        enemy.update(0, &close, &world, DT);
        assert_eq!(enemy.state, BehaviorState::Attack);

        // Just outside attack range, well inside the lose radius
        let stepped_back = Target {
            position: enemy.position + Vec3::new(range + 0.05, 0.0, 0.0),
            invincible: false,
        };
        assert!(enemy.update(0, &stepped_back, &world, DT).is_none());
        assert_eq!(enemy.state, BehaviorState::Chase);
        assert!(enemy.velocity.x > 0.0);
    }

    #[test]
    fn test_chasers_stop_at_pad_edge() {
        // Void level: a single 4x4 pad under the enemy
        let world = World {
            floor: None,
            colliders: vec![Aabb::new(Vec3::new(-2.0, -1.0, -2.0), Vec3::new(2.0, 0.0, 2.0))],
            ..open_world()
        };
        let mut enemy = grunt();
        enemy.state = BehaviorState::Chase;
        let target = Target {
            position: Vec3::new(8.0, 0.0, 0.0),
            invincible: false,
        };
        for _ in 0..40 {
            enemy.update(0, &target, &world, DT);
        }
        assert_eq!(enemy.state, BehaviorState::Chase);
        assert!(enemy.position.x < 2.0);
        assert!(enemy.position.x > 1.5);
        assert_eq!(enemy.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_walls_stop_chasers() {
        let world = World {
            colliders: vec![Aabb::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 3.0, 5.0))],
            ..open_world()
        };
        let mut enemy = grunt();
        enemy.state = BehaviorState::Chase;
        let target = Target {
            position: Vec3::new(6.0, 0.0, 0.0),
            invincible: false,
        };
        for _ in 0..30 {
            enemy.update(0, &target, &world, DT);
        }
        assert!(enemy.position.x <= 1.0 - ENEMY_BODY_RADIUS + 1e-4);
    }
}
