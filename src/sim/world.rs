//! Static and scripted level geometry
//!
//! The world is a brute-force list of boxes: solid colliders (walls, crates,
//! platform tops) plus platforms that slide back and forth between two points.
//! Ground height is the highest surface top under a footprint that the feet
//! are already at or above.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::STEP_EPSILON;

/// Horizontal play area plus the fall-out-of-world threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    /// Feet below this height end the run
    pub death_height: f32,
}

impl LevelBounds {
    /// Clamp a horizontal position so a body of `radius` stays inside
    pub fn clamp_horizontal(&self, pos: Vec3, radius: f32) -> Vec3 {
        let (lo_x, hi_x) = padded(self.min_x, self.max_x, radius);
        let (lo_z, hi_z) = padded(self.min_z, self.max_z, radius);
        Vec3::new(pos.x.clamp(lo_x, hi_x), pos.y, pos.z.clamp(lo_z, hi_z))
    }

    pub fn contains_horizontal(&self, pos: Vec3) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.z >= self.min_z && pos.z <= self.max_z
    }
}

impl Default for LevelBounds {
    fn default() -> Self {
        Self {
            min_x: -50.0,
            max_x: 50.0,
            min_z: -50.0,
            max_z: 50.0,
            death_height: -20.0,
        }
    }
}

/// Shrink [lo, hi] by `pad` on both sides, collapsing to the midpoint if too narrow
fn padded(lo: f32, hi: f32, pad: f32) -> (f32, f32) {
    if hi - lo <= 2.0 * pad {
        let mid = (lo + hi) * 0.5;
        (mid, mid)
    } else {
        (lo + pad, hi - pad)
    }
}

/// A platform sliding between two center points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub start: Vec3,
    pub end: Vec3,
    pub half_extents: Vec3,
    /// Travel speed in units per second
    pub speed: f32,
    /// Position along the path, 0 at `start` and 1 at `end`
    #[serde(default)]
    pub progress: f32,
    /// +1 toward `end`, -1 toward `start`
    #[serde(default = "forward_direction")]
    pub direction: f32,
}

fn forward_direction() -> f32 {
    1.0
}

impl MovingPlatform {
    pub fn new(start: Vec3, end: Vec3, half_extents: Vec3, speed: f32) -> Self {
        Self {
            start,
            end,
            half_extents: half_extents.abs(),
            speed: speed.max(0.0),
            progress: 0.0,
            direction: 1.0,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.start.lerp(self.end, self.progress)
    }

    /// Current box, always derived from center and half extents
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center(), self.half_extents)
    }

    /// Advance along the path, reversing at either end. Returns the center delta.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        let length = self.start.distance(self.end);
        if length <= f32::EPSILON || self.speed <= 0.0 {
            return Vec3::ZERO;
        }

        let before = self.center();
        let mut progress = self.progress + self.direction * self.speed * dt / length;
        if progress >= 1.0 {
            progress = 1.0;
            self.direction = -1.0;
        } else if progress <= 0.0 {
            progress = 0.0;
            self.direction = 1.0;
        }
        self.progress = progress;
        self.center() - before
    }
}

/// Which surface a body is standing on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceId {
    Floor,
    Collider(usize),
    Platform(usize),
}

/// A surface top under a footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub height: f32,
    pub surface: SurfaceId,
}

/// All geometry the movement integrator collides against
#[derive(Debug, Clone, Default)]
pub struct World {
    pub bounds: LevelBounds,
    /// Infinite floor height, `None` for levels floating over a void
    pub floor: Option<f32>,
    pub colliders: Vec<Aabb>,
    pub platforms: Vec<MovingPlatform>,
}

impl World {
    /// Iterate every solid box with its surface id
    pub fn solids(&self) -> impl Iterator<Item = (SurfaceId, Aabb)> + '_ {
        let statics = self
            .colliders
            .iter()
            .enumerate()
            .map(|(i, b)| (SurfaceId::Collider(i), *b));
        let platforms = self
            .platforms
            .iter()
            .enumerate()
            .map(|(i, p)| (SurfaceId::Platform(i), p.bounds()));
        statics.chain(platforms)
    }

    /// Highest surface under `footprint` whose top is at or below `feet_y`
    ///
    /// Tops within [`STEP_EPSILON`] above the feet still count, so standing
    /// exactly on a surface finds it despite rounding.
    pub fn ground_below(&self, footprint: &Aabb, feet_y: f32) -> Option<Ground> {
        let mut best = self.floor.filter(|h| *h <= feet_y + STEP_EPSILON).map(|height| Ground {
            height,
            surface: SurfaceId::Floor,
        });

        for (surface, solid) in self.solids() {
            if !solid.overlaps_footprint(footprint) || solid.top() > feet_y + STEP_EPSILON {
                continue;
            }
            if best.is_none_or(|g| solid.top() > g.height) {
                best = Some(Ground {
                    height: solid.top(),
                    surface,
                });
            }
        }
        best
    }

    /// Advance every platform. Returns each platform's center delta, by index.
    pub fn advance_platforms(&mut self, dt: f32) -> Vec<Vec3> {
        self.platforms.iter_mut().map(|p| p.advance(dt)).collect()
    }

    /// First hit of a ray against static colliders, as a distance
    pub fn raycast_static(&self, ray: &super::collision::Ray, max_dist: f32) -> Option<f32> {
        self.solids()
            .filter_map(|(_, solid)| super::collision::ray_intersects_box(ray, &solid))
            .map(|(t_min, _)| t_min.max(0.0))
            .filter(|t| *t <= max_dist)
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Ray;

    fn crate_world() -> World {
        World {
            bounds: LevelBounds::default(),
            floor: Some(0.0),
            colliders: vec![Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 1.0, 1.0))],
            platforms: Vec::new(),
        }
    }

    #[test]
    fn test_platform_reverses_at_bounds() {
        let mut platform =
            MovingPlatform::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::splat(1.0), 2.0);

        // 2 units/s over a 4-unit path: one second reaches the midpoint
        platform.advance(1.0);
        assert!((platform.progress - 0.5).abs() < 1e-5);

        platform.advance(1.5);
        assert_eq!(platform.progress, 1.0);
        assert_eq!(platform.direction, -1.0);

        platform.advance(0.5);
        assert!((platform.progress - 0.75).abs() < 1e-5);
        assert!((platform.center().x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_platform_bounds_follow_center() {
        let mut platform = MovingPlatform::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 10.0),
            Vec3::new(1.0, 0.25, 1.0),
            5.0,
        );
        let delta = platform.advance(1.0);
        assert!((delta.z - 5.0).abs() < 1e-5);

        let bounds = platform.bounds();
        assert!((bounds.center() - platform.center()).length() < 1e-5);
        assert!((bounds.top() - 2.25).abs() < 1e-5);
    }

    #[test]
    fn test_ground_below_prefers_highest_reachable_top() {
        let world = crate_world();
        let on_crate = Aabb::from_feet(Vec3::new(3.0, 1.0, 0.0), 0.4, 1.8);
        let ground = world.ground_below(&on_crate, 1.0).unwrap();
        assert_eq!(ground.height, 1.0);
        assert_eq!(ground.surface, SurfaceId::Collider(0));

        // Feet below the crate top: the crate is an obstacle, not ground
        let beside = Aabb::from_feet(Vec3::new(3.0, 0.0, 0.0), 0.4, 1.8);
        let ground = world.ground_below(&beside, 0.0).unwrap();
        assert_eq!(ground.surface, SurfaceId::Floor);
    }

    #[test]
    fn test_void_has_no_ground() {
        let world = World {
            floor: None,
            ..Default::default()
        };
        let footprint = Aabb::from_feet(Vec3::ZERO, 0.4, 1.8);
        assert!(world.ground_below(&footprint, 0.0).is_none());
    }

    #[test]
    fn test_clamp_horizontal_respects_radius() {
        let bounds = LevelBounds::default();
        let clamped = bounds.clamp_horizontal(Vec3::new(60.0, 3.0, -70.0), 0.5);
        assert_eq!(clamped, Vec3::new(49.5, 3.0, -49.5));
    }

    #[test]
    fn test_raycast_static_hits_nearest() {
        let world = crate_world();
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::X);
        let t = world.raycast_static(&ray, 100.0).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        assert!(world.raycast_static(&ray, 1.0).is_none());
    }
}
