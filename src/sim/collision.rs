//! Collision primitives: boxes, spheres and rays
//!
//! Everything here is a pure function of its arguments. Boxes are axis-aligned
//! and always well-formed (min <= max on every axis); construction normalizes
//! swapped corners so queries never see a degenerate box.
//!
//! Intersection is strict: boxes that merely touch do not overlap.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Squared length below which a direction is treated as zero
const DIRECTION_EPSILON_SQ: f32 = 1e-12;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAabb", into = "RawAabb")]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

/// Serialized box shape, normalized on the way in
#[derive(Serialize, Deserialize)]
struct RawAabb {
    min: Vec3,
    max: Vec3,
}

impl From<RawAabb> for Aabb {
    fn from(raw: RawAabb) -> Self {
        Aabb::new(raw.min, raw.max)
    }
}

impl From<Aabb> for RawAabb {
    fn from(aabb: Aabb) -> Self {
        RawAabb {
            min: aabb.min,
            max: aabb.max,
        }
    }
}

impl Aabb {
    /// Build a box from two opposite corners (any order)
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Build a box from its center and half extents (negative extents are mirrored)
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box occupied by an upright body standing with its feet at `feet`
    pub fn from_feet(feet: Vec3, radius: f32, height: f32) -> Self {
        let r = radius.abs();
        Self::new(
            Vec3::new(feet.x - r, feet.y, feet.z - r),
            Vec3::new(feet.x + r, feet.y + height.abs(), feet.z + r),
        )
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Height of the top face
    #[inline]
    pub fn top(&self) -> f32 {
        self.max.y
    }

    /// Height of the bottom face
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Closest point inside the box to `point`
    #[inline]
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// True when the XZ footprints overlap (heights ignored)
    pub fn overlaps_footprint(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// A sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }
}

/// A half-line from `origin` along `dir`
///
/// `dir` is normalized on construction, so ray parameters are distances.
/// A zero direction is kept as zero and never intersects anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    #[inline]
    fn is_degenerate(&self) -> bool {
        self.dir.length_squared() < DIRECTION_EPSILON_SQ
    }
}

/// Check if a point lies inside a box (faces inclusive)
pub fn box_contains(point: Vec3, aabb: &Aabb) -> bool {
    point.cmpge(aabb.min).all() && point.cmple(aabb.max).all()
}

/// Separating-axis test on the three world axes
pub fn box_intersects(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x
        && a.max.x > b.min.x
        && a.min.y < b.max.y
        && a.max.y > b.min.y
        && a.min.z < b.max.z
        && a.max.z > b.min.z
}

/// Sphere vs box: clamp the center into the box and compare squared distance
pub fn sphere_intersects_box(sphere: &Sphere, aabb: &Aabb) -> bool {
    let closest = aabb.clamp_point(sphere.center);
    closest.distance_squared(sphere.center) <= sphere.radius * sphere.radius
}

/// Ray vs box (slab method)
///
/// Returns the entry and exit distances `(t_min, t_max)` when the ray hits
/// the box. `t_min` is negative when the origin is inside the box. A box
/// entirely behind the origin is a miss.
pub fn ray_intersects_box(ray: &Ray, aabb: &Aabb) -> Option<(f32, f32)> {
    if ray.is_degenerate() {
        return None;
    }

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.dir[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if dir.abs() < 1e-8 {
            // Parallel to this slab: must already be between its planes
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let t1 = (lo - origin) * inv;
        let t2 = (hi - origin) * inv;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some((t_min, t_max))
}

/// Ray vs sphere
///
/// Solves the quadratic and returns the smaller non-negative root. When both
/// roots are negative the sphere is behind the ray and this is a miss.
pub fn ray_intersects_sphere(ray: &Ray, sphere: &Sphere) -> Option<f32> {
    if ray.is_degenerate() {
        return None;
    }

    // dir is unit length, so a = 1
    let oc = ray.origin - sphere.center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Displacement that pushes `moving` out of `stationary`
///
/// Only the axis of minimum overlap is corrected, in the direction of the
/// moving box's center. No overlap on any axis means no displacement.
pub fn resolve_box_overlap(moving: &Aabb, stationary: &Aabb) -> Vec3 {
    let overlap = moving.max.min(stationary.max) - moving.min.max(stationary.min);
    if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
        return Vec3::ZERO;
    }

    let delta = moving.center() - stationary.center();
    let push = |amount: f32, d: f32| if d < 0.0 { -amount } else { amount };

    if overlap.x <= overlap.y && overlap.x <= overlap.z {
        Vec3::new(push(overlap.x, delta.x), 0.0, 0.0)
    } else if overlap.y <= overlap.z {
        Vec3::new(0.0, push(overlap.y, delta.y), 0.0)
    } else {
        Vec3::new(0.0, 0.0, push(overlap.z, delta.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_degenerate_box_is_normalized() {
        let aabb = Aabb::new(Vec3::new(2.0, -1.0, 5.0), Vec3::new(-2.0, 1.0, 3.0));
        assert_eq!(aabb.min(), Vec3::new(-2.0, -1.0, 3.0));
        assert_eq!(aabb.max(), Vec3::new(2.0, 1.0, 5.0));

        let parsed: Aabb =
            serde_json::from_str(r#"{"min":[1.0,1.0,1.0],"max":[0.0,0.0,0.0]}"#).unwrap();
        assert_eq!(parsed.min(), Vec3::ZERO);
        assert_eq!(parsed.max(), Vec3::ONE);
    }

    #[test]
    fn test_box_contains_inclusive() {
        let aabb = unit_box();
        assert!(box_contains(Vec3::ZERO, &aabb));
        assert!(box_contains(Vec3::new(1.0, 1.0, 1.0), &aabb));
        assert!(!box_contains(Vec3::new(1.01, 0.0, 0.0), &aabb));
    }

    #[test]
    fn test_box_intersects_touching_is_not_overlap() {
        let a = unit_box();
        let touching = a.translated(Vec3::new(2.0, 0.0, 0.0));
        let overlapping = a.translated(Vec3::new(1.5, 0.5, -0.5));
        let separated_on_y = a.translated(Vec3::new(0.0, 3.0, 0.0));

        assert!(!box_intersects(&a, &touching));
        assert!(box_intersects(&a, &overlapping));
        assert!(!box_intersects(&a, &separated_on_y));
    }

    #[test]
    fn test_sphere_intersects_box() {
        let aabb = unit_box();
        assert!(sphere_intersects_box(&Sphere::new(Vec3::new(1.5, 0.0, 0.0), 0.6), &aabb));
        assert!(!sphere_intersects_box(&Sphere::new(Vec3::new(1.5, 1.5, 0.0), 0.6), &aabb));
        // Corner distance is sqrt(0.5) ~ 0.707
        assert!(sphere_intersects_box(&Sphere::new(Vec3::new(1.5, 1.5, 0.0), 0.75), &aabb));
    }

    #[test]
    fn test_ray_box_slab() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let (t_min, t_max) = ray_intersects_box(&ray, &aabb).unwrap();
        assert!((t_min - 4.0).abs() < 1e-5);
        assert!((t_max - 6.0).abs() < 1e-5);

        // Pointing away
        let away = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::NEG_X);
        assert!(ray_intersects_box(&away, &aabb).is_none());
    }

    #[test]
    fn test_ray_box_parallel_outside_slab_misses() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::X);
        assert!(ray_intersects_box(&ray, &aabb).is_none());

        let inside_slab = Ray::new(Vec3::new(-5.0, 0.5, 0.0), Vec3::X);
        assert!(ray_intersects_box(&inside_slab, &aabb).is_some());
    }

    #[test]
    fn test_ray_box_origin_inside() {
        let (t_min, t_max) = ray_intersects_box(&Ray::new(Vec3::ZERO, Vec3::Z), &unit_box()).unwrap();
        assert!(t_min < 0.0);
        assert!((t_max - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(ray_intersects_box(&ray, &unit_box()).is_none());
        assert!(ray_intersects_sphere(&ray, &Sphere::new(Vec3::ZERO, 1.0)).is_none());
    }

    #[test]
    fn test_ray_sphere_roots() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((ray_intersects_sphere(&ray, &sphere).unwrap() - 9.0).abs() < 1e-4);

        // From inside: the far root is the only non-negative one
        let inside = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::NEG_Z);
        assert!((ray_intersects_sphere(&inside, &sphere).unwrap() - 1.0).abs() < 1e-4);

        // Behind: both roots negative
        let behind = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(ray_intersects_sphere(&behind, &sphere).is_none());

        // Off to the side
        let wide = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(ray_intersects_sphere(&wide, &sphere).is_none());
    }

    #[test]
    fn test_resolve_pushes_along_minimum_axis() {
        let wall = Aabb::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(1.0, 3.0, 5.0));
        let body = Aabb::new(Vec3::new(-0.7, 0.0, -0.4), Vec3::new(0.1, 1.8, 0.4));

        let push = resolve_box_overlap(&body, &wall);
        assert!((push.x - (-0.1)).abs() < 1e-5);
        assert_eq!(push.y, 0.0);
        assert_eq!(push.z, 0.0);
    }

    #[test]
    fn test_resolve_without_overlap_is_zero() {
        let a = unit_box();
        let b = a.translated(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(resolve_box_overlap(&a, &b), Vec3::ZERO);
    }

    proptest! {
        #[test]
        fn prop_resolution_removes_overlap(
            dx in -1.9f32..1.9,
            dy in -1.9f32..1.9,
            dz in -1.9f32..1.9,
        ) {
            let stationary = unit_box();
            let moving = unit_box().translated(Vec3::new(dx, dy, dz));
            let push = resolve_box_overlap(&moving, &stationary);

            // Exactly one axis is corrected
            let moved_axes = [push.x, push.y, push.z].iter().filter(|v| **v != 0.0).count();
            prop_assert!(moved_axes <= 1);

            let resolved = moving.translated(push * 1.0001);
            prop_assert!(!box_intersects(&resolved, &stationary));
        }

        #[test]
        fn prop_clamped_point_is_inside(
            x in -10.0f32..10.0,
            y in -10.0f32..10.0,
            z in -10.0f32..10.0,
        ) {
            let aabb = unit_box();
            prop_assert!(box_contains(aabb.clamp_point(Vec3::new(x, y, z)), &aabb));
        }

        #[test]
        fn prop_sphere_hit_distance_lies_on_surface(
            ox in -5.0f32..5.0,
            oy in -5.0f32..5.0,
            dz in 0.1f32..1.0,
        ) {
            let sphere = Sphere::new(Vec3::new(0.0, 0.0, 20.0), 2.0);
            let ray = Ray::new(Vec3::new(ox, oy, 0.0), Vec3::new(0.0, 0.0, dz));
            if let Some(t) = ray_intersects_sphere(&ray, &sphere) {
                let dist = ray.at(t).distance(sphere.center);
                prop_assert!((dist - sphere.radius).abs() < 1e-2);
            }
        }
    }
}
