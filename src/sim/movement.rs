//! Movement and physics integration for the actor
//!
//! Two vertical states, Grounded and Airborne. Planar movement is applied one
//! axis at a time so a blocked axis simply does not move while the other one
//! slides along the wall.
//!
//! Step-up: a raised obstacle can only be entered when the feet are already
//! strictly above `ground + obstacle_height / 2`. At exactly half height the
//! move is blocked. A grounded actor is therefore always stopped by a raised
//! edge; an airborne one that is high enough is placed on top.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, MotionState};
use super::collision::{Aabb, box_intersects, resolve_box_overlap};
use super::world::{SurfaceId, World};
use crate::consts::*;
use crate::horizontal;

/// Movement tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub radius: f32,
    pub height: f32,
    /// Knockback decay rate (1/s)
    pub knockback_damping: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: PLAYER_MOVE_SPEED,
            jump_impulse: PLAYER_JUMP_IMPULSE,
            gravity: GRAVITY,
            radius: PLAYER_RADIUS,
            height: PLAYER_HEIGHT,
            knockback_damping: KNOCKBACK_DAMPING,
        }
    }
}

/// Planar move intent in the actor's local frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent {
    pub forward: f32,
    pub strafe: f32,
}

impl MoveIntent {
    /// Build an intent, rescaling so diagonals are no faster than a single axis
    pub fn new(forward: f32, strafe: f32) -> Self {
        let len_sq = forward * forward + strafe * strafe;
        if len_sq > 1.0 {
            let len = len_sq.sqrt();
            Self {
                forward: forward / len,
                strafe: strafe / len,
            }
        } else {
            Self { forward, strafe }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0
    }
}

/// What happened during one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub jumped: bool,
    pub landed: bool,
    /// Feet dropped below the level's death height
    pub fell_out: bool,
    /// At least one planar axis was blocked
    pub blocked: bool,
}

/// Whether feet at `feet_y` may move onto an obstacle whose top is `obstacle_top`
#[inline]
pub fn step_up_allowed(feet_y: f32, ground: f32, obstacle_top: f32) -> bool {
    let obstacle_height = obstacle_top - ground;
    feet_y > ground + obstacle_height / 2.0
}

/// Advance the actor by one tick
pub fn integrate(
    actor: &mut Actor,
    intent: MoveIntent,
    jump: bool,
    world: &World,
    tuning: &MovementTuning,
    dt: f32,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();

    let footprint = actor.body(tuning.radius, tuning.height);
    let ground_ref = world
        .ground_below(&footprint, actor.position.y)
        .map(|g| g.height)
        .unwrap_or(actor.position.y);

    // Planar: intent plus any knockback still carried in velocity
    let wish = actor.forward() * intent.forward + actor.right() * intent.strafe;
    let planar = (wish * tuning.move_speed + horizontal(actor.velocity)) * dt;

    for step in [Vec3::new(planar.x, 0.0, 0.0), Vec3::new(0.0, 0.0, planar.z)] {
        if step != Vec3::ZERO && !try_planar_step(actor, step, ground_ref, world, tuning) {
            outcome.blocked = true;
        }
    }
    actor.position = world.bounds.clamp_horizontal(actor.position, tuning.radius);

    let decay = (-tuning.knockback_damping * dt).exp();
    actor.velocity.x *= decay;
    actor.velocity.z *= decay;

    match actor.motion {
        MotionState::Grounded => {
            if jump {
                actor.motion = MotionState::Airborne;
                actor.velocity.y = tuning.jump_impulse;
                actor.standing_on = None;
                outcome.jumped = true;
            } else {
                settle_on_ground(actor, world, tuning);
            }
        }
        MotionState::Airborne => {
            outcome.landed = integrate_vertical(actor, world, tuning, dt);
        }
    }

    if actor.position.y < world.bounds.death_height {
        outcome.fell_out = true;
    }
    outcome
}

/// Try to move by `step`; returns false when an obstacle blocks it
fn try_planar_step(
    actor: &mut Actor,
    step: Vec3,
    ground_ref: f32,
    world: &World,
    tuning: &MovementTuning,
) -> bool {
    let feet_y = actor.position.y;
    let candidate = actor.position + step;
    let body = Aabb::from_feet(candidate, tuning.radius, tuning.height);
    let mut mount_to: Option<f32> = None;

    for (_, solid) in world.solids() {
        if !solid.overlaps_footprint(&body) {
            continue;
        }
        // Overhead or underfoot
        if solid.bottom() >= body.top() || solid.top() <= feet_y + STEP_EPSILON {
            continue;
        }
        // Side of something that starts above the feet
        if solid.bottom() > feet_y + STEP_EPSILON {
            return false;
        }
        if !step_up_allowed(feet_y, ground_ref, solid.top()) {
            return false;
        }
        mount_to = Some(mount_to.map_or(solid.top(), |m| m.max(solid.top())));
    }

    actor.position = candidate;
    if let Some(top) = mount_to {
        actor.position.y = actor.position.y.max(top);
    }
    true
}

/// Grounded: snap to the ground under the new position, or start falling
fn settle_on_ground(actor: &mut Actor, world: &World, tuning: &MovementTuning) {
    let footprint = actor.body(tuning.radius, tuning.height);
    match world.ground_below(&footprint, actor.position.y) {
        Some(ground) if actor.position.y - ground.height <= STEP_DOWN_TOLERANCE => {
            actor.position.y = ground.height;
            actor.velocity.y = 0.0;
            actor.standing_on = Some(ground.surface);
        }
        _ => {
            actor.motion = MotionState::Airborne;
            actor.velocity.y = 0.0;
            actor.standing_on = None;
        }
    }
}

/// Airborne: gravity, head bumps and landing. Returns true on landing.
fn integrate_vertical(actor: &mut Actor, world: &World, tuning: &MovementTuning, dt: f32) -> bool {
    let footprint = actor.body(tuning.radius, tuning.height);
    let ground = world.ground_below(&footprint, actor.position.y);
    let head_before = actor.position.y + tuning.height;

    actor.velocity.y -= tuning.gravity * dt;
    actor.position.y += actor.velocity.y * dt;

    if actor.velocity.y > 0.0 {
        let head_after = actor.position.y + tuning.height;
        let ceiling = world
            .solids()
            .filter(|(_, s)| s.overlaps_footprint(&footprint))
            .map(|(_, s)| s.bottom())
            .filter(|bottom| *bottom >= head_before - STEP_EPSILON && *bottom < head_after)
            .min_by(|a, b| a.total_cmp(b));
        if let Some(bottom) = ceiling {
            actor.position.y = bottom - tuning.height;
            actor.velocity.y = 0.0;
        }
    }

    if let Some(ground) = ground {
        if actor.position.y <= ground.height {
            actor.position.y = ground.height;
            actor.velocity.y = 0.0;
            actor.motion = MotionState::Grounded;
            actor.standing_on = Some(ground.surface);
            return true;
        }
    }
    false
}

/// Carry a grounded actor along with the platform it stands on
pub fn carry_with_platforms(actor: &mut Actor, platform_deltas: &[Vec3]) {
    if !actor.is_grounded() {
        return;
    }
    if let Some(SurfaceId::Platform(i)) = actor.standing_on {
        if let Some(delta) = platform_deltas.get(i) {
            actor.position += *delta;
        }
    }
}

/// Push the actor out of any platform that moved into it
pub fn resolve_platform_contacts(actor: &mut Actor, world: &World, tuning: &MovementTuning) {
    for (i, platform) in world.platforms.iter().enumerate() {
        let body = actor.body(tuning.radius, tuning.height);
        let bounds = platform.bounds();
        if !box_intersects(&body, &bounds) {
            continue;
        }

        let push = resolve_box_overlap(&body, &bounds);
        actor.position += push;
        if push.y > 0.0 {
            actor.velocity.y = 0.0;
            actor.motion = MotionState::Grounded;
            actor.standing_on = Some(SurfaceId::Platform(i));
        } else if push.y < 0.0 {
            actor.velocity.y = actor.velocity.y.min(0.0);
        }
    }
}
