//! Idle/demo driver
//!
//! Produces the input a simple player would: shoot the nearest enemy it can
//! see, otherwise walk to the nearest pickup and press interact on arrival.
//! It only reads the state, so a run under the autopilot is as deterministic
//! as one driven by recorded input.

use glam::{Vec2, Vec3};

use super::ai::Enemy;
use super::collision::Ray;
use super::movement::MoveIntent;
use super::pickups::Pickup;
use super::state::SimulationState;
use super::tick::TickInput;
use crate::consts::STEP_DOWN_TOLERANCE;
use crate::{forward_to_yaw, horizontal, normalize_angle};

/// Max turn speed (radians/s)
const TURN_RATE: f32 = 4.0;
/// Fire once aim is within this many radians
const AIM_TOLERANCE: f32 = 0.05;
/// Enemies further than this are ignored
const ENGAGE_RANGE: f32 = 20.0;
/// Walk only when roughly facing the target
const WALK_CONE: f32 = 0.5;
/// Jump for raised targets closer than this
const JUMP_REACH: f32 = 3.0;

/// Derive this tick's input from the current state
pub fn drive(state: &SimulationState, base: &TickInput, dt: f32) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        start: base.start,
        restart: base.restart,
        ..Default::default()
    };
    let actor = &state.actor;
    let max_turn = TURN_RATE * dt;

    if let Some(enemy) = visible_enemy(state) {
        let (yaw_err, pitch_err) = aim_error(state, enemy.hit_sphere().center);
        input.look = Vec2::new(
            yaw_err.clamp(-max_turn, max_turn),
            pitch_err.clamp(-max_turn, max_turn),
        );
        input.fire = actor.ammo > 0 && yaw_err.abs() < AIM_TOLERANCE && pitch_err.abs() < AIM_TOLERANCE;

        // Keep out of melee reach
        let distance = horizontal(enemy.position - actor.position).length();
        if distance < enemy.profile().attack_range * 1.5 {
            input.move_intent = MoveIntent::new(-1.0, 0.0);
        }
        return input;
    }

    if let Some(pickup) = nearest_pickup(state) {
        let (yaw_err, _) = aim_error(state, pickup.position);
        input.look = Vec2::new(
            yaw_err.clamp(-max_turn, max_turn),
            (-actor.pitch).clamp(-max_turn, max_turn),
        );
        if yaw_err.abs() < WALK_CONE {
            input.move_intent = MoveIntent::new(1.0, 0.0);
        }
        let distance = horizontal(pickup.position - actor.position).length();
        input.jump = actor.is_grounded()
            && distance < JUMP_REACH
            && pickup.position.y > actor.position.y + STEP_DOWN_TOLERANCE;
        input.interact = true;
    }
    input
}

/// Yaw and pitch corrections that would put `target` under the crosshair
fn aim_error(state: &SimulationState, target: Vec3) -> (f32, f32) {
    let actor = &state.actor;
    let to = target - actor.eye();
    let flat = horizontal(to);
    if flat.length_squared() < 1e-6 {
        return (0.0, 0.0);
    }
    let yaw_err = normalize_angle(forward_to_yaw(flat) - actor.yaw);
    let pitch_err = to.y.atan2(flat.length()) - actor.pitch;
    (yaw_err, pitch_err)
}

/// Nearest live enemy in range with nothing solid in between
fn visible_enemy(state: &SimulationState) -> Option<&Enemy> {
    let eye = state.actor.eye();
    state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            let center = e.hit_sphere().center;
            let distance = eye.distance(center);
            if distance > ENGAGE_RANGE {
                return None;
            }
            let ray = Ray::new(eye, center - eye);
            match state.world.raycast_static(&ray, distance) {
                Some(_) => None,
                None => Some((e, distance)),
            }
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| e)
}

fn nearest_pickup(state: &SimulationState) -> Option<&Pickup> {
    let feet = state.actor.position;
    state
        .pickups
        .iter()
        .filter(|p| !p.collected)
        .min_by(|a, b| {
            a.position
                .distance_squared(feet)
                .total_cmp(&b.position.distance_squared(feet))
        })
}
