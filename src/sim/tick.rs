//! Fixed timestep simulation tick
//!
//! One call advances every system in a fixed order: platforms, movement and
//! collision, combat, enemy AI, pickups, transient effects, then the session
//! clock and win check. Nothing re-enters mid-tick, and once the session is
//! won or lost the remaining gameplay steps are skipped.

use glam::{Vec2, Vec3};

use super::ai::{Strike, Target};
use super::autopilot;
use super::combat::{self, Shot};
use super::effects::VisualTag;
use super::movement::{self, MoveIntent};
use super::pickups::{self, Pickup, PickupKind, Reward};
use super::session::{GamePhase, LoseReason};
use super::state::{GameEvent, SimulationState};

/// Input commands for a single tick (deterministic)
///
/// Buttons are edges from the input layer: `jump`, `start` and `restart` are
/// set on the tick the key goes down, not while it is held.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Planar intent in the actor's frame, diagonals already normalized
    pub move_intent: MoveIntent,
    pub jump: bool,
    /// Trigger held; the weapon cooldown decides when a round goes out
    pub fire: bool,
    /// Interact held (opens boxes)
    pub interact: bool,
    /// Look delta (yaw, pitch) in radians
    pub look: Vec2,
    /// Leave the instructions screen
    pub start: bool,
    /// Reset after a win or loss
    pub restart: bool,
    /// Idle/demo mode - the autopilot plays
    pub idle_mode: bool,
}

/// Advance the simulation by one timestep
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    match state.session.phase {
        GamePhase::Instructions if input.start || input.idle_mode => {
            state.session.start();
            state.events.push(GameEvent::Started);
        }
        GamePhase::Win | GamePhase::Lose if input.restart => state.restart(),
        _ => {}
    }

    if !state.session.is_playing() {
        // End screens still let the last effects fade out
        age_effects(state, dt);
        return;
    }

    let input = if input.idle_mode {
        autopilot::drive(state, input, dt)
    } else {
        input.clone()
    };
    state.time_ticks += 1;

    // Platforms move first so the actor is carried before it moves itself
    let deltas = state.world.advance_platforms(dt);
    movement::carry_with_platforms(&mut state.actor, &deltas);

    state.actor.look(input.look.x, input.look.y);
    let outcome = movement::integrate(
        &mut state.actor,
        input.move_intent,
        input.jump,
        &state.world,
        &state.tuning.movement,
        dt,
    );
    movement::resolve_platform_contacts(&mut state.actor, &state.world, &state.tuning.movement);

    if outcome.fell_out {
        if let Some(lost) = state.session.lose(LoseReason::FellOut) {
            state.record_outcome(lost);
        }
        age_effects(state, dt);
        return;
    }
    state.actor.tick_timers(dt);

    if input.fire && state.actor.weapon.ready() {
        fire_weapon(state);
    }

    update_enemies(state, dt);
    if !state.session.is_playing() {
        age_effects(state, dt);
        return;
    }

    update_pickups(state, input.interact);
    for pickup in &mut state.pickups {
        pickup.animate(dt);
    }

    age_effects(state, dt);

    if let Some(outcome) = state.session.advance_timer(dt) {
        state.record_outcome(outcome);
    } else if state.enemies_cleared() {
        if let Some(won) = state.session.win() {
            state.record_outcome(won);
        }
    }
}

/// Hitscan one round along the view direction
fn fire_weapon(state: &mut SimulationState) {
    let shot = Shot::new(state.actor.eye(), state.actor.view_dir());
    let result = combat::fire(
        &shot,
        &mut state.actor.ammo,
        &mut state.enemies,
        &state.world,
        &state.tuning.weapon,
    );
    if !result.consumed_ammo {
        return;
    }

    state.actor.weapon.start_cooldown();
    state.tracer = result.tracer;
    state.session.add_score(result.score_delta);
    state.events.push(GameEvent::ShotFired {
        hit: result.hit.map(|h| h.target),
    });

    if let Some(hit) = result.hit {
        let damage = state.tuning.weapon.damage;
        state.events.push(GameEvent::EnemyHit {
            enemy: hit.target,
            damage,
        });
        state.spawn_burst(hit.point, 6, VisualTag::Blood);
        state.float_text(hit.point + Vec3::Y * 0.5, format!("-{damage}"));

        if hit.killed {
            let kind = state.enemies[hit.target].kind;
            state.kills += 1;
            state.events.push(GameEvent::EnemyKilled {
                enemy: hit.target,
                kind,
            });
            state.float_text(
                hit.point + Vec3::Y,
                format!("{kind:?} down +{}", state.tuning.weapon.kill_bonus),
            );
            log::debug!("Enemy {} ({kind:?}) killed at {:.1}m", hit.target, hit.distance);
        }
    } else if let Some(impact) = result.impact {
        state.spawn_burst(impact, 4, VisualTag::Spark);
    }
}

/// Run every enemy's state machine against the actor as it stands now
fn update_enemies(state: &mut SimulationState, dt: f32) {
    let mut target = Target {
        position: state.actor.position,
        invincible: state.actor.invincibility > 0.0,
    };
    for i in 0..state.enemies.len() {
        let Some(strike) = state.enemies[i].update(i, &target, &state.world, dt) else {
            continue;
        };
        apply_strike(state, strike);
        if !state.session.is_playing() {
            return;
        }
        target.invincible = state.actor.invincibility > 0.0;
    }
}

fn apply_strike(state: &mut SimulationState, strike: Strike) {
    state.actor.apply_knockback(strike.knockback);
    if strike.damage == 0 {
        return;
    }

    let (taken, outcome) = state.session.on_damage(&mut state.actor, strike.damage);
    state.actor.invincibility = state.actor.invincibility.max(strike.invincibility);
    state.flash.flash_damage();
    state.events.push(GameEvent::PlayerDamaged {
        enemy: strike.enemy,
        health_lost: taken.health_lost,
        armor_absorbed: taken.armor_absorbed,
    });
    if let Some(lost) = outcome {
        state.record_outcome(lost);
    }
}

/// Trigger pickups in reach; boxes may also need the interact button
fn update_pickups(state: &mut SimulationState, interact: bool) {
    let feet = state.actor.position;
    let needs_interact = state.config.boxes_require_interact;
    let mut dropped = Vec::new();

    for i in 0..state.pickups.len() {
        if !state.session.is_playing() {
            break;
        }
        let pickup = &mut state.pickups[i];
        if !pickups::check_proximity(feet, pickup) {
            continue;
        }
        if pickup.kind.is_box() && needs_interact && !interact {
            continue;
        }
        let Some(effect) = pickups::trigger(i, pickup) else {
            continue;
        };
        let position = pickup.position;

        pickups::apply_to_actor(&effect.reward, &mut state.actor);
        state.session.add_score(effect.score_delta);
        state.flash.flash_pickup();
        state.spawn_burst(position, 8, VisualTag::Glitter(glitter_color(effect.kind)));
        log::debug!("Triggered {} at {position}", effect.kind.as_str());

        match effect.reward {
            Reward::SpawnCollectible { position, value } => {
                dropped.push(Pickup::new(PickupKind::Collectible, position, value));
                state.events.push(GameEvent::BoxOpened { index: i, empty: false });
            }
            Reward::Nothing => {
                state.float_text(position, format!("{}", effect.score_delta));
                state.events.push(GameEvent::BoxOpened { index: i, empty: true });
            }
            Reward::Collect { value } => {
                state.events.push(GameEvent::PickupCollected {
                    index: i,
                    kind: effect.kind,
                });
                if let Some(won) = state.session.on_collect(value) {
                    state.record_outcome(won);
                }
            }
            Reward::Health(_) | Reward::Ammo(_) | Reward::Armor(_) => {
                state.events.push(GameEvent::PickupCollected {
                    index: i,
                    kind: effect.kind,
                });
            }
        }
    }

    // Drops join the level after the sweep, so they never trigger on the tick they appear
    state.pickups.extend(dropped);
}

fn glitter_color(kind: PickupKind) -> u32 {
    match kind {
        PickupKind::Health => 0xff4040,
        PickupKind::Ammo => 0xffd040,
        PickupKind::Armor => 0x40a0ff,
        PickupKind::Collectible | PickupKind::RewardBox => 0x60ff80,
        PickupKind::EmptyBox => 0x808080,
    }
}

/// Age particles, messages, the tracer and screen flashes
fn age_effects(state: &mut SimulationState, dt: f32) {
    state.particles.tick(dt);
    state.messages.tick(dt);
    state.flash.tick(dt);
    if let Some(tracer) = state.tracer.as_mut() {
        if !tracer.tick(dt) {
            state.tracer = None;
        }
    }
}
