//! Simulation state aggregate
//!
//! Everything a run mutates lives in one `SimulationState`, owned by whoever
//! drives the tick. Nothing here is global, so independent sessions can run
//! side by side and tests can build exactly the state they need.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::ai::{BehaviorState, Enemy, EnemyKind};
use super::combat::{Tracer, WeaponTuning};
use super::effects::{EffectPool, ScreenFlash, VisualTag};
use super::movement::MovementTuning;
use super::pickups::{Pickup, PickupKind};
use super::session::{GamePhase, LoseReason, Outcome, Session};
use super::view::{ActorView, EffectView, EnemyView, FrameView, HudView, PickupView};
use super::world::World;
use crate::consts::{MAX_MESSAGES, MAX_PARTICLES};
use crate::settings::{ModeConfig, WinCondition};

/// Numbers shared by both modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTuning {
    pub movement: MovementTuning,
    pub weapon: WeaponTuning,
    pub max_particles: usize,
    pub max_messages: usize,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            movement: MovementTuning::default(),
            weapon: WeaponTuning::default(),
            max_particles: MAX_PARTICLES,
            max_messages: MAX_MESSAGES,
        }
    }
}

/// Something that happened during a tick, for audio and logging
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Restarted,
    ShotFired { hit: Option<usize> },
    EnemyHit { enemy: usize, damage: u32 },
    EnemyKilled { enemy: usize, kind: EnemyKind },
    PlayerDamaged { enemy: usize, health_lost: u32, armor_absorbed: u32 },
    PickupCollected { index: usize, kind: PickupKind },
    BoxOpened { index: usize, empty: bool },
    Won { score: i64, time_bonus: i64 },
    Lost { reason: LoseReason },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub config: ModeConfig,
    pub tuning: SimTuning,
    /// Run seed; effect spread is the only randomness
    pub seed: u64,
    rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub world: World,
    pub actor: Actor,
    /// Fixed at load; dead enemies stay in place
    pub enemies: Vec<Enemy>,
    /// Level pickups first, then anything spawned by boxes
    pub pickups: Vec<Pickup>,
    pub particles: EffectPool,
    pub messages: EffectPool,
    pub flash: ScreenFlash,
    pub tracer: Option<Tracer>,
    pub session: Session,
    pub kills: u32,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Fresh run on the instructions screen with default tuning
    pub fn new(config: ModeConfig, seed: u64) -> Self {
        Self::with_tuning(config, SimTuning::default(), seed)
    }

    pub fn with_tuning(config: ModeConfig, tuning: SimTuning, seed: u64) -> Self {
        let level = &config.level;
        log::info!(
            "Building {} run on '{}' (seed {seed:#x})",
            config.mode.as_str(),
            level.name
        );
        Self {
            world: level.build_world(),
            actor: Actor::new(
                level.player_spawn,
                level.player_yaw,
                &config.loadout,
                tuning.weapon.fire_interval,
            ),
            enemies: level.spawn_enemies(),
            pickups: level.spawn_pickups(),
            particles: EffectPool::particles(tuning.max_particles),
            messages: EffectPool::messages(tuning.max_messages),
            flash: ScreenFlash::default(),
            tracer: None,
            session: Session::new(config.time_limit, config.required_collectibles()),
            kills: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            seed,
            tuning,
            config,
        }
    }

    /// Reset everything to level start and go straight to Playing
    ///
    /// Safe to call any number of times: each call produces the same state.
    pub fn restart(&mut self) {
        let config = self.config.clone();
        *self = Self::with_tuning(config, self.tuning, self.seed);
        self.session.start();
        self.events.push(GameEvent::Restarted);
        log::info!("Run restarted");
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn live_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Whether the mode's win condition is met by the world itself
    pub fn enemies_cleared(&self) -> bool {
        self.config.win == WinCondition::ClearEnemies && self.live_enemies() == 0
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won { time_bonus } => {
                self.flash.flash_pickup();
                self.events.push(GameEvent::Won {
                    score: self.session.score,
                    time_bonus,
                });
            }
            Outcome::Lost(reason) => {
                self.flash.flash_damage();
                log::info!("Lost: {}", reason.as_str());
                self.events.push(GameEvent::Lost { reason });
            }
        }
    }

    /// Scatter `count` particles from `origin`
    pub(crate) fn spawn_burst(&mut self, origin: Vec3, count: usize, tag: VisualTag) {
        for _ in 0..count {
            let velocity = Vec3::new(
                self.rng.random_range(-2.0..2.0),
                self.rng.random_range(1.0..4.0),
                self.rng.random_range(-2.0..2.0),
            );
            if !self.particles.spawn(origin, velocity, tag.clone()) {
                break;
            }
        }
    }

    /// Floating text drifting up from `origin`
    pub(crate) fn float_text(&mut self, origin: Vec3, text: String) {
        self.messages.spawn(origin, Vec3::Y * 0.8, VisualTag::Text(text));
    }

    /// Read-only view for the renderer, taken after the tick completes
    pub fn snapshot(&self) -> FrameView<'_> {
        let actor = &self.actor;
        FrameView {
            actor: ActorView {
                position: actor.position,
                eye: actor.eye(),
                yaw: actor.yaw,
                pitch: actor.pitch,
                grounded: actor.is_grounded(),
                invincible: actor.invincibility > 0.0,
            },
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    kind: e.kind,
                    position: e.position,
                    yaw: e.yaw,
                    alive: e.is_alive(),
                    attacking: e.state == BehaviorState::Attack,
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .map(|p| PickupView {
                    kind: p.kind,
                    position: p.position,
                    collected: p.collected,
                    spin: p.spin,
                })
                .collect(),
            platforms: self.world.platforms.iter().map(|p| p.bounds()).collect(),
            particles: self.particles.iter().map(EffectView::from).collect(),
            messages: self.messages.iter().map(EffectView::from).collect(),
            tracer: self.tracer,
            flash: self.flash.intensities(),
            hud: HudView {
                health: actor.health,
                armor: actor.armor,
                ammo: actor.ammo,
                score: self.session.score,
                remaining_time: self.session.remaining_time,
                collected: self.session.collected,
                required: self.session.required,
                phase: self.session.phase,
            },
        }
    }
}
