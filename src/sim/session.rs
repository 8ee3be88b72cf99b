//! Session state: phase, score, countdown and collection progress
//!
//! Win and Lose are terminal for a session. Every transition into them goes
//! through `finish`, which only fires from `Playing`, so one-shot side effects
//! (cues, bonuses) are reported exactly once. Only a full restart builds a new
//! session.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, DamageTaken};
use crate::consts::TIME_BONUS_PER_SECOND;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title/instructions screen, waiting for start input
    Instructions,
    /// Active gameplay
    Playing,
    Win,
    Lose,
}

/// Why a session was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseReason {
    TimeOut,
    Killed,
    FellOut,
}

impl LoseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoseReason::TimeOut => "time ran out",
            LoseReason::Killed => "killed",
            LoseReason::FellOut => "fell out of the world",
        }
    }
}

/// A one-shot terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won { time_bonus: i64 },
    Lost(LoseReason),
}

/// Scoring and outcome tracking for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    /// Signed; an empty box can take it below zero
    pub score: i64,
    pub collected: u32,
    /// Collectibles needed to win, if this mode wins by collecting
    pub required: Option<u32>,
    /// Countdown in seconds, if this mode has one
    pub remaining_time: Option<f32>,
    pub elapsed: f32,
    pub lose_reason: Option<LoseReason>,
    /// Bonus awarded on a win, if any
    pub time_bonus: Option<i64>,
}

impl Session {
    pub fn new(time_limit: Option<f32>, required: Option<u32>) -> Self {
        Self {
            phase: GamePhase::Instructions,
            score: 0,
            collected: 0,
            required,
            remaining_time: time_limit.map(|t| t.max(0.0)),
            elapsed: 0.0,
            lose_reason: None,
            time_bonus: None,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Win | GamePhase::Lose)
    }

    /// Leave the instructions screen. Returns false if not on it.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Instructions {
            return false;
        }
        self.phase = GamePhase::Playing;
        log::info!("Session started");
        true
    }

    /// Apply a signed score change
    pub fn add_score(&mut self, delta: i64) {
        if self.is_playing() {
            self.score = self.score.saturating_add(delta);
        }
    }

    /// Count down the session timer
    pub fn advance_timer(&mut self, dt: f32) -> Option<Outcome> {
        if !self.is_playing() {
            return None;
        }
        self.elapsed += dt;
        let remaining = self.remaining_time.as_mut()?;
        *remaining = (*remaining - dt).max(0.0);
        if *remaining <= 0.0 {
            return self.lose(LoseReason::TimeOut);
        }
        None
    }

    /// Record one collected reward
    pub fn on_collect(&mut self, value: u32) -> Option<Outcome> {
        if !self.is_playing() {
            return None;
        }
        self.collected += 1;
        self.add_score(i64::from(value));
        match self.required {
            Some(required) if self.collected >= required => self.win(),
            _ => None,
        }
    }

    /// Apply damage to the actor; reaching zero health loses the session
    pub fn on_damage(&mut self, actor: &mut Actor, amount: u32) -> (DamageTaken, Option<Outcome>) {
        if !self.is_playing() {
            return (DamageTaken::default(), None);
        }
        let taken = actor.take_damage(amount);
        let outcome = if actor.health == 0 {
            self.lose(LoseReason::Killed)
        } else {
            None
        };
        (taken, outcome)
    }

    /// Whole seconds left on the clock times the per-second rate
    pub fn remaining_bonus(&self) -> i64 {
        self.remaining_time
            .map(|t| t.max(0.0).floor() as i64 * TIME_BONUS_PER_SECOND)
            .unwrap_or(0)
    }

    pub fn win(&mut self) -> Option<Outcome> {
        if !self.is_playing() {
            return None;
        }
        let time_bonus = self.remaining_bonus();
        self.add_score(time_bonus);
        self.time_bonus = Some(time_bonus);
        self.finish(GamePhase::Win);
        Some(Outcome::Won { time_bonus })
    }

    pub fn lose(&mut self, reason: LoseReason) -> Option<Outcome> {
        if !self.is_playing() {
            return None;
        }
        self.lose_reason = Some(reason);
        self.finish(GamePhase::Lose);
        Some(Outcome::Lost(reason))
    }

    fn finish(&mut self, phase: GamePhase) {
        self.phase = phase;
        log::info!(
            "Session ended: {:?} (score {}, collected {}, {:.1}s)",
            phase,
            self.score,
            self.collected,
            self.elapsed
        );
    }
}
