//! Read-only frame snapshot for the renderer
//!
//! Built once per tick after the simulation finishes. The renderer never
//! touches `SimulationState` directly.

use glam::Vec3;

use super::ai::EnemyKind;
use super::collision::Aabb;
use super::combat::Tracer;
use super::effects::{Transient, VisualTag};
use super::pickups::PickupKind;
use super::session::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView {
    pub position: Vec3,
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
    /// For blinking the view model during the invincibility window
    pub invincible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyView {
    pub kind: EnemyKind,
    pub position: Vec3,
    pub yaw: f32,
    pub alive: bool,
    pub attacking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupView {
    pub kind: PickupKind,
    pub position: Vec3,
    pub collected: bool,
    pub spin: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectView<'a> {
    pub position: Vec3,
    pub tag: &'a VisualTag,
    /// 1 when fresh, 0 when about to expire
    pub fade: f32,
}

impl<'a> From<&'a Transient> for EffectView<'a> {
    fn from(effect: &'a Transient) -> Self {
        Self {
            position: effect.position,
            tag: &effect.tag,
            fade: effect.life_fraction(),
        }
    }
}

/// Numbers for the heads-up display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudView {
    pub health: u32,
    pub armor: u32,
    pub ammo: u32,
    pub score: i64,
    pub remaining_time: Option<f32>,
    pub collected: u32,
    pub required: Option<u32>,
    pub phase: GamePhase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameView<'a> {
    pub actor: ActorView,
    pub enemies: Vec<EnemyView>,
    pub pickups: Vec<PickupView>,
    /// Current moving platform boxes
    pub platforms: Vec<Aabb>,
    pub particles: Vec<EffectView<'a>>,
    pub messages: Vec<EffectView<'a>>,
    pub tracer: Option<Tracer>,
    /// Damage and pickup tint intensities
    pub flash: (f32, f32),
    pub hud: HudView,
}
