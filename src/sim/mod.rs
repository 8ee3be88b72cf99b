//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Every rate is an explicit `* dt` term
//! - Seeded RNG only (and only for effect spread)
//! - Stable iteration order (level order for enemies and pickups)
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod ai;
pub mod autopilot;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod movement;
pub mod pickups;
pub mod session;
pub mod state;
pub mod tick;
pub mod view;
pub mod world;

pub use actor::{Actor, Loadout, MotionState};
pub use ai::{BehaviorState, Enemy, EnemyKind, PatrolAxis, PatrolRoute};
pub use collision::{
    Aabb, Ray, Sphere, box_contains, box_intersects, ray_intersects_box, ray_intersects_sphere,
    resolve_box_overlap, sphere_intersects_box,
};
pub use combat::{FireResult, Shot, Tracer, WeaponTuning, fire};
pub use effects::{EffectPool, ScreenFlash, VisualTag};
pub use movement::{MoveIntent, MovementTuning, integrate};
pub use pickups::{Pickup, PickupKind, check_proximity};
pub use session::{GamePhase, LoseReason, Session};
pub use state::{GameEvent, SimTuning, SimulationState};
pub use tick::{TickInput, tick};
pub use view::FrameView;
pub use world::{LevelBounds, MovingPlatform, World};
