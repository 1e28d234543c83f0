//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Every motion runs through the session's own scheduler
//! - No rendering or platform dependencies

pub mod chain;
pub mod character;
pub mod classifier;
pub mod easing;
pub mod planner;
pub mod platform;
pub mod state;
pub mod tick;
pub mod tween;

pub use chain::{PlatformChain, PlatformId, Window, WindowView};
pub use character::{Character, CharacterState, Topple};
pub use classifier::{Bands, Outcome, classify};
pub use easing::Easing;
pub use planner::{JumpPlan, plan};
pub use platform::{Direction, Platform, PlatformGenerator, Skin};
pub use state::{GameEvent, GameState, PendingJump, Snapshot};
pub use tick::{TickInput, tick};
pub use tween::{Channel, Scheduler, Tween, TweenEvent, TweenHandle};
