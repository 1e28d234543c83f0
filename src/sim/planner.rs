//! Jump trajectory planning
//!
//! Turns the charge at release into a flight description: where the
//! character lands, how far it travels along the jump axis, and the
//! vertical arc. The plan is computed once at launch; the session replays
//! it through the scheduler.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::chain::WindowView;
use super::easing::Easing;
use super::platform::{Direction, Platform};
use super::tween::{Channel, Tween};
use crate::consts::*;
use crate::settings::Settings;
use crate::from_xz;

/// Complete description of one jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpPlan {
    /// Landing point (x, z) in the frame the character will settle in
    pub target: Vec2,
    /// Ground-plane motion from the settle point to the target
    pub displacement: Vec2,
    /// Length travelled along the bearing
    pub travel: f32,
    /// Travel projected onto the jump axis; this is what gets classified
    pub horizontal_distance: f32,
    /// Height of the body at the top of the arc
    pub apex_height: f32,
    /// Height the body comes back down to
    pub rest_height: f32,
    pub ascent_ms: f32,
    pub descent_ms: f32,
}

impl JumpPlan {
    pub fn duration_ms(&self) -> f32 {
        self.ascent_ms + self.descent_ms
    }

    /// Linear horizontal motion, applied as deltas
    pub fn flight_tween(&self) -> Tween {
        Tween::new(
            Channel::Flight,
            Vec3::ZERO,
            from_xz(self.displacement, 0.0),
            self.duration_ms(),
        )
    }

    /// Decelerating rise then accelerating fall ("hang and drop")
    pub fn arc_tween(&self, launch_height: f32) -> Tween {
        Tween::scalar(Channel::Ascent, launch_height, self.apex_height, self.ascent_ms)
            .easing(Easing::QuarticOut)
            .then(
                Tween::scalar(Channel::Descent, self.apex_height, self.rest_height, self.descent_ms)
                    .easing(Easing::QuarticIn),
            )
    }
}

/// Vertical body scale at a given charge (1.0 relaxed, 0.6 fully loaded)
pub fn body_scale(charge_ratio: f32) -> f32 {
    1.0 - MAX_SQUASH * clamp_ratio(charge_ratio)
}

/// Horizontal speed coefficient for a body compressed to `body_scale`
pub fn speed_coefficient(body_scale: f32) -> f32 {
    (1.0 - body_scale).max(MIN_SPEED_COEFFICIENT)
}

/// Clamp into [0, 1]; anything non-finite counts as no charge
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Tangent of the launch bearing relative to the jump axis.
///
/// A zero-length baseline (or any non-finite quotient) yields 0.
fn bearing_tan(direction: Direction, position: Vec3, next: &Platform) -> f32 {
    let (opposite, adjacent) = match direction {
        Direction::AlongZ => (position.x, next.position.z - position.z),
        Direction::AlongX => (position.z, position.x - next.position.x),
    };
    if adjacent == 0.0 {
        return 0.0;
    }
    let tan = opposite / adjacent;
    if tan.is_finite() { tan } else { 0.0 }
}

/// Plan a jump from `window.current` toward `window.next`.
///
/// `position` is where the body is right now (used for the bearing);
/// `settle` is where it will rest once any running re-centering finishes,
/// and is the origin the target is measured from.
pub fn plan(
    charge_ratio: f32,
    window: WindowView<'_>,
    position: Vec3,
    settle: Vec2,
    settings: &Settings,
) -> JumpPlan {
    let current = window.current;
    let next = window.next;

    let k = speed_coefficient(body_scale(charge_ratio));
    let travel = if settings.auto_jump {
        current.distance_to_next + current.size / 2.0 + next.size / 2.0
    } else {
        k * settings.jump_time_ms
    };

    let tan = bearing_tan(current.direction, position, next);
    let sin = tan / (1.0 + tan * tan).sqrt();
    let cos = (1.0 - sin * sin).max(0.0).sqrt();

    let displacement = match current.direction {
        Direction::AlongZ => Vec2::new(travel * sin, -travel * cos),
        Direction::AlongX => Vec2::new(travel * cos, travel * sin),
    };

    let ascent_ms = settings.jump_time_ms * 0.5;
    JumpPlan {
        target: settle + displacement,
        displacement,
        travel,
        horizontal_distance: (travel * cos).abs(),
        apex_height: PLATFORM_HEIGHT + HIGH_JUMP,
        rest_height: PLATFORM_HEIGHT,
        ascent_ms,
        descent_ms: settings.jump_time_ms - ascent_ms,
    }
}
