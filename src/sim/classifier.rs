//! Landing outcome classification
//!
//! The planned horizontal distance is compared against ordered bands
//! measured from the launch point along the jump axis. The first band that
//! contains the distance wins, and every comparison is strict.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::chain::WindowView;
use super::platform::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Came down on the platform it left
    StayOnCurrent,
    /// Came down just past the front edge of the platform it left
    FallOffCurrentFront,
    /// Came down in open space
    MissedGap,
    /// Caught the trailing edge of the next platform
    FallOffNextBack,
    /// Landed on the next platform
    LandOnNext,
    /// Overshot the next platform by less than half a body width
    FallOffNextFront,
}

impl Outcome {
    /// True for every outcome that ends the session
    pub fn is_fatal(self) -> bool {
        !matches!(self, Outcome::StayOnCurrent | Outcome::LandOnNext)
    }

    /// True for the outcomes where the body tips over an edge
    pub fn topples(self) -> bool {
        matches!(
            self,
            Outcome::FallOffCurrentFront | Outcome::FallOffNextBack | Outcome::FallOffNextFront
        )
    }

    /// True when the body tips forward, away from where it launched
    pub fn topples_forward(self) -> bool {
        matches!(self, Outcome::FallOffCurrentFront | Outcome::FallOffNextFront)
    }
}

/// Band boundaries for one jump, all measured from the launch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub current_edge: f32,
    pub next_near_edge: f32,
    pub next_far_edge: f32,
    pub tolerance: f32,
}

impl Bands {
    pub fn new(current_edge: f32, gap: f32, next_size: f32, tolerance: f32) -> Self {
        let next_near_edge = current_edge + gap;
        Self {
            current_edge,
            next_near_edge,
            next_far_edge: next_near_edge + next_size,
            tolerance,
        }
    }

    /// Bands for a jump launched from `origin` across `window`
    pub fn measure(window: WindowView<'_>, origin: Vec3, tolerance: f32) -> Self {
        let current = window.current;
        let current_edge = match current.direction {
            Direction::AlongX => current.front_edge() - origin.x,
            Direction::AlongZ => origin.z - current.front_edge(),
        };
        Self::new(current_edge, current.distance_to_next, window.next.size, tolerance)
    }

    pub fn classify(&self, distance: f32) -> Outcome {
        let d = distance;
        let t = self.tolerance;
        if d < self.current_edge {
            Outcome::StayOnCurrent
        } else if d < self.current_edge + t {
            Outcome::FallOffCurrentFront
        } else if d < self.next_near_edge - t {
            Outcome::MissedGap
        } else if d < self.next_near_edge {
            Outcome::FallOffNextBack
        } else if d < self.next_far_edge {
            Outcome::LandOnNext
        } else if d < self.next_far_edge + t {
            Outcome::FallOffNextFront
        } else {
            Outcome::MissedGap
        }
    }
}

/// Classify a jump of `horizontal_distance` launched from `origin`
pub fn classify(window: WindowView<'_>, origin: Vec3, horizontal_distance: f32, tolerance: f32) -> Outcome {
    Bands::measure(window, origin, tolerance).classify(horizontal_distance)
}
