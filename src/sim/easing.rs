//! Easing curves
//!
//! Each curve maps normalized time `t` in [0, 1] to progress, with
//! `ease(0) == 0` and `ease(1) == 1`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticOut,
    QuarticIn,
    QuarticOut,
    QuinticOut,
    BounceOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
            Easing::QuarticIn => t.powi(4),
            Easing::QuarticOut => 1.0 - (t - 1.0).powi(4),
            Easing::QuinticOut => (t - 1.0).powi(5) + 1.0,
            Easing::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    if t < 1.0 / 2.75 {
        N * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        N * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        N * t * t + 0.984375
    }
}
