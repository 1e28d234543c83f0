//! Platform Hop - a jump-between-platforms arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platform chain, jump planning, outcomes)
//! - `settings`: Runtime tuning and its validation

pub mod settings;
pub mod sim;

pub use settings::{PlatformBounds, Settings, SettingsError};

use glam::{Vec2, Vec3};

/// Game configuration constants
///
/// The world is laid out on a 100-unit-wide viewport with a 3:5 aspect ratio,
/// so every length below is independent of the real screen size.
pub mod consts {
    /// Fixed simulation timestep in milliseconds (120 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions
    pub const WIDTH: f32 = 100.0;
    pub const HEIGHT: f32 = 5.0 / 3.0 * WIDTH;
    /// Camera far plane (the larger of the two viewport extents)
    pub const FAR: f32 = if WIDTH > HEIGHT { WIDTH } else { HEIGHT };

    /// Platform footprint bounds
    pub const BLOCK_MAX_SIZE: f32 = WIDTH / 3.0;
    pub const BLOCK_MIN_SIZE: f32 = WIDTH / 8.0;

    /// Gap between neighbouring platforms
    pub const BLOCK_MAX_DISTANCE: f32 = WIDTH / 2.0;
    pub const BLOCK_MIN_DISTANCE: f32 = WIDTH / 8.0;

    /// Rest height of every platform
    pub const PLATFORM_HEIGHT: f32 = BLOCK_MAX_SIZE / 2.0;

    /// Character body
    pub const CHARACTER_WIDTH: f32 = BLOCK_MIN_SIZE / 2.3;
    pub const CHARACTER_HEIGHT: f32 = CHARACTER_WIDTH * 3.5;

    /// Longest useful charge (ms)
    pub const MAX_CHARGE_MS: f32 = 1500.0;
    /// Flight time of a jump (ms)
    pub const JUMP_TIME_MS: f32 = 350.0;
    /// Extra height above the platform top at the apex
    pub const HIGH_JUMP: f32 = WIDTH / 3.5;
    /// World re-centering after a landing (ms), must stay below the flight time
    pub const RECENTER_MS: f32 = 300.0;

    /// Vertical squash reached at full charge (scale goes 1.0 -> 0.6)
    pub const MAX_SQUASH: f32 = 0.4;
    /// Floor on the horizontal speed coefficient so no jump is zero-length
    pub const MIN_SPEED_COEFFICIENT: f32 = 0.03;

    /// New platforms drop in from this height
    pub const ENTRANCE_DROP: f32 = 10.0;
    pub const ENTRANCE_MS: f32 = 400.0;

    /// Extra clearance when a toppling body slides off an edge
    pub const EDGE_CLEARANCE: f32 = 0.2;

    /// Platform palette
    pub const PLATFORM_COLORS: [u32; 7] = [
        0xfa541c, 0xfaad14, 0x13c2c2, 0x1890ff, 0x722ed1, 0xffffff, 0xa0d911,
    ];
}

/// Project a world position onto the ground plane as (x, z)
#[inline]
pub fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a ground-plane (x, z) pair back into world space at height `y`
#[inline]
pub fn from_xz(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, p.y)
}
