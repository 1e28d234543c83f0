//! Simulation settings
//!
//! Loaded from JSON (missing fields fall back to the tuned defaults) and
//! validated once before a session starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised when settings are unreadable or violate an invariant
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be positive (got {value:.2})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("re-centering ({recenter_ms:.1} ms) must finish before the flight ({jump_time_ms:.1} ms)")]
    RecenterTooSlow { recenter_ms: f32, jump_time_ms: f32 },
    #[error("platform size minimum {min:.2} exceeds maximum {max:.2}")]
    SizeRange { min: f32, max: f32 },
    #[error("platform distance minimum {min:.2} exceeds maximum {max:.2}")]
    DistanceRange { min: f32, max: f32 },
    #[error("platform distance maximum {max_distance:.2} is below the minimum size {min_size:.2}")]
    GapRange { max_distance: f32, min_size: f32 },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Footprint and gap bounds for generated platforms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformBounds {
    pub min_size: f32,
    pub max_size: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for PlatformBounds {
    fn default() -> Self {
        Self {
            min_size: BLOCK_MIN_SIZE,
            max_size: BLOCK_MAX_SIZE,
            min_distance: BLOCK_MIN_DISTANCE,
            max_distance: BLOCK_MAX_DISTANCE,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Flight time of every jump (ms)
    pub jump_time_ms: f32,
    /// Hold duration that saturates the charge (ms)
    pub max_charge_ms: f32,
    /// Duration of the world re-centering after a landing (ms)
    pub recenter_ms: f32,

    // === Debug ===
    /// Every jump lands dead centre on the next platform
    pub auto_jump: bool,

    // === World ===
    /// Drop platforms that drift beyond twice the far plane
    pub evict_platforms: bool,
    /// Camera far plane
    pub far: f32,
    pub bounds: PlatformBounds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jump_time_ms: JUMP_TIME_MS,
            max_charge_ms: MAX_CHARGE_MS,
            recenter_ms: RECENTER_MS,

            auto_jump: false,

            evict_platforms: false,
            far: FAR,
            bounds: PlatformBounds::default(),
        }
    }
}

impl Settings {
    /// Deterministic landing on the next platform's centre
    pub fn with_auto_jump(mut self) -> Self {
        self.auto_jump = true;
        self
    }

    pub fn with_eviction(mut self) -> Self {
        self.evict_platforms = true;
        self
    }

    /// Distance beyond which a re-centred platform is evicted
    pub fn eviction_radius(&self) -> Option<f32> {
        self.evict_platforms.then_some(2.0 * self.far)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("jump_time_ms", self.jump_time_ms),
            ("max_charge_ms", self.max_charge_ms),
            ("far", self.far),
            ("bounds.min_size", self.bounds.min_size),
            ("bounds.min_distance", self.bounds.min_distance),
        ];
        for (field, value) in positive {
            // Written so NaN fails too
            if !(value > 0.0) {
                return Err(SettingsError::NotPositive { field, value });
            }
        }
        if !(self.recenter_ms >= 0.0) || self.recenter_ms >= self.jump_time_ms {
            return Err(SettingsError::RecenterTooSlow {
                recenter_ms: self.recenter_ms,
                jump_time_ms: self.jump_time_ms,
            });
        }
        let b = &self.bounds;
        if b.min_size > b.max_size {
            return Err(SettingsError::SizeRange {
                min: b.min_size,
                max: b.max_size,
            });
        }
        if b.min_distance > b.max_distance {
            return Err(SettingsError::DistanceRange {
                min: b.min_distance,
                max: b.max_distance,
            });
        }
        // The random gap term scales with max_distance - min_size
        if b.max_distance < b.min_size {
            return Err(SettingsError::GapRange {
                max_distance: b.max_distance,
                min_size: b.min_size,
            });
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
