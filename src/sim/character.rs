//! The jumping character

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::chain::PlatformId;
use super::classifier::Outcome;
use super::platform::Direction;
use crate::consts::PLATFORM_HEIGHT;

/// Where the character is in the jump cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterState {
    /// Standing, waiting for input
    Idle,
    /// Input held, charge building
    Charging,
    /// In flight along a planned trajectory
    Airborne,
    /// Flight finished; the outcome's follow-up motion is playing
    Resolving(Outcome),
    /// Fell off; terminal for the session
    Fallen,
}

/// Rotation of a body tipping over an edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topple {
    /// Jump axis the body rotates across
    pub axis: Direction,
    /// Signed angle in radians; negative tips forward
    pub angle: f32,
    /// Horizontal room before the tipping body meets the neighbouring platform
    pub gap: f32,
    /// Rotation was cut short by contact with the neighbouring platform
    pub halted: bool,
}

impl Topple {
    pub fn new(axis: Direction, gap: f32) -> Self {
        Self {
            axis,
            angle: 0.0,
            gap,
            halted: false,
        }
    }

    /// Horizontal extent of a body of `height` and `width` tipped by `angle`
    pub fn swept_length(angle: f32, height: f32, width: f32) -> f32 {
        angle.abs().sin() * height + width
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Feet position in world space
    pub position: Vec3,
    /// Ground-plane point the character settles at once the world stops
    /// re-centering; jumps are measured from here
    pub settle: Vec2,
    /// Held duration over the maximum, in [0, 1]
    pub charge_ratio: f32,
    /// Vertical squash of the body (1.0 relaxed)
    pub body_scale: f32,
    /// Platform currently stood on
    pub anchor: Option<PlatformId>,
    pub state: CharacterState,
    pub topple: Option<Topple>,
}

impl Character {
    pub fn new(anchor: PlatformId) -> Self {
        Self {
            position: Vec3::new(0.0, PLATFORM_HEIGHT, 0.0),
            settle: Vec2::ZERO,
            charge_ratio: 0.0,
            body_scale: 1.0,
            anchor: Some(anchor),
            state: CharacterState::Idle,
            topple: None,
        }
    }

    /// Whether the character accepts a new press
    pub fn can_charge(&self) -> bool {
        self.state == CharacterState::Idle && self.anchor.is_some()
    }

    pub fn is_fallen(&self) -> bool {
        self.state == CharacterState::Fallen
    }

    /// Shift by `-delta` in the ground plane
    pub fn recenter(&mut self, delta: Vec3) {
        self.position.x -= delta.x;
        self.position.z -= delta.z;
    }

    /// Clear any charge
    pub fn relax(&mut self) {
        self.charge_ratio = 0.0;
        self.body_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::chain::PlatformChain;
    use crate::sim::platform::PlatformGenerator;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn anchored() -> Character {
        let mut chain = PlatformChain::new();
        let id = chain.append(&PlatformGenerator::default(), &mut Pcg32::seed_from_u64(0));
        Character::new(id)
    }

    #[test]
    fn test_new_character_stands_idle() {
        let character = anchored();
        assert_eq!(character.state, CharacterState::Idle);
        assert_eq!(character.position.y, PLATFORM_HEIGHT);
        assert!(character.can_charge());
    }

    #[test]
    fn test_cannot_charge_without_anchor_or_while_busy() {
        let mut character = anchored();
        character.state = CharacterState::Airborne;
        assert!(!character.can_charge());
        character.state = CharacterState::Idle;
        character.anchor = None;
        assert!(!character.can_charge());
    }

    #[test]
    fn test_recenter_keeps_height() {
        let mut character = anchored();
        character.position = Vec3::new(5.0, 3.0, -2.0);
        character.recenter(Vec3::new(1.0, 99.0, -1.0));
        assert_eq!(character.position, Vec3::new(4.0, 3.0, -1.0));
    }

    #[test]
    fn test_swept_length_grows_with_angle() {
        assert_eq!(Topple::swept_length(0.0, 10.0, 2.0), 2.0);
        assert!((Topple::swept_length(-std::f32::consts::FRAC_PI_2, 10.0, 2.0) - 12.0).abs() < 1e-5);
    }
}
