//! Platforms and their procedural generation

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PLATFORM_COLORS, PLATFORM_HEIGHT};
use crate::settings::PlatformBounds;

/// Axis along which the *next* platform is offset from this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Next platform sits further along +x
    AlongX,
    /// Next platform sits further along -z
    AlongZ,
}

/// Visual variant handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Skin {
    #[default]
    Cube,
    Cylinder,
    Express,
    MagicCube,
}

impl Skin {
    pub const ALL: [Skin; 4] = [Skin::Cube, Skin::Cylinder, Skin::Express, Skin::MagicCube];
}

/// A platform in the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Generation order, 0 for the first platform of a session
    pub ordinal: u64,
    /// Square footprint edge length
    pub size: f32,
    /// Current height (squashes while the character charges on it)
    pub height: f32,
    pub color: u32,
    pub skin: Skin,
    pub direction: Direction,
    /// Gap to the platform generated after this one
    pub distance_to_next: f32,
    /// Centre of the footprint; y is 0 at rest
    pub position: Vec3,
}

impl Platform {
    /// Scale the height relative to the rest height
    pub fn scale_height(&mut self, scale: f32) {
        self.height = PLATFORM_HEIGHT * scale;
    }

    /// Edge of the footprint facing the next platform, measured along the jump axis
    pub fn front_edge(&self) -> f32 {
        match self.direction {
            Direction::AlongX => self.position.x + self.size / 2.0,
            Direction::AlongZ => self.position.z - self.size / 2.0,
        }
    }
}

/// Where a platform of `size` lands when generated after `prev`
pub fn derive_position(prev: &Platform, size: f32) -> Vec3 {
    let offset = prev.size / 2.0 + prev.distance_to_next + size / 2.0;
    match prev.direction {
        Direction::AlongX => Vec3::new(prev.position.x + offset, 0.0, prev.position.z),
        Direction::AlongZ => Vec3::new(prev.position.x, 0.0, prev.position.z - offset),
    }
}

/// Produces the next platform from its predecessor and an RNG stream
#[derive(Debug, Clone)]
pub struct PlatformGenerator {
    bounds: PlatformBounds,
}

impl Default for PlatformGenerator {
    fn default() -> Self {
        Self::new(PlatformBounds::default())
    }
}

impl PlatformGenerator {
    pub fn new(bounds: PlatformBounds) -> Self {
        Self { bounds }
    }

    /// Gap used by the first platform: halfway between the widest gap and the
    /// smallest footprint
    pub fn first_distance(&self) -> f32 {
        0.5 * (self.bounds.max_distance + self.bounds.min_size)
    }

    /// Generate the platform that follows `prev` (`None` for the first one).
    ///
    /// The first two platforms are full-size cubes so every session opens
    /// with a safe jump.
    pub fn generate<R: Rng + ?Sized>(&self, prev: Option<&Platform>, rng: &mut R) -> Platform {
        let b = &self.bounds;

        let Some(prev) = prev else {
            return Platform {
                ordinal: 0,
                size: b.max_size,
                height: PLATFORM_HEIGHT,
                color: pick_color(rng),
                skin: Skin::Cube,
                direction: Direction::AlongX,
                distance_to_next: self.first_distance(),
                position: Vec3::ZERO,
            };
        };

        let bootstrap = prev.ordinal == 0;
        let skin = if bootstrap {
            Skin::Cube
        } else {
            Skin::ALL[rng.random_range(0..Skin::ALL.len())]
        };
        let size = if bootstrap {
            b.max_size
        } else {
            b.min_size + rng.random::<f32>() * (b.max_size - b.min_size)
        };
        let color = pick_color(rng);
        let direction = if rng.random_bool(0.5) {
            Direction::AlongX
        } else {
            Direction::AlongZ
        };
        // Upper bound subtracts min_size rather than min_distance; kept as tuned.
        // Rounding never pulls the gap under min_distance.
        let distance_to_next = (b.min_distance + rng.random::<f32>() * (b.max_distance - b.min_size))
            .round()
            .max(b.min_distance.ceil());

        Platform {
            ordinal: prev.ordinal + 1,
            size,
            height: PLATFORM_HEIGHT,
            color,
            skin,
            direction,
            distance_to_next,
            position: derive_position(prev, size),
        }
    }
}

fn pick_color<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    PLATFORM_COLORS[rng.random_range(0..PLATFORM_COLORS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn sequence(seed: u64, count: usize) -> Vec<Platform> {
        let generator = PlatformGenerator::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut out: Vec<Platform> = Vec::with_capacity(count);
        for _ in 0..count {
            let next = generator.generate(out.last(), &mut rng);
            out.push(next);
        }
        out
    }

    #[test]
    fn test_first_platform_is_fixed() {
        let first = &sequence(7, 1)[0];
        assert_eq!(first.size, BLOCK_MAX_SIZE);
        assert_eq!(first.direction, Direction::AlongX);
        assert_eq!(first.distance_to_next, 0.5 * (BLOCK_MAX_DISTANCE + BLOCK_MIN_SIZE));
        assert_eq!(first.position, Vec3::ZERO);
        assert_eq!(first.skin, Skin::Cube);
        assert!(PLATFORM_COLORS.contains(&first.color));
    }

    #[test]
    fn test_second_platform_is_full_size() {
        let platforms = sequence(11, 2);
        let second = &platforms[1];
        assert_eq!(second.size, BLOCK_MAX_SIZE);
        assert_eq!(second.skin, Skin::Cube);
        // First platform always points along x
        let expected_x = BLOCK_MAX_SIZE / 2.0 + platforms[0].distance_to_next + BLOCK_MAX_SIZE / 2.0;
        assert_eq!(second.position, Vec3::new(expected_x, 0.0, 0.0));
    }

    #[test]
    fn test_derive_position_along_z() {
        let prev = Platform {
            ordinal: 3,
            size: 20.0,
            height: PLATFORM_HEIGHT,
            color: 0,
            skin: Skin::Cube,
            direction: Direction::AlongZ,
            distance_to_next: 15.0,
            position: Vec3::new(4.0, 0.0, -6.0),
        };
        assert_eq!(derive_position(&prev, 12.0), Vec3::new(4.0, 0.0, -6.0 - 10.0 - 15.0 - 6.0));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        assert_eq!(sequence(42, 30), sequence(42, 30));
    }

    #[test]
    fn test_front_edge() {
        let mut platform = sequence(1, 1).remove(0);
        assert_eq!(platform.front_edge(), BLOCK_MAX_SIZE / 2.0);
        platform.direction = Direction::AlongZ;
        assert_eq!(platform.front_edge(), -BLOCK_MAX_SIZE / 2.0);
    }

    #[test]
    fn test_gap_upper_bound_subtracts_min_size() {
        // min_size and min_distance differ, so the two candidate bounds split:
        // min_distance + max_distance - min_size = 35, max_distance = 50
        let bounds = PlatformBounds {
            min_size: 20.0,
            max_size: 30.0,
            min_distance: 5.0,
            max_distance: 50.0,
        };
        let generator = PlatformGenerator::new(bounds);
        let mut rng = Pcg32::seed_from_u64(99);
        let mut prev = generator.generate(None, &mut rng);
        let mut widest = 0.0f32;
        for _ in 0..2000 {
            prev = generator.generate(Some(&prev), &mut rng);
            assert!(prev.distance_to_next >= 5.0);
            assert!(prev.distance_to_next <= 35.0);
            widest = widest.max(prev.distance_to_next);
        }
        // 2000 uniform draws all but surely reach the top integer
        assert_eq!(widest, 35.0);
    }

    proptest! {
        #[test]
        fn prop_generated_platforms_respect_bounds(seed in any::<u64>()) {
            let platforms = sequence(seed, 40);
            // Upper bound mixes max_distance with min_size, as tuned
            let max_gap = (BLOCK_MIN_DISTANCE + (BLOCK_MAX_DISTANCE - BLOCK_MIN_SIZE)).round();
            for platform in &platforms[2..] {
                prop_assert!(platform.size >= BLOCK_MIN_SIZE && platform.size <= BLOCK_MAX_SIZE);
                prop_assert!(platform.distance_to_next >= BLOCK_MIN_DISTANCE);
                prop_assert!(platform.distance_to_next <= max_gap);
                prop_assert_eq!(platform.distance_to_next.fract(), 0.0);
                prop_assert_eq!(platform.position.y, 0.0);
            }
        }

        #[test]
        fn prop_fractional_min_distance_is_a_floor(seed in any::<u64>()) {
            let bounds = PlatformBounds {
                min_size: 20.0,
                max_size: 30.0,
                min_distance: 10.3,
                max_distance: 25.0,
            };
            let generator = PlatformGenerator::new(bounds);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut prev = generator.generate(None, &mut rng);
            for _ in 0..40 {
                prev = generator.generate(Some(&prev), &mut rng);
                prop_assert!(prev.distance_to_next >= bounds.min_distance);
            }
        }

        #[test]
        fn prop_positions_follow_from_predecessor(seed in any::<u64>()) {
            let platforms = sequence(seed, 25);
            for pair in platforms.windows(2) {
                prop_assert_eq!(derive_position(&pair[0], pair[1].size), pair[1].position);
                prop_assert_eq!(pair[1].ordinal, pair[0].ordinal + 1);
            }
        }
    }
}
