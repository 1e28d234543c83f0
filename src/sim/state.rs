//! Game state and core simulation types
//!
//! One `GameState` is one session: the platform chain, the character, the
//! RNG stream that grows the chain, and the scheduler that plays every
//! motion. Only the session itself mutates the chain.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chain::{PlatformChain, PlatformId, Window};
use super::character::{Character, CharacterState};
use super::classifier::{self, Outcome};
use super::easing::Easing;
use super::planner::{self, JumpPlan};
use super::platform::{Platform, PlatformGenerator};
use super::tween::{Channel, Scheduler, Tween};
use crate::consts::*;
use crate::settings::{Settings, SettingsError};
use crate::xz;

/// Something the renderer or caller may want to mirror
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Input released; the jump and its (already decided) outcome
    Launched { plan: JumpPlan, outcome: Outcome },
    /// Flight finished
    Landed { outcome: Outcome },
    PlatformSpawned { id: PlatformId },
    PlatformEvicted { id: PlatformId },
    /// The anchor platform vanished; the character was re-anchored
    AnchorReset,
    GameOver { outcome: Outcome },
}

/// A jump in flight: where from, how, and how it ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingJump {
    pub window: Window,
    pub plan: JumpPlan,
    pub outcome: Outcome,
}

/// Serializable view of a session for renderers and tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub character: Character,
    /// Live platforms from oldest to newest
    pub platforms: Vec<(PlatformId, Platform)>,
    pub pending: Option<PendingJump>,
}

/// Complete state of one session
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub chain: PlatformChain,
    pub character: Character,
    /// Simulated time (ms)
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) generator: PlatformGenerator,
    pub(crate) rng: Pcg32,
    pub(crate) scheduler: Scheduler,
    pub(crate) pending: Option<PendingJump>,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session: two starting platforms, the character on the first,
    /// and the world centred on the pair
    pub fn new(seed: u64, settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let generator = PlatformGenerator::new(settings.bounds);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut chain = PlatformChain::new();
        let first = chain.append(&generator, &mut rng);
        chain.append(&generator, &mut rng);

        let mut state = Self {
            seed,
            settings,
            chain,
            character: Character::new(first),
            time_ms: 0.0,
            time_ticks: 0,
            generator,
            rng,
            scheduler: Scheduler::new(),
            pending: None,
            events: Vec::new(),
        };

        state.begin_recenter(0.0);
        state.advance(0.0);
        log::info!(
            "Session started (seed {}, auto_jump {}, eviction {})",
            seed,
            state.settings.auto_jump,
            state.settings.evict_platforms
        );
        Ok(state)
    }

    /// The platform stood on and the one ahead of it
    pub fn window(&self) -> Option<Window> {
        self.character.anchor.and_then(|a| self.chain.window_at(a))
    }

    pub fn pending(&self) -> Option<&PendingJump> {
        self.pending.as_ref()
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.scheduler.is_active(channel)
    }

    /// True once nothing is moving
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn is_over(&self) -> bool {
        self.character.is_fallen()
    }

    /// Take every event recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_ms: self.time_ms,
            character: self.character.clone(),
            platforms: self.chain.iter().map(|(id, p)| (id, p.clone())).collect(),
            pending: self.pending,
        }
    }

    /// Input pressed: start charging. Ignored unless idle.
    pub fn press(&mut self) -> bool {
        let stale = self.character.anchor.is_none_or(|a| !self.chain.contains(a));
        if !self.character.can_charge() || stale {
            // Idle on an evicted or unlinked platform
            if self.character.state == CharacterState::Idle {
                self.reset_anchor();
            }
            return false;
        }

        self.character.relax();
        self.character.state = CharacterState::Charging;
        self.scheduler.start(Tween::scalar(
            Channel::Charge,
            0.0,
            1.0,
            self.settings.max_charge_ms,
        ));
        true
    }

    /// Input released: launch. `held_ms`, when the input layer measured it,
    /// replaces the charge tracked by the scheduler.
    pub fn release(&mut self, held_ms: Option<f32>) -> bool {
        if self.character.state != CharacterState::Charging {
            return false;
        }
        self.scheduler.cancel_channel(Channel::Charge);
        if let Some(held) = held_ms {
            self.set_charge(planner::clamp_ratio(held / self.settings.max_charge_ms));
        }
        self.launch()
    }

    /// Apply a charge ratio: squash the body and the platform under it
    pub(crate) fn set_charge(&mut self, ratio: f32) {
        let ratio = planner::clamp_ratio(ratio);
        let scale = planner::body_scale(ratio);
        self.character.charge_ratio = ratio;
        self.character.body_scale = scale;
        if let Some(platform) = self.character.anchor.and_then(|a| self.chain.get_mut(a)) {
            platform.scale_height(scale);
            self.character.position.y = platform.height;
        }
    }

    fn launch(&mut self) -> bool {
        let Some(window) = self.window() else {
            self.reset_anchor();
            return false;
        };
        let Some(view) = self.chain.view(window) else {
            self.reset_anchor();
            return false;
        };

        let c = &self.character;
        let plan = planner::plan(c.charge_ratio, view, c.position, c.settle, &self.settings);
        let outcome = classifier::classify(view, c.position, plan.horizontal_distance, CHARACTER_WIDTH / 2.0);

        self.scheduler.start(Tween::scalar(
            Channel::Rebound,
            c.body_scale,
            1.0,
            self.settings.jump_time_ms / 3.0,
        ));
        self.scheduler.start(plan.flight_tween());
        self.scheduler.start(plan.arc_tween(c.position.y));

        log::debug!(
            "Launch: charge {:.2}, travel {:.2}, axis distance {:.2} -> {:?}",
            c.charge_ratio,
            plan.travel,
            plan.horizontal_distance,
            outcome
        );
        self.character.state = CharacterState::Airborne;
        self.pending = Some(PendingJump { window, plan, outcome });
        self.events.push(GameEvent::Launched { plan, outcome });
        true
    }

    /// Translate the whole world by `-delta` in the ground plane: every
    /// platform and the character move together, so relative geometry is
    /// unchanged. Platforms past the eviction radius are dropped.
    pub fn recenter(&mut self, delta: Vec3) {
        let evicted = self.chain.translate(delta, self.settings.eviction_radius());
        self.character.recenter(delta);
        for id in evicted {
            log::debug!("Evicted platform {:?}", id);
            if self.character.anchor == Some(id) {
                self.character.anchor = None;
            }
            self.events.push(GameEvent::PlatformEvicted { id });
        }
    }

    /// Ease the world so the last two platforms straddle the origin
    pub(crate) fn begin_recenter(&mut self, duration_ms: f32) {
        let Some(center) = self.chain.last_two_midpoint() else {
            return;
        };
        // Where the character ends up once the shift completes
        self.character.settle = xz(self.character.position) - xz(center);
        self.scheduler.start(
            Tween::new(Channel::Recenter, Vec3::ZERO, center, duration_ms).easing(Easing::QuadraticOut),
        );
    }

    /// Grow the chain by one platform, dropping it in from above
    pub(crate) fn spawn_platform(&mut self) -> PlatformId {
        let id = self.chain.append(&self.generator, &mut self.rng);
        if let Some(platform) = self.chain.get_mut(id) {
            log::debug!(
                "Spawned platform #{} ({:?}, size {:.1}, gap {:.0})",
                platform.ordinal,
                platform.skin,
                platform.size,
                platform.distance_to_next
            );
            if platform.ordinal >= 2 {
                platform.position.y = ENTRANCE_DROP;
                self.scheduler.start(
                    Tween::scalar(Channel::Entrance(id), ENTRANCE_DROP, 0.0, ENTRANCE_MS)
                        .easing(Easing::BounceOut),
                );
            }
        }
        self.events.push(GameEvent::PlatformSpawned { id });
        id
    }

    /// The anchor went stale: drop whatever was in progress and stand on the
    /// centre of the newest window instead. A re-centering in flight stops
    /// where it is; the next landing re-centres from scratch.
    pub(crate) fn reset_anchor(&mut self) {
        log::warn!("Anchor platform {:?} is gone, resetting", self.character.anchor);
        self.scheduler.cancel_channel(Channel::Charge);
        self.scheduler.cancel_channel(Channel::Recenter);
        self.pending = None;
        self.character.relax();
        self.character.state = CharacterState::Idle;
        self.character.anchor = self.chain.tail().and_then(|t| self.chain.prev(t));
        if let Some(platform) = self.character.anchor.and_then(|a| self.chain.get(a)) {
            self.character.position = Vec3::new(platform.position.x, platform.height, platform.position.z);
            self.character.settle = xz(self.character.position);
        }
        self.events.push(GameEvent::AnchorReset);
    }
}
