//! Fixed timestep simulation tick
//!
//! Input is applied first, then the scheduler advances and every tween event
//! is written back into the session. Landing outcomes are resolved here when
//! the descent completes.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use super::chain::Window;
use super::character::{CharacterState, Topple};
use super::classifier::Outcome;
use super::easing::Easing;
use super::platform::Direction;
use super::state::{GameEvent, GameState};
use super::tween::{Channel, Tween, TweenEvent, TweenHandle};
use crate::consts::*;
use crate::xz;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Input went down this tick
    pub press: bool,
    /// Input came up this tick
    pub release: bool,
    /// How long the input was held, if the input layer measured it
    pub held_ms: Option<f32>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if state.is_over() {
        return;
    }
    if input.press {
        state.press();
    }
    if input.release {
        state.release(input.held_ms);
    }
    state.advance(dt_ms);
}

impl GameState {
    /// Advance every running motion by `dt_ms` and apply the results
    pub fn advance(&mut self, dt_ms: f32) {
        self.time_ticks += 1;
        self.time_ms += f64::from(dt_ms);
        for event in self.scheduler.advance(dt_ms) {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: TweenEvent) {
        match event {
            TweenEvent::Started { .. } => {}
            TweenEvent::Update {
                handle,
                channel,
                value,
                previous,
            } => self.apply_update(handle, channel, value, previous),
            TweenEvent::Complete { channel, .. } => match channel {
                Channel::Descent => self.resolve(),
                Channel::Topple | Channel::Drop => self.settle_fall(),
                _ => {}
            },
        }
    }

    fn apply_update(&mut self, handle: TweenHandle, channel: Channel, value: Vec3, previous: Vec3) {
        match channel {
            Channel::Charge => {
                if self.character.state == CharacterState::Charging {
                    self.set_charge(value.x);
                }
            }
            Channel::Rebound => {
                self.character.body_scale = value.x;
                if let Some(platform) = self.character.anchor.and_then(|a| self.chain.get_mut(a)) {
                    platform.scale_height(value.x);
                }
            }
            Channel::Flight | Channel::Slide => {
                let delta = value - previous;
                self.character.position.x += delta.x;
                self.character.position.z += delta.z;
            }
            Channel::Ascent | Channel::Descent | Channel::Drop => {
                self.character.position.y = value.x;
            }
            Channel::Recenter => self.recenter(value - previous),
            Channel::Entrance(id) => {
                if let Some(platform) = self.chain.get_mut(id) {
                    platform.position.y = value.x;
                }
            }
            Channel::Topple => self.rotate(handle, value.x),
        }
    }

    /// Flight is over: play out the outcome decided at launch
    fn resolve(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let outcome = pending.outcome;
        log::debug!("Landed: {:?}", outcome);
        self.events.push(GameEvent::Landed { outcome });
        self.character.state = CharacterState::Resolving(outcome);

        match outcome {
            Outcome::StayOnCurrent => {
                self.character.settle = xz(self.character.position);
                self.character.state = CharacterState::Idle;
            }
            Outcome::LandOnNext => {
                if !self.chain.contains(pending.window.next) {
                    self.reset_anchor();
                    return;
                }
                self.character.anchor = Some(pending.window.next);
                self.character.state = CharacterState::Idle;
                self.spawn_platform();
                self.begin_recenter(self.settings.recenter_ms);
            }
            Outcome::MissedGap => {
                self.scheduler.start(
                    Tween::scalar(
                        Channel::Drop,
                        self.character.position.y,
                        0.0,
                        self.settings.jump_time_ms * 2.0,
                    )
                    .easing(Easing::QuinticOut),
                );
            }
            Outcome::FallOffCurrentFront | Outcome::FallOffNextBack | Outcome::FallOffNextFront => {
                self.begin_topple(pending.window, outcome);
            }
        }
    }

    /// Tip over the edge, slide clear of it, then drop
    fn begin_topple(&mut self, window: Window, outcome: Outcome) {
        let Some(view) = self.chain.view(window) else {
            self.reset_anchor();
            return;
        };
        let (current, next) = (view.current, view.next);
        let axis = current.direction;
        let gap = match outcome {
            Outcome::FallOffNextFront => CHARACTER_HEIGHT * 2.0,
            _ => current.distance_to_next,
        };

        let reach = CHARACTER_WIDTH / 2.0 + EDGE_CLEARANCE;
        let position = self.character.position;
        let slide = match axis {
            Direction::AlongX => {
                let edge = match outcome {
                    Outcome::FallOffCurrentFront => current.position.x + current.size / 2.0 + reach,
                    Outcome::FallOffNextBack => next.position.x - next.size / 2.0 - reach,
                    _ => next.position.x + next.size / 2.0 + reach,
                };
                Vec3::new(edge - position.x, 0.0, 0.0)
            }
            Direction::AlongZ => {
                let edge = match outcome {
                    Outcome::FallOffCurrentFront => current.position.z - current.size / 2.0 - reach,
                    Outcome::FallOffNextBack => next.position.z + next.size / 2.0 + reach,
                    _ => next.position.z - next.size / 2.0 - reach,
                };
                Vec3::new(0.0, 0.0, edge - position.z)
            }
        };

        let rotate_ms = self.settings.jump_time_ms * 2.0;
        let slide_ms = self.settings.jump_time_ms / 2.0;
        self.character.topple = Some(Topple::new(axis, gap));
        self.scheduler
            .start(Tween::scalar(Channel::Topple, 0.0, FRAC_PI_2, rotate_ms));
        self.scheduler.start(
            Tween::new(Channel::Slide, Vec3::ZERO, slide, slide_ms).then(
                Tween::scalar(Channel::Drop, position.y, CHARACTER_WIDTH / 2.0, rotate_ms - slide_ms)
                    .easing(Easing::QuinticOut),
            ),
        );
    }

    fn rotate(&mut self, handle: TweenHandle, angle: f32) {
        let forward = matches!(self.character.state, CharacterState::Resolving(o) if o.topples_forward());
        let Some(topple) = self.character.topple.as_mut() else {
            return;
        };
        topple.angle = if forward { -angle } else { angle };

        // Stop as soon as the body would reach across the gap
        if Topple::swept_length(angle, CHARACTER_HEIGHT, CHARACTER_WIDTH) > topple.gap {
            topple.halted = true;
            self.scheduler.cancel(handle);
            log::debug!("Topple halted at {:.3} rad", angle);
            self.settle_fall();
        }
    }

    /// Game over once every falling motion has finished
    fn settle_fall(&mut self) {
        let CharacterState::Resolving(outcome) = self.character.state else {
            return;
        };
        if !outcome.is_fatal() {
            return;
        }
        let moving = [Channel::Topple, Channel::Slide, Channel::Drop]
            .into_iter()
            .any(|c| self.scheduler.is_active(c));
        if moving {
            return;
        }
        self.character.state = CharacterState::Fallen;
        self.events.push(GameEvent::GameOver { outcome });
        log::info!("Game over after {:.0} ms: {:?}", self.time_ms, outcome);
    }
}
