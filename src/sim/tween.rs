//! Scheduled interpolation
//!
//! A session owns one `Scheduler`. Every motion in the simulation is a
//! `Tween` on a `Channel`; advancing the scheduler yields the events that
//! would otherwise be start/update/complete callbacks, and the owner applies
//! them to its own state. Keeping the scheduler explicit (rather than a global
//! registry) lets several sessions and tests run side by side.

use glam::Vec3;

use super::chain::PlatformId;
use super::easing::Easing;

/// What a tween drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Charge ratio while the input is held (x component)
    Charge,
    /// Body and platform scale springing back after release (x component)
    Rebound,
    /// Horizontal flight displacement (applied as deltas)
    Flight,
    /// Vertical rise to the apex
    Ascent,
    /// Vertical drop from the apex back to platform height
    Descent,
    /// World re-centering offset (applied as deltas)
    Recenter,
    /// Drop-in of a freshly generated platform (y component)
    Entrance(PlatformId),
    /// Toppling angle about the departure edge (x component)
    Topple,
    /// Slide off the edge after toppling (applied as deltas)
    Slide,
    /// Final fall to the ground (y component)
    Drop,
}

/// A single interpolation, optionally chained to a successor
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub channel: Channel,
    pub from: Vec3,
    pub to: Vec3,
    pub duration_ms: f32,
    pub easing: Easing,
    then: Option<Box<Tween>>,
}

impl Tween {
    pub fn new(channel: Channel, from: Vec3, to: Vec3, duration_ms: f32) -> Self {
        Self {
            channel,
            from,
            to,
            duration_ms,
            easing: Easing::Linear,
            then: None,
        }
    }

    /// Tween a single value carried in the x component
    pub fn scalar(channel: Channel, from: f32, to: f32, duration_ms: f32) -> Self {
        Self::new(channel, Vec3::new(from, 0.0, 0.0), Vec3::new(to, 0.0, 0.0), duration_ms)
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Run `next` once this tween (and anything already chained) completes
    pub fn then(mut self, next: Tween) -> Self {
        let mut slot = &mut self.then;
        while let Some(tween) = slot {
            slot = &mut tween.then;
        }
        *slot = Some(Box::new(next));
        self
    }

    /// Interpolated value after `elapsed_ms`
    pub fn value_at(&self, elapsed_ms: f32) -> Vec3 {
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    /// Duration of this tween plus everything chained after it
    pub fn total_duration_ms(&self) -> f32 {
        self.duration_ms + self.then.as_ref().map_or(0.0, |t| t.total_duration_ms())
    }
}

/// Identifies a started tween chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEvent {
    Started {
        handle: TweenHandle,
        channel: Channel,
    },
    /// `previous` is the value reported on the prior update (or `from`)
    Update {
        handle: TweenHandle,
        channel: Channel,
        value: Vec3,
        previous: Vec3,
    },
    Complete {
        handle: TweenHandle,
        channel: Channel,
    },
}

#[derive(Debug)]
struct Running {
    handle: TweenHandle,
    tween: Tween,
    elapsed: f32,
    last: Vec3,
    started: bool,
    finished: bool,
}

/// Session-owned set of active tweens
#[derive(Debug, Default)]
pub struct Scheduler {
    running: Vec<Running>,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tween; it begins on the next `advance`
    pub fn start(&mut self, tween: Tween) -> TweenHandle {
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.running.push(Running {
            handle,
            last: tween.from,
            tween,
            elapsed: 0.0,
            started: false,
            finished: false,
        });
        handle
    }

    /// Stop a tween chain without completing it. Returns false if it already ended.
    pub fn cancel(&mut self, handle: TweenHandle) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r.handle != handle);
        self.running.len() != before
    }

    /// Stop every tween currently on `channel`
    pub fn cancel_channel(&mut self, channel: Channel) -> usize {
        let before = self.running.len();
        self.running.retain(|r| r.tween.channel != channel);
        before - self.running.len()
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.running.iter().any(|r| r.tween.channel == channel)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    /// Advance all tweens by `dt_ms`, in start order.
    ///
    /// Time left over when a tween completes flows into its chained successor
    /// within the same call.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<TweenEvent> {
        let mut events = Vec::new();

        for run in &mut self.running {
            let mut budget = dt_ms.max(0.0);
            loop {
                let channel = run.tween.channel;
                if !run.started {
                    run.started = true;
                    events.push(TweenEvent::Started {
                        handle: run.handle,
                        channel,
                    });
                }

                run.elapsed += budget;
                let value = run.tween.value_at(run.elapsed);
                events.push(TweenEvent::Update {
                    handle: run.handle,
                    channel,
                    value,
                    previous: run.last,
                });
                run.last = value;

                if run.elapsed < run.tween.duration_ms {
                    break;
                }

                events.push(TweenEvent::Complete {
                    handle: run.handle,
                    channel,
                });
                budget = (run.elapsed - run.tween.duration_ms).max(0.0);

                match run.tween.then.take() {
                    Some(next) => {
                        run.tween = *next;
                        run.elapsed = 0.0;
                        run.last = run.tween.from;
                        run.started = false;
                    }
                    None => {
                        run.finished = true;
                        break;
                    }
                }
            }
        }

        self.running.retain(|r| !r.finished);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(events: &[TweenEvent], channel: Channel) -> Vec<(Vec3, Vec3)> {
        events
            .iter()
            .filter_map(|e| match *e {
                TweenEvent::Update {
                    channel: c,
                    value,
                    previous,
                    ..
                } if c == channel => Some((value, previous)),
                _ => None,
            })
            .collect()
    }

    fn completed(events: &[TweenEvent], channel: Channel) -> bool {
        events
            .iter()
            .any(|e| matches!(e, TweenEvent::Complete { channel: c, .. } if *c == channel))
    }

    #[test]
    fn test_linear_progress_and_completion() {
        let mut scheduler = Scheduler::new();
        scheduler.start(Tween::scalar(Channel::Charge, 0.0, 1.0, 100.0));

        let events = scheduler.advance(25.0);
        assert!(matches!(events[0], TweenEvent::Started { channel: Channel::Charge, .. }));
        let (value, previous) = updates(&events, Channel::Charge)[0];
        assert!((value.x - 0.25).abs() < 1e-6);
        assert_eq!(previous.x, 0.0);

        let events = scheduler.advance(100.0);
        let (value, previous) = updates(&events, Channel::Charge)[0];
        assert_eq!(value.x, 1.0);
        assert!((previous.x - 0.25).abs() < 1e-6);
        assert!(completed(&events, Channel::Charge));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_zero_duration_completes_on_first_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.start(Tween::new(Channel::Recenter, Vec3::ZERO, Vec3::new(3.0, 0.0, -2.0), 0.0));
        let events = scheduler.advance(0.0);
        assert_eq!(updates(&events, Channel::Recenter), vec![(Vec3::new(3.0, 0.0, -2.0), Vec3::ZERO)]);
        assert!(completed(&events, Channel::Recenter));
    }

    #[test]
    fn test_chain_carries_overflow() {
        let mut scheduler = Scheduler::new();
        let up = Tween::scalar(Channel::Ascent, 0.0, 10.0, 50.0);
        let down = Tween::scalar(Channel::Descent, 10.0, 0.0, 50.0);
        scheduler.start(up.then(down));

        // 60 ms: ascent done, descent already 10 ms in
        let events = scheduler.advance(60.0);
        assert!(completed(&events, Channel::Ascent));
        let (value, previous) = updates(&events, Channel::Descent)[0];
        assert!((value.x - 8.0).abs() < 1e-5);
        assert_eq!(previous.x, 10.0);
        assert!(scheduler.is_active(Channel::Descent));
        assert!(!scheduler.is_active(Channel::Ascent));

        let events = scheduler.advance(40.0);
        assert!(completed(&events, Channel::Descent));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_then_appends_to_end_of_chain() {
        let chain = Tween::scalar(Channel::Slide, 0.0, 1.0, 10.0)
            .then(Tween::scalar(Channel::Drop, 0.0, 1.0, 20.0))
            .then(Tween::scalar(Channel::Topple, 0.0, 1.0, 30.0));
        assert_eq!(chain.total_duration_ms(), 60.0);
    }

    #[test]
    fn test_cancel_stops_without_complete() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.start(Tween::scalar(Channel::Topple, 0.0, 1.0, 100.0));
        scheduler.advance(10.0);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(100.0).is_empty());
    }

    #[test]
    fn test_cancel_channel() {
        let mut scheduler = Scheduler::new();
        scheduler.start(Tween::scalar(Channel::Charge, 0.0, 1.0, 100.0));
        scheduler.start(Tween::scalar(Channel::Recenter, 0.0, 1.0, 100.0));
        assert_eq!(scheduler.cancel_channel(Channel::Charge), 1);
        assert!(!scheduler.is_active(Channel::Charge));
        assert!(scheduler.is_active(Channel::Recenter));
    }

    #[test]
    fn test_deltas_sum_to_total() {
        let mut scheduler = Scheduler::new();
        let target = Vec3::new(40.0, 0.0, -25.0);
        scheduler.start(
            Tween::new(Channel::Recenter, Vec3::ZERO, target, 300.0).easing(Easing::QuadraticOut),
        );
        let mut applied = Vec3::ZERO;
        while !scheduler.is_idle() {
            for (value, previous) in updates(&scheduler.advance(7.0), Channel::Recenter) {
                applied += value - previous;
            }
        }
        assert!((applied - target).length() < 1e-3);
    }
}
