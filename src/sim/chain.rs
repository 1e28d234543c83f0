//! The platform chain
//!
//! Platforms live in an arena of slots addressed by generational
//! `PlatformId`s. Each node records its predecessor and successor handle,
//! so appending and evicting are O(1) unlinks, and a handle to an evicted
//! platform simply stops resolving instead of dangling.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformGenerator};

/// Handle to a platform in a `PlatformChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Node {
    platform: Platform,
    prev: Option<PlatformId>,
    next: Option<PlatformId>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The platform the character stands on and the one it is jumping toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub current: PlatformId,
    pub next: PlatformId,
}

/// A resolved `Window`
#[derive(Debug, Clone, Copy)]
pub struct WindowView<'a> {
    pub current: &'a Platform,
    pub next: &'a Platform,
}

#[derive(Debug, Clone, Default)]
pub struct PlatformChain {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<PlatformId>,
    tail: Option<PlatformId>,
    len: usize,
}

impl PlatformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a platform after the current tail and link it in
    pub fn append<R: Rng + ?Sized>(&mut self, generator: &PlatformGenerator, rng: &mut R) -> PlatformId {
        let platform = generator.generate(self.tail_platform(), rng);
        self.push_back(platform)
    }

    /// Link an already-built platform in as the new tail
    pub fn push_back(&mut self, platform: Platform) -> PlatformId {
        let node = Node {
            platform,
            prev: self.tail,
            next: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                PlatformId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                PlatformId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        if let Some(tail) = self.tail.and_then(|t| self.node_mut(t)) {
            tail.next = Some(id);
        }
        if self.head.is_none() {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    fn node(&self, id: PlatformId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: PlatformId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.node(id).map(|n| &n.platform)
    }

    pub fn get_mut(&mut self, id: PlatformId) -> Option<&mut Platform> {
        self.node_mut(id).map(|n| &mut n.platform)
    }

    pub fn contains(&self, id: PlatformId) -> bool {
        self.node(id).is_some()
    }

    pub fn prev(&self, id: PlatformId) -> Option<PlatformId> {
        self.node(id).and_then(|n| n.prev)
    }

    pub fn next(&self, id: PlatformId) -> Option<PlatformId> {
        self.node(id).and_then(|n| n.next)
    }

    pub fn head(&self) -> Option<PlatformId> {
        self.head
    }

    pub fn tail(&self) -> Option<PlatformId> {
        self.tail
    }

    fn tail_platform(&self) -> Option<&Platform> {
        self.tail.and_then(|t| self.get(t))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live platforms from head to tail
    pub fn iter(&self) -> impl Iterator<Item = (PlatformId, &Platform)> + '_ {
        std::iter::successors(self.head, move |&id| self.next(id))
            .filter_map(move |id| self.get(id).map(|p| (id, p)))
    }

    /// The window starting at `current`, if both it and its successor are live
    pub fn window_at(&self, current: PlatformId) -> Option<Window> {
        let next = self.next(current)?;
        Some(Window { current, next })
    }

    pub fn view(&self, window: Window) -> Option<WindowView<'_>> {
        Some(WindowView {
            current: self.get(window.current)?,
            next: self.get(window.next)?,
        })
    }

    /// Midpoint of the last two platforms, where the world re-centres to
    pub fn last_two_midpoint(&self) -> Option<Vec3> {
        let tail = self.tail?;
        let last = self.get(tail)?;
        let second = self.get(self.prev(tail)?)?;
        Some(Vec3::new(
            0.5 * (last.position.x + second.position.x),
            0.0,
            0.5 * (last.position.z + second.position.z),
        ))
    }

    /// Shift every live platform by `-delta` in the ground plane, walking
    /// tail to head.
    ///
    /// With `evict_beyond` set, platforms whose shifted x or z magnitude
    /// exceeds it are unlinked instead of moved. Returns the evicted handles.
    pub fn translate(&mut self, delta: Vec3, evict_beyond: Option<f32>) -> Vec<PlatformId> {
        let mut evicted = Vec::new();
        let mut cursor = self.tail;

        while let Some(id) = cursor {
            let Some(node) = self.node_mut(id) else { break };
            cursor = node.prev;

            let x = node.platform.position.x - delta.x;
            let z = node.platform.position.z - delta.z;
            match evict_beyond {
                Some(limit) if x.abs() > limit || z.abs() > limit => evicted.push(id),
                _ => {
                    node.platform.position.x = x;
                    node.platform.position.z = z;
                }
            }
        }

        for &id in &evicted {
            self.unlink(id);
        }
        evicted
    }

    /// Detach a platform from both neighbours and discard it
    pub fn unlink(&mut self, id: PlatformId) -> Option<Platform> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        Some(node.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::derive_position;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn chain_of(seed: u64, count: usize) -> PlatformChain {
        let generator = PlatformGenerator::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut chain = PlatformChain::new();
        for _ in 0..count {
            chain.append(&generator, &mut rng);
        }
        chain
    }

    #[test]
    fn test_append_links_neighbours() {
        let chain = chain_of(3, 3);
        let ids: Vec<_> = chain.iter().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(chain.head(), Some(ids[0]));
        assert_eq!(chain.tail(), Some(ids[2]));
        assert_eq!(chain.next(ids[0]), Some(ids[1]));
        assert_eq!(chain.prev(ids[2]), Some(ids[1]));
        assert_eq!(chain.prev(ids[0]), None);
        assert_eq!(chain.next(ids[2]), None);
    }

    #[test]
    fn test_window_and_view() {
        let chain = chain_of(5, 2);
        let head = chain.head().unwrap();
        let window = chain.window_at(head).unwrap();
        assert_eq!(window.next, chain.tail().unwrap());
        let view = chain.view(window).unwrap();
        assert_eq!(view.current.ordinal, 0);
        assert_eq!(view.next.ordinal, 1);
        assert!(chain.window_at(window.next).is_none());
    }

    #[test]
    fn test_midpoint_of_last_two() {
        let chain = chain_of(8, 2);
        let second = chain.get(chain.tail().unwrap()).unwrap();
        let mid = chain.last_two_midpoint().unwrap();
        assert_eq!(mid, Vec3::new(second.position.x / 2.0, 0.0, 0.0));
        assert!(chain_of(8, 1).last_two_midpoint().is_none());
    }

    #[test]
    fn test_unlink_middle_and_stale_handle() {
        let mut chain = chain_of(9, 3);
        let ids: Vec<_> = chain.iter().map(|(id, _)| id).collect();
        assert!(chain.unlink(ids[1]).is_some());
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.next(ids[0]), Some(ids[2]));
        assert_eq!(chain.prev(ids[2]), Some(ids[0]));
        assert!(chain.get(ids[1]).is_none());
        assert!(chain.unlink(ids[1]).is_none());

        // Slot reuse must not revive the old handle
        let fresh = chain.append(&PlatformGenerator::default(), &mut Pcg32::seed_from_u64(1));
        assert_ne!(fresh, ids[1]);
        assert!(!chain.contains(ids[1]));
        assert_eq!(chain.tail(), Some(fresh));
    }

    #[test]
    fn test_eviction_unlinks_far_platforms() {
        let mut chain = chain_of(12, 3);
        let ids: Vec<_> = chain.iter().map(|(id, _)| id).collect();
        let first_x = chain.get(ids[0]).unwrap().position.x;
        let second_x = chain.get(ids[1]).unwrap().position.x;

        // Push everything so only the head drifts past the limit
        let limit = 150.0;
        let delta = Vec3::new(first_x + limit + 1.0, 0.0, 0.0);
        assert!(second_x - delta.x >= -limit);
        let evicted = chain.translate(delta, Some(limit));

        assert_eq!(evicted, vec![ids[0]]);
        assert_eq!(chain.head(), Some(ids[1]));
        assert_eq!(chain.prev(ids[1]), None);
        assert!(chain.iter().all(|(id, _)| id != ids[0]));
        assert!(chain.iter().all(|(id, _)| id != ids[0]));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_translate_without_eviction_keeps_everything() {
        let mut chain = chain_of(12, 4);
        let evicted = chain.translate(Vec3::new(1.0e6, 0.0, -1.0e6), None);
        assert!(evicted.is_empty());
        assert_eq!(chain.len(), 4);
    }

    proptest! {
        #[test]
        fn prop_translate_shifts_uniformly(seed in any::<u64>(), dx in -500.0f32..500.0, dz in -500.0f32..500.0) {
            let mut chain = chain_of(seed, 8);
            let before: Vec<_> = chain.iter().map(|(_, p)| p.position).collect();
            chain.translate(Vec3::new(dx, 0.0, dz), None);
            let after: Vec<_> = chain.iter().map(|(_, p)| p.position).collect();
            for (old, new) in before.iter().zip(&after) {
                prop_assert_eq!(new.x, old.x - dx);
                prop_assert_eq!(new.z, old.z - dz);
                prop_assert_eq!(new.y, old.y);
            }
        }

        #[test]
        fn prop_positions_rederive_from_chain(seed in any::<u64>(), count in 2usize..30) {
            let chain = chain_of(seed, count);
            let platforms: Vec<_> = chain.iter().map(|(_, p)| p.clone()).collect();
            prop_assert_eq!(platforms.len(), count);
            for pair in platforms.windows(2) {
                prop_assert_eq!(derive_position(&pair[0], pair[1].size), pair[1].position);
            }
        }
    }
}
