// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recent pointer samples and heading smoothing.

use kurbo::{Point, Vec2};

/// Number of samples retained by a [`PointerTrail`].
pub const TRAIL_CAPACITY: usize = 6;

/// A single pointer position with its timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Pointer position in the surface coordinate space.
    pub position: Point,
    /// Event timestamp in milliseconds.
    pub time: u64,
}

/// Fixed-capacity ring of the most recent pointer samples.
///
/// Older samples are overwritten once [`TRAIL_CAPACITY`] is reached.
#[derive(Clone, Debug)]
pub struct PointerTrail {
    samples: [PointerSample; TRAIL_CAPACITY],
    /// Index of the oldest sample.
    head: usize,
    len: usize,
}

impl Default for PointerTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTrail {
    /// Create an empty trail.
    pub const fn new() -> Self {
        Self {
            samples: [PointerSample {
                position: Point::ZERO,
                time: 0,
            }; TRAIL_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// Record a pointer position.
    ///
    /// A sample that repeats the previous position is ignored so that
    /// duplicate move events do not dilute the heading.
    pub fn push(&mut self, position: Point, time: u64) {
        if self.last().is_some_and(|s| s.position == position) {
            return;
        }
        let sample = PointerSample { position, time };
        if self.len < TRAIL_CAPACITY {
            self.samples[(self.head + self.len) % TRAIL_CAPACITY] = sample;
            self.len += 1;
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % TRAIL_CAPACITY;
        }
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Number of retained samples.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no samples are retained.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recent sample, if any.
    pub fn last(&self) -> Option<PointerSample> {
        (self.len > 0).then(|| self.get(self.len - 1))
    }

    /// Iterate samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = PointerSample> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    fn get(&self, i: usize) -> PointerSample {
        self.samples[(self.head + i) % TRAIL_CAPACITY]
    }

    /// Smoothed heading over the retained samples.
    ///
    /// Consecutive displacements are averaged with linearly increasing weights
    /// so the newest motion dominates. Returns `None` when fewer than two
    /// samples exist or the smoothed displacement is shorter than `min_motion`.
    pub fn heading(&self, min_motion: f64) -> Option<Vec2> {
        if self.len < 2 {
            return None;
        }
        let mut sum = Vec2::ZERO;
        let mut weights = 0.0;
        let mut prev = self.get(0);
        for i in 1..self.len {
            let cur = self.get(i);
            let w = i as f64;
            sum += (cur.position - prev.position) * w;
            weights += w;
            prev = cur;
        }
        let heading = sum / weights;
        (heading.hypot2() >= min_motion * min_motion).then_some(heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_keeps_newest_samples() {
        let mut trail = PointerTrail::new();
        for i in 0..10 {
            trail.push(Point::new(i as f64, 0.0), i);
        }
        assert_eq!(trail.len(), TRAIL_CAPACITY);
        let first = trail.iter().next().unwrap();
        assert_eq!(first.time, 10 - TRAIL_CAPACITY as u64);
        assert_eq!(trail.last().unwrap().time, 9);
    }

    #[test]
    fn duplicate_positions_are_ignored() {
        let mut trail = PointerTrail::new();
        trail.push(Point::new(1.0, 1.0), 0);
        trail.push(Point::new(1.0, 1.0), 5);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn heading_favors_recent_motion() {
        let mut trail = PointerTrail::new();
        trail.push(Point::new(0.0, 0.0), 0);
        trail.push(Point::new(0.0, 10.0), 10);
        trail.push(Point::new(10.0, 10.0), 20);
        trail.push(Point::new(20.0, 10.0), 30);
        let h = trail.heading(1.0).unwrap();
        assert!(h.x > h.y, "recent horizontal motion should dominate: {h:?}");
    }

    #[test]
    fn negligible_motion_has_no_heading() {
        let mut trail = PointerTrail::new();
        trail.push(Point::new(0.0, 0.0), 0);
        trail.push(Point::new(0.5, 0.0), 10);
        assert!(trail.heading(2.0).is_none());
        assert!(trail.heading(0.1).is_some());
    }

    #[test]
    fn clear_resets() {
        let mut trail = PointerTrail::new();
        trail.push(Point::new(0.0, 0.0), 0);
        trail.clear();
        assert!(trail.is_empty());
        assert!(trail.last().is_none());
    }
}
