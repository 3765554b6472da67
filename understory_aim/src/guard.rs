// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-boxed hover suppression.

use kurbo::{Point, Rect};

use crate::{AimParams, PointerTrail, fallback_heading, heading_crosses_surface};

/// Outcome of a hover request while an aim guard may be armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverDecision {
    /// The hover should take effect (activate the row, open the submenu).
    Accept,
    /// The hover is suppressed because the pointer is aiming at another trigger's submenu.
    Suppressed,
}

/// A suppression window owned by one trigger.
///
/// While armed and unexpired, hover-driven changes on any trigger other than
/// the owner are suppressed. The guard expires on its own once `now` reaches
/// the deadline; no timer is needed.
#[derive(Clone, Debug)]
pub struct AimGuard<K> {
    owner: Option<K>,
    expires_at: u64,
}

impl<K> Default for AimGuard<K> {
    fn default() -> Self {
        Self {
            owner: None,
            expires_at: 0,
        }
    }
}

impl<K: PartialEq> AimGuard<K> {
    /// Create a disarmed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the guard for `owner` until `now + ttl_ms`.
    pub fn activate(&mut self, owner: K, now: u64, ttl_ms: u64) {
        self.owner = Some(owner);
        self.expires_at = now.saturating_add(ttl_ms);
    }

    /// Disarm the guard.
    pub fn clear(&mut self) {
        self.owner = None;
    }

    /// Returns `true` if the guard is armed and has not expired at `now`.
    pub fn is_active(&self, now: u64) -> bool {
        self.owner.is_some() && now < self.expires_at
    }

    /// The trigger that owns the guard, if it is still active at `now`.
    pub fn owner(&self, now: u64) -> Option<&K> {
        if self.is_active(now) {
            self.owner.as_ref()
        } else {
            None
        }
    }

    /// Returns `true` if a hover on `candidate` at `now` must be ignored.
    pub fn suppresses(&self, candidate: &K, now: u64) -> bool {
        self.owner(now).is_some_and(|owner| owner != candidate)
    }
}

/// Pointer trail plus aim guard behind a small event-style API.
///
/// Hosts feed every pointer move to [`AimTracker::pointer_moved`], call
/// [`AimTracker::trigger_left`] when the pointer leaves a trigger whose
/// submenu is open, and consult [`AimTracker::hover`] before acting on a
/// hover.
#[derive(Clone, Debug)]
pub struct AimTracker<K> {
    params: AimParams,
    trail: PointerTrail,
    guard: AimGuard<K>,
}

impl<K: PartialEq + Clone> AimTracker<K> {
    /// Create a tracker with the given parameters.
    pub fn new(params: AimParams) -> Self {
        Self {
            params,
            trail: PointerTrail::new(),
            guard: AimGuard::new(),
        }
    }

    /// The parameters this tracker was created with.
    pub fn params(&self) -> &AimParams {
        &self.params
    }

    /// The underlying guard.
    pub fn guard(&self) -> &AimGuard<K> {
        &self.guard
    }

    /// Record a pointer move.
    pub fn pointer_moved(&mut self, position: Point, time: u64) {
        self.trail.push(position, time);
    }

    /// Decide whether a hover on `candidate` should take effect.
    ///
    /// An accepted hover clears the guard: the pointer has either reached the
    /// owner again or the guard had already lapsed.
    pub fn hover(&mut self, candidate: &K, now: u64) -> HoverDecision {
        if self.guard.suppresses(candidate, now) {
            HoverDecision::Suppressed
        } else {
            self.guard.clear();
            HoverDecision::Accept
        }
    }

    /// The pointer left `trigger_id` at `exit`; arm the guard if it is heading
    /// for the open submenu surface.
    ///
    /// Returns `true` if the guard was armed.
    pub fn trigger_left(
        &mut self,
        trigger_id: K,
        exit: Point,
        now: u64,
        trigger: Rect,
        surface: Rect,
    ) -> bool {
        self.trail.push(exit, now);
        let heading = self
            .trail
            .heading(self.params.min_motion)
            .unwrap_or_else(|| fallback_heading(trigger, surface));
        if heading_crosses_surface(exit, heading, trigger, surface, &self.params) {
            self.guard.activate(trigger_id, now, self.params.guard_ms);
            true
        } else {
            self.guard.clear();
            false
        }
    }

    /// Disarm the guard and forget pointer history (for example when the menu closes).
    pub fn reset(&mut self) {
        self.guard.clear();
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: Rect = Rect::new(0.0, 40.0, 100.0, 60.0);
    const SUBMENU: Rect = Rect::new(100.0, 0.0, 250.0, 200.0);

    #[test]
    fn guard_expires() {
        let mut guard = AimGuard::new();
        guard.activate(1_u32, 100, 600);
        assert!(guard.is_active(699));
        assert!(!guard.is_active(700));
        assert!(guard.suppresses(&2, 500));
        assert!(!guard.suppresses(&1, 500));
        assert!(!guard.suppresses(&2, 800));
    }

    #[test]
    fn moving_toward_submenu_arms_guard() {
        let mut aim = AimTracker::new(AimParams::default());
        aim.pointer_moved(Point::new(50.0, 50.0), 0);
        aim.pointer_moved(Point::new(70.0, 55.0), 10);
        aim.pointer_moved(Point::new(90.0, 60.0), 20);
        assert!(aim.trigger_left(1_u32, Point::new(95.0, 61.0), 25, TRIGGER, SUBMENU));
        assert_eq!(aim.hover(&2, 100), HoverDecision::Suppressed);
        assert_eq!(aim.hover(&1, 100), HoverDecision::Accept);
        // Accepting the owner disarmed the guard.
        assert_eq!(aim.hover(&2, 101), HoverDecision::Accept);
    }

    #[test]
    fn moving_away_does_not_arm() {
        let mut aim = AimTracker::new(AimParams::default());
        aim.pointer_moved(Point::new(90.0, 50.0), 0);
        aim.pointer_moved(Point::new(60.0, 55.0), 10);
        assert!(!aim.trigger_left(1_u32, Point::new(50.0, 61.0), 20, TRIGGER, SUBMENU));
        assert_eq!(aim.hover(&2, 30), HoverDecision::Accept);
    }

    #[test]
    fn stationary_pointer_uses_fallback_heading() {
        let mut aim = AimTracker::new(AimParams::default());
        assert!(aim.trigger_left(1_u32, Point::new(99.0, 50.0), 0, TRIGGER, SUBMENU));
        assert!(aim.guard().is_active(599));
    }

    #[test]
    fn reset_disarms() {
        let mut aim = AimTracker::new(AimParams::default());
        aim.trigger_left(1_u32, Point::new(99.0, 50.0), 0, TRIGGER, SUBMENU);
        aim.reset();
        assert!(!aim.guard().is_active(1));
    }
}
