// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Aim: pointer intent helpers for nested menus.
//!
//! When a submenu opens beside its trigger, a user moving the pointer
//! diagonally toward it will usually sweep across sibling triggers on the way.
//! Naive hover handling would activate each of those siblings in turn and make
//! the open submenu flicker away. This crate provides the small geometric and
//! temporal pieces needed to tell "passing through" apart from "pointing at":
//!
//! - [`point_in_rect`] and [`Side`]: inclusive hit testing and which side of a
//!   trigger a surface sits on.
//! - [`PointerTrail`]: a fixed-size ring of recent pointer samples that yields a
//!   smoothed heading.
//! - [`heading_crosses_surface`]: projects a heading forward and checks whether
//!   it meets the near edge of a surface inside a vertical band.
//! - [`AimGuard`]: a time-boxed suppression owned by one trigger.
//! - [`AimTracker`]: ties the above together behind enter/leave/move calls.
//!
//! Timestamps are caller-supplied milliseconds, so the crate never reads a
//! clock and behaves deterministically under test.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_aim::{AimParams, AimTracker, HoverDecision};
//!
//! let trigger = Rect::new(0.0, 40.0, 100.0, 60.0);
//! let submenu = Rect::new(100.0, 0.0, 250.0, 200.0);
//!
//! let mut aim: AimTracker<&str> = AimTracker::new(AimParams::default());
//!
//! // The pointer drifts right and slightly down across the trigger.
//! for (i, x) in [60.0, 70.0, 80.0, 90.0].into_iter().enumerate() {
//!     aim.pointer_moved(Point::new(x, 50.0 + i as f64), 1_000 + 10 * i as u64);
//! }
//!
//! // Leaving the trigger while heading for the submenu arms the guard…
//! assert!(aim.trigger_left("files", Point::new(99.0, 55.0), 1_040, trigger, submenu));
//! // …so a sibling trigger crossed on the way is ignored.
//! assert_eq!(aim.hover(&"edit", 1_100), HoverDecision::Suppressed);
//! // The guard expires on its own.
//! assert_eq!(aim.hover(&"edit", 2_000), HoverDecision::Accept);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std`.

#![no_std]

mod geometry;
mod guard;
mod trail;

pub use geometry::{AimParams, Side, fallback_heading, heading_crosses_surface, point_in_rect};
pub use guard::{AimGuard, AimTracker, HoverDecision};
pub use trail::{PointerSample, PointerTrail, TRAIL_CAPACITY};
