// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Rows: the per-surface row registry and active-row store.
//!
//! A *surface* is one rendered menu level (the root list or one submenu's
//! list). Each surface owns a [`SurfaceStore`] that tracks:
//!
//! - a registry of rows keyed by id ([`RowRecord`]): their kind, whether they
//!   are disabled, their index in a virtualized list, whether they are
//!   currently mounted, and for submenu triggers a [`SubmenuControl`] handle;
//! - the navigable `order` of row ids, recomputed whenever the flattened rows
//!   change;
//! - the observable [`SurfaceState`]: the active row, whether the search input
//!   is shown, and the list element id.
//!
//! The store is an explicit observable: read it with [`SurfaceStore::state`],
//! observe it with [`SurfaceStore::subscribe`] or
//! [`SurfaceStore::subscribe_select`], and mutate it only through its action
//! methods. Every logical change notifies subscribers exactly once; setting a
//! value that is already current notifies nobody.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_rows::{ActiveCause, RowKind, RowRecord, SurfaceStore};
//!
//! let mut store = SurfaceStore::new("menu-list");
//! for id in ["cut", "copy", "paste"] {
//!     store.register_row(id, RowRecord::new(RowKind::Item));
//! }
//! store.set_order(["cut", "copy", "paste"]);
//!
//! store.first(ActiveCause::Keyboard);
//! assert_eq!(store.state().active_id.as_deref(), Some("cut"));
//!
//! // Navigation wraps around.
//! store.prev(ActiveCause::Keyboard);
//! assert_eq!(store.state().active_id.as_deref(), Some("paste"));
//! ```
//!
//! ## Scrolling
//!
//! Keyboard-driven activation scrolls the new row into view. Mounted rows are
//! scrolled through the surface's [`ListElement`]; rows that are virtualized
//! away are reached through the [`Virtualizer`], but only when the move lands
//! on the first or last row, since the virtualizer already keeps neighbors of
//! the current row realized during ordinary stepping.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod record;
mod store;

pub use record::{ListElement, RowKind, RowRecord, ScrollAlign, SubmenuControl, Virtualizer};
pub use store::{ActiveCause, Subscription, SurfaceState, SurfaceStore};
