// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Menu Loader: asynchronous submenu data.
//!
//! Submenus may carry a [`Loader`](understory_menu_tree::Loader): static
//! nodes, a future factory, or an adapter-specific handle. A
//! [`LoaderAdapter`] turns a loader and a [`LoaderContext`](understory_menu_tree::LoaderContext)
//! into a [`LoaderState`] (`data`, `is_loading`, `is_fetching`, `is_error`,
//! `error`), so the menu core never depends on a particular data-fetching
//! library.
//!
//! - [`NativeAdapter`] is the default: it spawns loader futures on a
//!   caller-supplied [`LocalSpawn`](futures::task::LocalSpawn), keeps no
//!   cache, and aborts in-flight work on release. Values that still arrive
//!   for a released context are discarded.
//! - [`QueryAdapter`] serves results from a [`QueryCache`] and revalidates
//!   stale entries in the background, reporting `is_fetching` meanwhile.
//!
//! [`DeepSearch`] loads every `deep_search` submenu in parallel while a query
//! is active, injects results into a copy of the definition as they arrive,
//! and aggregates flags and per-path [`Progress`]. A failing loader never
//! blocks its siblings.
//!
//! Loader errors are state, never panics or `Err` returns: they surface as
//! `is_error`/`error` for the host to render.

mod deep;
mod native;
mod query;
mod state;

pub use deep::{DeepSearch, DeepSearchState, Phase, Progress};
pub use native::NativeAdapter;
pub use query::{CacheEntry, MemoryQueryCache, QueryAdapter, QueryCache, QueryHandle, QueryKey};
pub use state::{LoaderAdapter, LoaderState, Notify};
