// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The default adapter: run loader futures, no caching, abort on release.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use futures::task::{LocalSpawn, LocalSpawnExt};
use understory_menu_tree::{LoadError, LoadResult, Loader, LoaderContext};

use crate::{LoaderAdapter, LoaderState, Notify};

struct Slot {
    state: LoaderState,
    generation: u64,
    abort: Option<AbortHandle>,
}

#[derive(Default)]
struct Shared {
    slots: RefCell<HashMap<LoaderContext, Slot>>,
    notify: RefCell<Option<Notify>>,
}

impl Shared {
    fn settle(&self, cx: &LoaderContext, generation: u64, result: LoadResult) {
        {
            let mut slots = self.slots.borrow_mut();
            let Some(slot) = slots.get_mut(cx).filter(|s| s.generation == generation) else {
                tracing::trace!(
                    message = "loader.discard",
                    surface = cx.surface_id.as_str(),
                    query = cx.query.as_str()
                );
                return;
            };
            tracing::debug!(
                message = "loader.settle",
                surface = cx.surface_id.as_str(),
                query = cx.query.as_str(),
                ok = result.is_ok()
            );
            slot.state = LoaderState::settled(result);
            slot.abort = None;
        }
        let notify = self.notify.borrow().clone();
        if let Some(notify) = notify {
            notify();
        }
    }
}

/// Runs [`Loader::Future`] factories on a local executor.
///
/// Each [`LoaderContext`] gets at most one in-flight future. Results are kept
/// only while the context is held; [`LoaderAdapter::release`] aborts pending
/// work and forgets the result, so a later `load` starts over.
pub struct NativeAdapter {
    spawner: Rc<dyn LocalSpawn>,
    shared: Rc<Shared>,
    next_generation: Cell<u64>,
}

impl fmt::Debug for NativeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAdapter")
            .field("slots", &self.shared.slots.borrow().len())
            .finish_non_exhaustive()
    }
}

impl NativeAdapter {
    /// Create an adapter spawning on `spawner` (for example a `LocalPool` spawner).
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self {
            spawner: Rc::new(spawner),
            shared: Rc::default(),
            next_generation: Cell::new(0),
        }
    }

    /// Number of contexts currently held.
    pub fn len(&self) -> usize {
        self.shared.slots.borrow().len()
    }

    /// Returns `true` if no context is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn start(&self, cx: &LoaderContext, loader: &Loader) -> LoaderState {
        let Loader::Future(factory) = loader else {
            return LoaderState::failed(LoadError::new(
                "loader handle is not supported by the native adapter",
            ));
        };
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);

        let (abort, registration) = AbortHandle::new_pair();
        let shared: Weak<Shared> = Rc::downgrade(&self.shared);
        let key = cx.clone();
        let task = Abortable::new(factory(cx), registration).map(move |res| {
            if let (Ok(result), Some(shared)) = (res, shared.upgrade()) {
                shared.settle(&key, generation, result);
            }
        });
        if let Err(e) = self.spawner.spawn_local(task) {
            tracing::warn!(message = "loader.spawn_failed", error = %e);
            return LoaderState::failed(LoadError::new("executor is shut down"));
        }
        tracing::debug!(
            message = "loader.start",
            surface = cx.surface_id.as_str(),
            query = cx.query.as_str()
        );
        let state = LoaderState::loading();
        self.shared.slots.borrow_mut().insert(
            cx.clone(),
            Slot {
                state: state.clone(),
                generation,
                abort: Some(abort),
            },
        );
        state
    }
}

impl LoaderAdapter for NativeAdapter {
    fn load(&self, cx: &LoaderContext, loader: &Loader) -> LoaderState {
        if let Loader::Static(nodes) = loader {
            return LoaderState::ready(nodes.clone());
        }
        if let Some(slot) = self.shared.slots.borrow().get(cx) {
            return slot.state.clone();
        }
        self.start(cx, loader)
    }

    fn release(&self, cx: &LoaderContext) {
        let removed = self.shared.slots.borrow_mut().remove(cx);
        if let Some(abort) = removed.and_then(|s| s.abort) {
            tracing::trace!(
                message = "loader.abort",
                surface = cx.surface_id.as_str(),
                query = cx.query.as_str()
            );
            abort.abort();
        }
    }

    fn set_notify(&self, notify: Notify) {
        *self.shared.notify.borrow_mut() = Some(notify);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use understory_menu_tree::NodeDef;

    fn cx(query: &str) -> LoaderContext {
        LoaderContext {
            query: query.into(),
            surface_id: "root::files".into(),
        }
    }

    /// A loader whose future resolves when the returned sender fires.
    fn gated() -> (Loader, Rc<Cell<u32>>, oneshot::Sender<LoadResult>) {
        let (tx, rx) = oneshot::channel::<LoadResult>();
        let rx = RefCell::new(Some(rx));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let loader = Loader::from_fn(move |_| {
            counter.set(counter.get() + 1);
            let rx = rx.borrow_mut().take();
            async move {
                match rx {
                    Some(rx) => rx.await.unwrap_or_else(|_| Err(LoadError::new("sender dropped"))),
                    None => Err(LoadError::new("invoked twice")),
                }
            }
        });
        (loader, calls, tx)
    }

    #[test]
    fn static_loaders_are_ready_immediately() {
        let pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let state = adapter.load(&cx(""), &Loader::Static(vec![NodeDef::item("a", "A")]));
        assert!(state.is_settled());
        assert_eq!(state.data.map(|d| d.len()), Some(1));
        assert!(adapter.is_empty(), "static loads hold no slot");
    }

    #[test]
    fn future_settles_and_notifies_once() {
        let mut pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        adapter.set_notify(Rc::new(move || n.set(n.get() + 1)));

        let (loader, calls, tx) = gated();
        assert!(adapter.load(&cx("q"), &loader).is_loading);
        assert!(adapter.load(&cx("q"), &loader).is_loading);
        assert_eq!(calls.get(), 1, "one future per context");

        pool.run_until_stalled();
        assert_eq!(notified.get(), 0);

        tx.send(Ok(vec![NodeDef::item("a", "A")])).unwrap();
        pool.run_until_stalled();
        assert_eq!(notified.get(), 1);
        let state = adapter.load(&cx("q"), &loader);
        assert!(state.is_settled() && !state.is_error);
        assert_eq!(state.data.map(|d| d.len()), Some(1));
    }

    #[test]
    fn errors_are_state() {
        let mut pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let (loader, _, tx) = gated();
        adapter.load(&cx("q"), &loader);
        tx.send(Err(LoadError::new("offline"))).unwrap();
        pool.run_until_stalled();
        let state = adapter.load(&cx("q"), &loader);
        assert!(state.is_error);
        assert_eq!(state.error, Some(LoadError::new("offline")));
        assert!(state.data.is_none());
    }

    #[test]
    fn release_aborts_and_discards() {
        let mut pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        adapter.set_notify(Rc::new(move || n.set(n.get() + 1)));

        let (loader, _, tx) = gated();
        adapter.load(&cx("q"), &loader);
        adapter.release(&cx("q"));
        assert!(adapter.is_empty());
        pool.run_until_stalled();
        // The receiver was dropped along with the aborted future.
        assert!(tx.send(Ok(Vec::new())).is_err(), "aborted future is gone");
        pool.run_until_stalled();
        assert_eq!(notified.get(), 0, "released loads never notify");
    }

    #[test]
    fn reload_after_release_starts_over() {
        let mut pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let (loader, calls, _tx) = gated();
        adapter.load(&cx("q"), &loader);
        adapter.release(&cx("q"));
        pool.run_until_stalled();
        let state = adapter.load(&cx("q"), &loader);
        assert_eq!(calls.get(), 2, "the factory runs again");
        assert!(state.is_loading);
        pool.run_until_stalled();
        // The gate was consumed by the first call.
        assert!(adapter.load(&cx("q"), &loader).is_error);
    }

    #[test]
    fn handles_are_rejected() {
        let pool = LocalPool::new();
        let adapter = NativeAdapter::new(pool.spawner());
        let state = adapter.load(&cx(""), &Loader::handle(7_u32));
        assert!(state.is_error);
    }
}
