// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A caching adapter in the style of reactive query libraries.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::task::{LocalSpawn, LocalSpawnExt};
use understory_menu_tree::{LoadError, LoadResult, Loader, LoaderContext, LoaderFn};

use crate::{LoaderAdapter, LoaderState, Notify};

/// Cache key: a scope shared by everything that fetches the same data, plus the query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Data scope (a query handle's scope, or the surface id for plain futures).
    pub scope: String,
    /// The search query the data was fetched for.
    pub query: String,
}

/// One cached result.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The fetched result.
    pub result: LoadResult,
    /// Stale entries are served but refetched on the next load.
    pub stale: bool,
}

/// Storage behind a [`QueryAdapter`].
pub trait QueryCache {
    /// Look an entry up.
    fn get(&self, key: &QueryKey) -> Option<CacheEntry>;

    /// Store a fresh result.
    fn insert(&mut self, key: QueryKey, result: LoadResult);

    /// Mark every entry of `scope` stale.
    fn invalidate(&mut self, scope: &str);
}

/// An unbounded in-memory [`QueryCache`].
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl MemoryQueryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: QueryKey, result: LoadResult) {
        self.entries.insert(
            key,
            CacheEntry {
                result,
                stale: false,
            },
        );
    }

    fn invalidate(&mut self, scope: &str) {
        for (key, entry) in &mut self.entries {
            if key.scope == scope {
                entry.stale = true;
            }
        }
    }
}

/// A loader value understood by [`QueryAdapter`]: a scope naming the data and
/// a fetch function.
#[derive(Clone)]
pub struct QueryHandle {
    /// Cache scope.
    pub scope: String,
    /// Fetches the data for a context.
    pub fetch: LoaderFn,
}

impl fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHandle")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl QueryHandle {
    /// Wrap a fetch function as a [`Loader::Handle`].
    pub fn loader<F, Fut>(scope: impl Into<String>, fetch: F) -> Loader
    where
        F: Fn(&LoaderContext) -> Fut + 'static,
        Fut: Future<Output = LoadResult> + 'static,
    {
        Loader::handle(Self {
            scope: scope.into(),
            fetch: Rc::new(move |cx| fetch(cx).boxed_local()),
        })
    }
}

struct Shared {
    cache: RefCell<Box<dyn QueryCache>>,
    in_flight: RefCell<HashSet<QueryKey>>,
    notify: RefCell<Option<Notify>>,
}

impl Shared {
    fn settle(&self, key: QueryKey, result: LoadResult) {
        tracing::debug!(
            message = "loader.settle",
            scope = key.scope.as_str(),
            query = key.query.as_str(),
            ok = result.is_ok()
        );
        self.in_flight.borrow_mut().remove(&key);
        self.cache.borrow_mut().insert(key, result);
        let notify = self.notify.borrow().clone();
        if let Some(notify) = notify {
            notify();
        }
    }
}

/// Serves loads from a [`QueryCache`], revalidating stale entries in the background.
///
/// Accepts [`QueryHandle`] loaders (cached by their scope) and plain
/// [`Loader::Future`]s (cached by surface id). Releasing a context does not
/// cancel its fetch: the result still lands in the cache for the next reader.
pub struct QueryAdapter {
    spawner: Rc<dyn LocalSpawn>,
    shared: Rc<Shared>,
}

impl fmt::Debug for QueryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryAdapter")
            .field("in_flight", &self.shared.in_flight.borrow().len())
            .finish_non_exhaustive()
    }
}

impl QueryAdapter {
    /// An adapter backed by a fresh [`MemoryQueryCache`].
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self::with_cache(spawner, MemoryQueryCache::new())
    }

    /// An adapter backed by `cache`.
    pub fn with_cache(spawner: impl LocalSpawn + 'static, cache: impl QueryCache + 'static) -> Self {
        Self {
            spawner: Rc::new(spawner),
            shared: Rc::new(Shared {
                cache: RefCell::new(Box::new(cache)),
                in_flight: RefCell::default(),
                notify: RefCell::default(),
            }),
        }
    }

    /// Mark every cached entry of `scope` stale so the next load refetches it.
    pub fn invalidate(&self, scope: &str) {
        self.shared.cache.borrow_mut().invalidate(scope);
    }

    fn fetch(&self, key: &QueryKey, fetch: &LoaderFn, cx: &LoaderContext) -> bool {
        let shared: Weak<Shared> = Rc::downgrade(&self.shared);
        let owned = key.clone();
        let task = fetch(cx).map(move |result| {
            if let Some(shared) = shared.upgrade() {
                shared.settle(owned, result);
            }
        });
        if let Err(e) = self.spawner.spawn_local(task) {
            tracing::warn!(message = "loader.spawn_failed", error = %e);
            return false;
        }
        tracing::debug!(
            message = "loader.start",
            scope = key.scope.as_str(),
            query = key.query.as_str()
        );
        self.shared.in_flight.borrow_mut().insert(key.clone());
        true
    }
}

impl LoaderAdapter for QueryAdapter {
    fn load(&self, cx: &LoaderContext, loader: &Loader) -> LoaderState {
        let (scope, fetch) = match loader {
            Loader::Static(nodes) => return LoaderState::ready(nodes.clone()),
            Loader::Future(f) => (cx.surface_id.clone(), f.clone()),
            Loader::Handle(_) => match loader.downcast_handle::<QueryHandle>() {
                Some(h) => (h.scope.clone(), h.fetch.clone()),
                None => {
                    return LoaderState::failed(LoadError::new(
                        "loader handle is not a query handle",
                    ));
                }
            },
        };
        let key = QueryKey {
            scope,
            query: cx.query.clone(),
        };
        let entry = self.shared.cache.borrow().get(&key);
        let mut fetching = self.shared.in_flight.borrow().contains(&key);
        let wants_fetch = entry.as_ref().is_none_or(|e| e.stale);
        if wants_fetch && !fetching {
            fetching = self.fetch(&key, &fetch, cx);
            if !fetching && entry.is_none() {
                return LoaderState::failed(LoadError::new("executor is shut down"));
            }
        }
        match entry {
            None => LoaderState::loading(),
            Some(CacheEntry { result, .. }) => {
                let mut state = LoaderState::settled(result);
                state.is_fetching = fetching;
                state
            }
        }
    }

    fn release(&self, cx: &LoaderContext) {
        tracing::trace!(
            message = "loader.release",
            surface = cx.surface_id.as_str(),
            query = cx.query.as_str()
        );
    }

    fn set_notify(&self, notify: Notify) {
        *self.shared.notify.borrow_mut() = Some(notify);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use std::collections::VecDeque;

    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use understory_menu_tree::NodeDef;

    type Pending = Rc<RefCell<VecDeque<oneshot::Sender<LoadResult>>>>;

    fn cx(surface: &str, query: &str) -> LoaderContext {
        LoaderContext {
            query: query.into(),
            surface_id: surface.into(),
        }
    }

    /// A query handle whose fetches wait until the test answers them, in order.
    fn fed(scope: &str) -> (Loader, Rc<Cell<u32>>, Pending) {
        let pending: Pending = Rc::default();
        let queue = pending.clone();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let loader = QueryHandle::loader(scope, move |_| {
            counter.set(counter.get() + 1);
            let (tx, rx) = oneshot::channel();
            queue.borrow_mut().push_back(tx);
            async move { rx.await.unwrap_or_else(|_| Err(LoadError::new("dropped"))) }
        });
        (loader, calls, pending)
    }

    fn answer(pending: &Pending, result: LoadResult) {
        let tx = pending.borrow_mut().pop_front().expect("a fetch is pending");
        tx.send(result).expect("fetch is still awaiting");
    }

    fn labels(state: &LoaderState) -> Vec<String> {
        state
            .data
            .iter()
            .flatten()
            .filter_map(|n| n.label().map(str::to_owned))
            .collect()
    }

    #[test]
    fn cached_data_is_served_while_revalidating() {
        let mut pool = LocalPool::new();
        let adapter = QueryAdapter::new(pool.spawner());
        let (loader, calls, tx) = fed("files");
        let c = cx("root::files", "");

        let first = adapter.load(&c, &loader);
        assert!(first.is_loading && first.is_fetching);

        answer(&tx, Ok(vec![NodeDef::item("a", "A")]));
        pool.run_until_stalled();
        let ready = adapter.load(&c, &loader);
        assert!(!ready.is_loading && !ready.is_fetching);
        assert_eq!(labels(&ready), ["A"]);
        assert_eq!(calls.get(), 1, "fresh entries are not refetched");

        adapter.invalidate("files");
        let revalidating = adapter.load(&c, &loader);
        assert!(!revalidating.is_loading, "stale data is still data");
        assert!(revalidating.is_fetching);
        assert_eq!(labels(&revalidating), ["A"]);

        answer(&tx, Ok(vec![NodeDef::item("b", "B")]));
        pool.run_until_stalled();
        let fresh = adapter.load(&c, &loader);
        assert!(!fresh.is_fetching);
        assert_eq!(labels(&fresh), ["B"]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn scope_is_shared_across_surfaces_and_release_keeps_results() {
        let mut pool = LocalPool::new();
        let adapter = QueryAdapter::new(pool.spawner());
        let (loader, calls, tx) = fed("people");

        adapter.load(&cx("root::a", "jo"), &loader);
        adapter.release(&cx("root::a", "jo"));
        answer(&tx, Ok(vec![NodeDef::item("jo", "Jo")]));
        pool.run_until_stalled();

        let other = adapter.load(&cx("root::b", "jo"), &loader);
        assert_eq!(labels(&other), ["Jo"]);
        assert_eq!(calls.get(), 1, "second surface hits the cache");
    }

    #[test]
    fn plain_futures_are_cached_by_surface() {
        let mut pool = LocalPool::new();
        let adapter = QueryAdapter::new(pool.spawner());
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let loader = Loader::from_fn(move |_| {
            counter.set(counter.get() + 1);
            async { Ok(vec![NodeDef::item("x", "X")]) }
        });
        adapter.load(&cx("root::s", ""), &loader);
        pool.run_until_stalled();
        assert_eq!(labels(&adapter.load(&cx("root::s", ""), &loader)), ["X"]);
        adapter.load(&cx("root::t", ""), &loader);
        assert_eq!(calls.get(), 2, "different surfaces are different scopes");
    }

    #[test]
    fn foreign_handles_fail() {
        let pool = LocalPool::new();
        let adapter = QueryAdapter::new(pool.spawner());
        assert!(adapter.load(&cx("root", ""), &Loader::handle("nope")).is_error);
    }
}
