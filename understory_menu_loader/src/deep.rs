// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel eager loading of deep-search submenus.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use understory_menu_tree::{
    LoadError, Loader, LoaderContext, MenuDef, NodeDef, child_surface_id,
};

use crate::LoaderAdapter;

/// Where one deep-search loader stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Still in flight.
    Loading,
    /// Resolved; its nodes were injected.
    Ready,
    /// Failed; siblings are unaffected.
    Failed(LoadError),
}

/// Progress of one deep-search loader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Submenu ids from the root to the loading submenu.
    pub path: Vec<String>,
    /// Submenu labels from the root to the loading submenu.
    pub breadcrumb: Vec<String>,
    /// Current phase.
    pub phase: Phase,
}

/// Aggregate state of all deep-search loaders for the current query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeepSearchState {
    /// Some loader has not produced data yet.
    pub is_loading: bool,
    /// Some loader is fetching.
    pub is_fetching: bool,
    /// Some loader failed.
    pub is_error: bool,
    /// One entry per deep-search loader, in document order.
    pub progress: Vec<Progress>,
}

/// Loads every `deep_search` submenu for a query and injects the results.
///
/// All loads for a query are requested in the same pass, so they run in
/// parallel. Results are spliced into a copy of the definition as they
/// arrive; loaders are kept so the submenu can still load independently.
/// Contexts that are no longer wanted (the query changed or was cleared) are
/// released on the next pass.
pub struct DeepSearch {
    adapter: Rc<dyn LoaderAdapter>,
    held: HashSet<LoaderContext>,
}

impl fmt::Debug for DeepSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSearch")
            .field("held", &self.held.len())
            .finish_non_exhaustive()
    }
}

struct Pass<'a> {
    adapter: &'a dyn LoaderAdapter,
    query: &'a str,
    wanted: HashSet<LoaderContext>,
    state: DeepSearchState,
    path: Vec<String>,
    breadcrumb: Vec<String>,
}

impl DeepSearch {
    /// Deep search over `adapter`.
    pub fn new(adapter: Rc<dyn LoaderAdapter>) -> Self {
        Self {
            adapter,
            held: HashSet::new(),
        }
    }

    /// Number of loader contexts currently held.
    pub fn held(&self) -> usize {
        self.held.len()
    }

    /// Resolve deep-search submenus of `def` for `query`.
    ///
    /// Returns the definition with resolved nodes injected and the aggregate
    /// state. An empty query releases everything and returns `def` unchanged.
    pub fn resolve(
        &mut self,
        def: &MenuDef,
        root_surface: &str,
        query: &str,
    ) -> (MenuDef, DeepSearchState) {
        let query = query.trim();
        let mut out = def.clone();
        if query.is_empty() {
            self.release_all();
            return (out, DeepSearchState::default());
        }
        let mut pass = Pass {
            adapter: &*self.adapter,
            query,
            wanted: HashSet::new(),
            state: DeepSearchState::default(),
            path: Vec::new(),
            breadcrumb: Vec::new(),
        };
        pass.walk(&mut out.nodes, root_surface);
        let Pass { wanted, state, .. } = pass;

        for stale in self.held.difference(&wanted) {
            self.adapter.release(stale);
        }
        self.held = wanted;
        tracing::trace!(
            message = "deep_search",
            query,
            loaders = state.progress.len(),
            loading = state.is_loading,
            error = state.is_error
        );
        (out, state)
    }

    /// Release every held loader context.
    pub fn release_all(&mut self) {
        for cx in self.held.drain() {
            self.adapter.release(&cx);
        }
    }
}

impl Pass<'_> {
    fn walk(&mut self, nodes: &mut [NodeDef], surface_id: &str) {
        for node in nodes {
            match node {
                NodeDef::Item(_) => {}
                NodeDef::Group(g) => self.walk(&mut g.nodes, surface_id),
                NodeDef::Submenu(s) => {
                    let child = child_surface_id(surface_id, &s.id);
                    self.path.push(s.id.clone());
                    self.breadcrumb
                        .push(s.label.clone().unwrap_or_else(|| s.id.clone()));
                    if s.deep_search && s.resolved_query.as_deref() != Some(self.query) {
                        match s.loader.clone() {
                            Some(Loader::Static(nodes)) => {
                                if s.nodes.is_empty() {
                                    s.nodes = nodes;
                                }
                            }
                            Some(loader) => {
                                let cx = LoaderContext {
                                    query: self.query.to_owned(),
                                    surface_id: child.clone(),
                                };
                                let st = self.adapter.load(&cx, &loader);
                                self.wanted.insert(cx);
                                self.state.is_loading |= st.is_loading;
                                self.state.is_fetching |= st.is_fetching;
                                self.state.is_error |= st.is_error;
                                let phase = match (&st.data, st.error) {
                                    (Some(_), _) => Phase::Ready,
                                    (None, Some(e)) => Phase::Failed(e),
                                    (None, None) => Phase::Loading,
                                };
                                self.state.progress.push(Progress {
                                    path: self.path.clone(),
                                    breadcrumb: self.breadcrumb.clone(),
                                    phase,
                                });
                                if let Some(data) = st.data {
                                    s.resolve(data, self.query);
                                }
                            }
                            None => {}
                        }
                    }
                    self.walk(&mut s.nodes, &child);
                    self.path.pop();
                    self.breadcrumb.pop();
                }
            }
        }
    }
}
