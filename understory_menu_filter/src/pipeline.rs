// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use understory_menu_tree::{MenuKey, MenuTree, Node, NodeKey, NodeKind, PATH_SEPARATOR};

use crate::{FilterContext, Middleware, Mode, Row, RowKind, SearchHit, score_node};

/// An ordered list of middleware plus the browse/search stages they wrap.
#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Rc<dyn Middleware>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl Pipeline {
    /// A pipeline without middleware.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; hooks run in registration order.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.push(middleware);
        self
    }

    /// Append a middleware.
    pub fn push(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Rc::new(middleware));
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns `true` if no middleware is registered.
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Flatten `menu` for `query` into render-ready rows.
    ///
    /// An empty (or whitespace-only) query browses the surface; anything else
    /// searches it and every searchable submenu below it.
    pub fn run(&self, tree: &MenuTree, menu: MenuKey, query: &str) -> Vec<Row> {
        let query = query.trim();
        let mode = if query.is_empty() {
            Mode::Browse
        } else {
            Mode::Search
        };
        let cx = FilterContext {
            tree,
            menu,
            query,
            mode,
        };

        let nodes = self
            .middleware
            .iter()
            .fold(tree.menu(menu).nodes.clone(), |acc, m| m.before_filter(&cx, acc));

        let rows = match mode {
            Mode::Browse => {
                let mut rows = Vec::new();
                flatten(tree, &nodes, &mut rows);
                rows
            }
            Mode::Search => {
                let hits = search(tree, &nodes, query);
                let hits = self
                    .middleware
                    .iter()
                    .fold(hits, |acc, m| m.after_filter(&cx, acc));
                hit_rows(tree, menu, &hits)
            }
        };

        let rows = self
            .middleware
            .iter()
            .fold(rows, |acc, m| m.transform_nodes(&cx, acc));
        tracing::trace!(
            message = "filter.run",
            surface = tree.menu(menu).surface_id.as_str(),
            search = mode == Mode::Search,
            rows = rows.len()
        );
        rows
    }
}

fn node_row(node: &Node, key: NodeKey, kind: RowKind) -> Row {
    Row {
        node: Some(key),
        disabled: node.disabled,
        ..Row::new(node.id.clone(), kind, node.display_label())
    }
}

/// Browse mode: depth-first, groups as heading plus members, submenus as one row.
fn flatten(tree: &MenuTree, keys: &[NodeKey], out: &mut Vec<Row>) {
    for &k in keys {
        let node = tree.node(k);
        if node.hidden {
            continue;
        }
        match &node.kind {
            NodeKind::Item(_) => out.push(node_row(node, k, RowKind::Item)),
            NodeKind::Submenu(_) => out.push(node_row(node, k, RowKind::Submenu)),
            NodeKind::Group(g) => {
                if !emits_rows(tree, k) || g.children.iter().all(|&c| tree.node(c).hidden) {
                    continue;
                }
                if !out.is_empty() {
                    let id = format!("{}{PATH_SEPARATOR}separator", node.id);
                    out.push(Row::new(id, RowKind::Separator, ""));
                }
                if node.label.is_some() {
                    out.push(node_row(node, k, RowKind::GroupHeading));
                }
                if !g.collapsed {
                    flatten(tree, &g.children, out);
                }
            }
        }
    }
}

/// Whether browsing `key` produces at least one non-separator row.
fn emits_rows(tree: &MenuTree, key: NodeKey) -> bool {
    let node = tree.node(key);
    if node.hidden {
        return false;
    }
    match &node.kind {
        NodeKind::Item(_) | NodeKind::Submenu(_) => true,
        NodeKind::Group(g) => {
            node.label.is_some()
                || (!g.collapsed && g.children.iter().any(|&c| emits_rows(tree, c)))
        }
    }
}

/// Search mode: score every visible item below `keys`, plus the surface's own
/// submenu triggers, best first with ties in document order.
fn search(tree: &MenuTree, keys: &[NodeKey], query: &str) -> Vec<SearchHit> {
    let mut candidates = Vec::new();
    collect(tree, keys, true, &mut candidates);
    let mut hits: Vec<SearchHit> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(order, key)| {
            let node = tree.node(key);
            let keywords = node.keywords.iter().map(String::as_str);
            score_node(query, node.display_label(), keywords).map(|score| SearchHit {
                node: key,
                score,
                order,
            })
        })
        .collect();
    hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.order.cmp(&b.order)));
    hits
}

fn collect(tree: &MenuTree, keys: &[NodeKey], own_surface: bool, out: &mut Vec<NodeKey>) {
    for &k in keys {
        let node = tree.node(k);
        if node.hidden {
            continue;
        }
        match &node.kind {
            NodeKind::Item(_) => out.push(k),
            NodeKind::Group(g) => collect(tree, &g.children, own_surface, out),
            NodeKind::Submenu(s) => {
                if own_surface {
                    out.push(k);
                }
                if s.searchable {
                    collect(tree, &tree.menu(s.child).nodes, false, out);
                }
            }
        }
    }
}

/// Turn hits into rows. Nodes from nested surfaces keep their bare id unless
/// it is already taken, in which case the submenu path is prefixed.
fn hit_rows(tree: &MenuTree, menu: MenuKey, hits: &[SearchHit]) -> Vec<Row> {
    let mut ids = vec![String::new(); hits.len()];
    let mut by_claim: Vec<usize> = (0..hits.len()).collect();
    by_claim.sort_by_key(|&i| (tree.node(hits[i].node).menu != menu, hits[i].order));
    let mut used = HashSet::new();
    for i in by_claim {
        let node = tree.node(hits[i].node);
        let id = if used.contains(&node.id) {
            let mut path = tree.submenu_path(menu, hits[i].node).join(PATH_SEPARATOR);
            path.push_str(PATH_SEPARATOR);
            path.push_str(&node.id);
            path
        } else {
            node.id.clone()
        };
        used.insert(id.clone());
        ids[i] = id;
    }

    hits.iter()
        .zip(ids)
        .map(|(hit, id)| {
            let node = tree.node(hit.node);
            let kind = if node.is_submenu() {
                RowKind::Submenu
            } else {
                RowKind::Item
            };
            Row {
                id,
                node: Some(hit.node),
                breadcrumb: tree.breadcrumb(menu, hit.node),
                score: Some(hit.score),
                disabled: inherited_disabled(tree, menu, hit.node),
                ..Row::new("", kind, node.display_label())
            }
        })
        .collect()
}

/// A node is disabled if it or any submenu trigger between it and `menu` is.
fn inherited_disabled(tree: &MenuTree, menu: MenuKey, key: NodeKey) -> bool {
    let mut node = tree.node(key);
    loop {
        if node.disabled {
            return true;
        }
        if node.menu == menu {
            return false;
        }
        match tree.menu(node.menu).parent {
            Some(trigger) => node = tree.node(trigger),
            None => return false,
        }
    }
}
