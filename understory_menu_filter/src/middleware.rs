// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline extension points and the built-in "create new" middleware.

use std::fmt;

use understory_menu_tree::{MenuKey, MenuTree, NodeKey};

use crate::{CREATE_ROW_ID, Row, RowKind};

/// Whether the pipeline is browsing or searching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Empty query: the surface's tree, flattened.
    Browse,
    /// Non-empty query: scored results across the subtree.
    Search,
}

/// What every hook sees about the current run.
#[derive(Copy, Clone, Debug)]
pub struct FilterContext<'a> {
    /// The live tree.
    pub tree: &'a MenuTree,
    /// The surface being flattened.
    pub menu: MenuKey,
    /// The trimmed query.
    pub query: &'a str,
    /// Current mode.
    pub mode: Mode,
}

/// A scored search result before it becomes a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    /// The matching node.
    pub node: NodeKey,
    /// Match score; higher is better.
    pub score: i32,
    /// Position of the node in document order among all candidates.
    pub order: usize,
}

/// A pipeline extension.
///
/// Every hook receives the previous middleware's output and returns its own;
/// the defaults pass values through unchanged. Hooks are infallible and a
/// panic inside one propagates to the caller.
pub trait Middleware {
    /// Adjust the surface's top-level nodes before browsing or searching.
    fn before_filter(&self, _cx: &FilterContext<'_>, nodes: Vec<NodeKey>) -> Vec<NodeKey> {
        nodes
    }

    /// Adjust scored results (search mode only).
    fn after_filter(&self, _cx: &FilterContext<'_>, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        hits
    }

    /// Adjust the final row list (both modes).
    fn transform_nodes(&self, _cx: &FilterContext<'_>, rows: Vec<Row>) -> Vec<Row> {
        rows
    }
}

/// When [`CreateNew`] offers its row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShowWhen {
    /// Whenever a query is typed.
    Always,
    /// Only when nothing matched.
    NoResults,
    /// Whenever the query is non-empty.
    HasQuery,
    /// Unless some row's label equals the query (case-insensitively).
    #[default]
    NoExactMatch,
}

/// Where [`CreateNew`] places its row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CreatePosition {
    /// Before all results.
    Start,
    /// After all results.
    #[default]
    End,
}

/// Adds a synthetic row that creates an entry from the query.
///
/// Only active in search mode with a non-empty query.
pub struct CreateNew {
    show_when: ShowWhen,
    position: CreatePosition,
    label: Box<dyn Fn(&str) -> String>,
}

impl fmt::Debug for CreateNew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateNew")
            .field("show_when", &self.show_when)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl Default for CreateNew {
    fn default() -> Self {
        Self {
            show_when: ShowWhen::default(),
            position: CreatePosition::default(),
            label: Box::new(|q| format!("Create \u{201c}{q}\u{201d}")),
        }
    }
}

impl CreateNew {
    /// A middleware with the default policy ([`ShowWhen::NoExactMatch`], at the end).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the visibility policy.
    #[must_use]
    pub fn show_when(mut self, show_when: ShowWhen) -> Self {
        self.show_when = show_when;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn position(mut self, position: CreatePosition) -> Self {
        self.position = position;
        self
    }

    /// Set how the row's label is derived from the query.
    #[must_use]
    pub fn label(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.label = Box::new(f);
        self
    }

    fn applies(&self, query: &str, rows: &[Row]) -> bool {
        match self.show_when {
            ShowWhen::Always | ShowWhen::HasQuery => true,
            ShowWhen::NoResults => !rows.iter().any(Row::is_match),
            ShowWhen::NoExactMatch => {
                let q = query.to_lowercase();
                !rows
                    .iter()
                    .any(|r| r.is_match() && r.label.trim().to_lowercase() == q)
            }
        }
    }
}

impl Middleware for CreateNew {
    fn transform_nodes(&self, cx: &FilterContext<'_>, mut rows: Vec<Row>) -> Vec<Row> {
        if cx.mode != Mode::Search || cx.query.is_empty() || !self.applies(cx.query, &rows) {
            return rows;
        }
        let row = Row::new(
            CREATE_ROW_ID,
            RowKind::Create {
                query: cx.query.to_owned(),
            },
            (self.label)(cx.query),
        );
        match self.position {
            CreatePosition::Start => rows.insert(0, row),
            CreatePosition::End => rows.push(row),
        }
        rows
    }
}
