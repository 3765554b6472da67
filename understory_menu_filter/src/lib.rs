// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Menu Filter: from a live menu tree to render-ready rows.
//!
//! A [`Pipeline`] turns one surface of a [`MenuTree`](understory_menu_tree::MenuTree)
//! and a query into a flat list of [`Row`]s:
//!
//! - **Browse** (empty query): the surface is flattened depth-first. Groups
//!   emit a heading and then their members (unless collapsed), a separator is
//!   placed before any group that follows other rows, hidden nodes are
//!   skipped, and submenus appear as a single trigger row.
//! - **Search** (non-empty query): every visible item on the surface and in
//!   its searchable submenus, plus the surface's own submenu triggers, is
//!   scored with [`score_node`]. Results carry a breadcrumb and are ordered by
//!   descending score, ties in document order.
//!
//! [`Middleware`] hooks wrap the stages: `before_filter` on the top-level
//! nodes, `after_filter` on search hits, and `transform_nodes` on the final
//! rows. Each hook receives the previous middleware's output. [`CreateNew`]
//! is a built-in middleware offering a "create from query" row.
//!
//! ```rust
//! use understory_menu_filter::{CreateNew, Pipeline, RowKind, ShowWhen};
//! use understory_menu_tree::{MenuDef, NodeDef, instantiate};
//!
//! let def = MenuDef::new("fruit")
//!     .node(NodeDef::item("apple", "Apple"))
//!     .node(NodeDef::item("banana", "Banana"));
//! let tree = instantiate(&def, "root", 0).unwrap();
//! let pipeline = Pipeline::new().with(CreateNew::new().show_when(ShowWhen::NoResults));
//!
//! let rows = pipeline.run(&tree, tree.root(), "appl");
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].id, "apple");
//!
//! let rows = pipeline.run(&tree, tree.root(), "cherry");
//! assert!(matches!(rows[0].kind, RowKind::Create { .. }));
//! ```

mod fuzzy;
mod middleware;
mod pipeline;
mod row;

pub use fuzzy::{FuzzyMatch, fuzzy_match, score_node};
pub use middleware::{
    CreateNew, CreatePosition, FilterContext, Middleware, Mode, SearchHit, ShowWhen,
};
pub use pipeline::Pipeline;
pub use row::{CREATE_ROW_ID, Row, RowKind};
