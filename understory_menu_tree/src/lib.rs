// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Menu Tree: declarative menu definitions and their live form.
//!
//! Menus are described by a serializable [`MenuDef`]: a tree of
//! [`NodeDef`]s of kind `item`, `group`, or `submenu`. Function-valued fields
//! (selection handlers, change callbacks, loaders) are skipped by `serde`, so a
//! definition round-trips through JSON minus its behavior.
//!
//! [`instantiate`] turns a definition into a [`MenuTree`]: an arena of
//! [`Menu`]s (one per surface) and [`Node`]s with resolved defaults and
//! non-owning back-references (`Node::menu`, `Node::group`, `Menu::parent`)
//! expressed as keys into the arena. The owning direction is strictly
//! parent → children.
//!
//! Identity is derived from the definition path, never generated: the root
//! surface id is caller-supplied, and each submenu's surface id is
//! `parent_surface_id + "::" + submenu_id`. Instantiating the same definition
//! twice yields identical ids, so hosts can re-instantiate after every
//! definition change and keep per-surface state keyed by surface id.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_menu_tree::{MenuDef, NodeDef, NodeKind, instantiate};
//!
//! let def = MenuDef::new("actions")
//!     .node(NodeDef::item("copy", "Copy"))
//!     .node(NodeDef::submenu(
//!         "share",
//!         "Share",
//!         [NodeDef::item("email", "Email"), NodeDef::item("link", "Copy link")],
//!     ));
//!
//! let tree = instantiate(&def, "root", 0).unwrap();
//! let share = tree.node_by_id(tree.root(), "share").unwrap();
//! let NodeKind::Submenu(sub) = &tree.node(share).kind else { unreachable!() };
//! assert_eq!(tree.menu(sub.child).surface_id, "root::share");
//! assert_eq!(tree.menu(sub.child).depth, 1);
//! ```
//!
//! ## Validation
//!
//! Configuration mistakes are programmer errors and are reported eagerly as
//! [`DefinitionError`]: empty ids, ids containing the `::` path separator,
//! ids repeated on one surface (including inside groups), and radio items
//! outside a radio group.

mod callback;
mod def;
mod error;
mod loader;
mod tree;
mod ui;

pub use callback::Callback;
pub use def::{
    GroupDef, GroupVariant, ItemDef, ItemVariant, MenuDef, MenuDefaults, NodeDef, SelectEvent,
    SubmenuDef,
};
pub use error::DefinitionError;
pub use loader::{LoadError, LoadResult, Loader, LoaderContext, LoaderFn};
pub use tree::{Group, Item, Menu, MenuKey, MenuTree, Node, NodeKey, NodeKind, Submenu, instantiate};
pub use ui::{InputVisibility, SlotKind, UiOverrides};

/// Separator between surface path segments.
pub const PATH_SEPARATOR: &str = "::";

/// Surface id of the submenu `child_id` opened from `parent_surface_id`.
pub fn child_surface_id(parent_surface_id: &str, child_id: &str) -> String {
    let mut out = String::with_capacity(parent_surface_id.len() + PATH_SEPARATOR.len() + child_id.len());
    out.push_str(parent_surface_id);
    out.push_str(PATH_SEPARATOR);
    out.push_str(child_id);
    out
}
