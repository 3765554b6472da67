// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;
use understory_menu_tree::NodeKey;

/// Row id of the synthetic "create" row.
pub const CREATE_ROW_ID: &str = "::create";

/// What a flattened row renders as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    /// A selectable item.
    Item,
    /// A submenu trigger.
    Submenu,
    /// A group heading (not navigable).
    GroupHeading,
    /// A separator between groups (not navigable).
    Separator,
    /// A synthetic row creating a new entry from the query.
    Create {
        /// The query the entry would be created from.
        query: String,
    },
}

/// One render-ready row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Unique within the flattened list.
    pub id: String,
    /// Rendering kind.
    pub kind: RowKind,
    /// The live node behind the row; `None` for separators and synthetic rows.
    pub node: Option<NodeKey>,
    /// Display text.
    pub label: String,
    /// Enclosing group and submenu labels, outermost first (search mode).
    pub breadcrumb: SmallVec<[String; 4]>,
    /// Search score (search mode).
    pub score: Option<i32>,
    /// Disabled rows are rendered but never navigable.
    pub disabled: bool,
}

impl Row {
    /// A row without node, breadcrumb, or score.
    pub fn new(id: impl Into<String>, kind: RowKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            node: None,
            label: label.into(),
            breadcrumb: SmallVec::new(),
            score: None,
            disabled: false,
        }
    }

    /// Returns `true` for rows keyboard navigation can land on.
    pub fn is_navigable(&self) -> bool {
        !self.disabled
            && matches!(
                self.kind,
                RowKind::Item | RowKind::Submenu | RowKind::Create { .. }
            )
    }

    /// Returns `true` for item and submenu rows backed by a node.
    pub fn is_match(&self) -> bool {
        matches!(self.kind, RowKind::Item | RowKind::Submenu)
    }
}
