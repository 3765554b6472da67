// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation-level overrides carried by menu definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A caller-rendered slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    /// A selectable item row.
    Item,
    /// A row that opens a submenu.
    SubmenuTrigger,
    /// The search input.
    Input,
    /// The scrollable list of rows.
    List,
    /// Shown when a surface has no rows.
    Empty,
    /// Shown while a surface's loader is pending.
    Loading,
    /// Shown when a surface's loader failed.
    Error,
    /// A group heading row.
    GroupHeading,
    /// A separator row between groups.
    Separator,
    /// Content above the list.
    Header,
    /// Content below the list.
    Footer,
    /// The surface container (popover or drawer content).
    Content,
}

/// When a surface shows its search input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputVisibility {
    /// The input is always shown.
    #[default]
    Always,
    /// The surface has no input; typing does not filter it.
    Never,
    /// The input stays hidden until the first printable key is typed.
    UntilTyping,
}

/// Per-menu presentation overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiOverrides {
    /// Extra class names per slot, composed after the factory's defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub class_names: BTreeMap<SlotKind, String>,
}

impl UiOverrides {
    /// Add a class name for `slot`.
    #[must_use]
    pub fn class(mut self, slot: SlotKind, class: impl Into<String>) -> Self {
        self.class_names.insert(slot, class.into());
        self
    }

    /// Class name for `slot`, if any.
    pub fn class_for(&self, slot: SlotKind) -> Option<&str> {
        self.class_names.get(&slot).map(String::as_str)
    }
}
