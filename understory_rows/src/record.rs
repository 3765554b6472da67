// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row records and the host handles a store calls into.

use alloc::rc::Rc;
use core::fmt;

/// What a registered row does when chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A selectable item.
    Item,
    /// A trigger that opens a submenu surface.
    Submenu,
}

/// Open/close handle for the submenu behind a trigger row.
///
/// Implementations must not call back into the [`SurfaceStore`](crate::SurfaceStore)
/// that invokes them; the store is mid-update when it does.
pub trait SubmenuControl {
    /// Open the submenu.
    fn open_sub(&self);
    /// Close the submenu.
    fn close_sub(&self);
    /// Whether the submenu is currently open.
    fn is_open(&self) -> bool;
}

/// Alignment used when scrolling a row into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the start of the row with the start of the viewport.
    Start,
    /// Center the row within the viewport.
    Center,
    /// Align the end of the row with the end of the viewport.
    End,
    /// Move just enough to make the row fully visible.
    Nearest,
}

/// The scrollable list element of a surface.
pub trait ListElement {
    /// Scroll the mounted row with `id` into view.
    fn scroll_row_into_view(&self, id: &str);
}

/// Index-based scrolling for virtualized lists.
pub trait Virtualizer {
    /// Scroll so that row `index` is brought into view with `align`.
    fn scroll_to_index(&self, index: usize, align: ScrollAlign);
}

/// Registry entry for one row.
#[derive(Clone)]
pub struct RowRecord {
    /// Item or submenu trigger.
    pub kind: RowKind,
    /// Disabled rows are never focusable or selectable.
    pub disabled: bool,
    /// Position in the virtualized list, if the list is virtualized.
    pub index: Option<usize>,
    /// Whether the row currently has a mounted element.
    pub mounted: bool,
    /// Open/close handle; present only for submenu triggers.
    pub submenu: Option<Rc<dyn SubmenuControl>>,
}

impl RowRecord {
    /// A mounted, enabled row of the given kind.
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            disabled: false,
            index: None,
            mounted: true,
            submenu: None,
        }
    }

    /// A submenu trigger row wired to `control`.
    pub fn submenu(control: Rc<dyn SubmenuControl>) -> Self {
        Self {
            submenu: Some(control),
            ..Self::new(RowKind::Submenu)
        }
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the virtualized index.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set whether the row has a mounted element.
    #[must_use]
    pub fn mounted(mut self, mounted: bool) -> Self {
        self.mounted = mounted;
        self
    }
}

impl fmt::Debug for RowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowRecord")
            .field("kind", &self.kind)
            .field("disabled", &self.disabled)
            .field("index", &self.index)
            .field("mounted", &self.mounted)
            .field("submenu", &self.submenu.as_ref().map(|s| s.is_open()))
            .finish()
    }
}
