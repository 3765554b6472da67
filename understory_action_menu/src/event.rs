// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Something the menu did that the host may want to observe.
///
/// Definition callbacks fire as well; these are queued for hosts that prefer
/// to poll with [`ActionMenu::drain_events`](crate::ActionMenu::drain_events).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    /// The root surface opened or closed.
    OpenChange {
        /// The new open state.
        open: bool,
    },
    /// An item was selected.
    Select {
        /// Surface the item is defined on.
        surface_id: String,
        /// Item id.
        id: String,
        /// Item value, if any.
        value: Option<String>,
    },
    /// A checkbox item toggled.
    CheckedChange {
        /// Surface the item is defined on.
        surface_id: String,
        /// Item id.
        id: String,
        /// The new checked state.
        checked: bool,
    },
    /// A radio group's value changed.
    ValueChange {
        /// Surface the group is defined on.
        surface_id: String,
        /// Group id.
        group: String,
        /// The selected item's value.
        value: String,
    },
    /// The create row was chosen.
    Create {
        /// Surface that showed the row.
        surface_id: String,
        /// The query at the time.
        query: String,
    },
}
