// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observable per-surface store.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::{ListElement, RowKind, RowRecord, ScrollAlign, Virtualizer};

/// Why the active row is changing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActiveCause {
    /// Keyboard navigation; the new row is scrolled into view.
    Keyboard,
    /// Pointer hover or press.
    Pointer,
    /// Any other programmatic change (row set changed, surface opened).
    Programmatic,
}

/// Observable state of one surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceState {
    /// The active (focused) row, if any.
    pub active_id: Option<String>,
    /// Whether the surface currently shows its search input.
    pub has_input: bool,
    /// Element id of the surface's list, for `aria-controls`/`aria-activedescendant` wiring.
    pub list_id: String,
}

/// Handle returned by [`SurfaceStore::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&SurfaceState)>;

/// Row registry plus active-row state for one surface.
pub struct SurfaceStore {
    state: SurfaceState,
    rows: HashMap<String, RowRecord>,
    order: Vec<String>,
    list: Option<Rc<dyn ListElement>>,
    virtualizer: Option<Rc<dyn Virtualizer>>,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for SurfaceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceStore")
            .field("state", &self.state)
            .field("rows", &self.rows.len())
            .field("order", &self.order)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SurfaceStore {
    /// Create an empty store whose list element has id `list_id`.
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            state: SurfaceState {
                active_id: None,
                has_input: true,
                list_id: list_id.into(),
            },
            rows: HashMap::new(),
            order: Vec::new(),
            list: None,
            virtualizer: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    /// The active row id, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.state.active_id.as_deref()
    }

    /// Observe every state change.
    pub fn subscribe(&mut self, listener: impl FnMut(&SurfaceState) + 'static) -> Subscription {
        let id = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Observe a derived value, called only when the selected value changes.
    pub fn subscribe_select<T, S, L>(&mut self, selector: S, mut listener: L) -> Subscription
    where
        T: PartialEq + 'static,
        S: Fn(&SurfaceState) -> T + 'static,
        L: FnMut(&T) + 'static,
    {
        let mut last = selector(&self.state);
        self.subscribe(move |state| {
            let next = selector(state);
            if next != last {
                listener(&next);
                last = next;
            }
        })
    }

    /// Stop observing. Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    /// Attach or detach the list element used for scrolling mounted rows.
    pub fn set_list(&mut self, list: Option<Rc<dyn ListElement>>) {
        self.list = list;
    }

    /// Attach or detach the virtualizer used for scrolling unmounted rows.
    pub fn set_virtualizer(&mut self, virtualizer: Option<Rc<dyn Virtualizer>>) {
        self.virtualizer = virtualizer;
    }

    /// Register (or replace) a row.
    pub fn register_row(&mut self, id: impl Into<String>, record: RowRecord) {
        self.rows.insert(id.into(), record);
    }

    /// Remove a row, returning its record.
    pub fn unregister_row(&mut self, id: &str) -> Option<RowRecord> {
        self.rows.remove(id)
    }

    /// Look up a row.
    pub fn row(&self, id: &str) -> Option<&RowRecord> {
        self.rows.get(id)
    }

    /// Mutable access to a row record (for example to flip `mounted`).
    pub fn row_mut(&mut self, id: &str) -> Option<&mut RowRecord> {
        self.rows.get_mut(id)
    }

    /// Ids of every registered row, in no particular order.
    pub fn row_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(String::as_str)
    }

    /// Number of registered rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The navigable order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Replace the navigable order.
    ///
    /// Registered rows marked disabled are dropped from the order. If the
    /// active row is no longer present, the first row becomes active (or none
    /// if the order is empty). A store with no active row keeps none.
    pub fn set_order<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.order = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| !self.rows.get(id).is_some_and(|r| r.disabled))
            .collect();
        tracing::trace!(message = "rows.order", list = %self.state.list_id, len = self.order.len());

        let still_present = self
            .state
            .active_id
            .as_ref()
            .is_none_or(|active| self.order.iter().any(|id| id == active));
        if !still_present {
            let first = self.order.first().cloned();
            self.set_active_id(first.as_deref(), ActiveCause::Programmatic);
        }
    }

    /// Make `id` the active row.
    ///
    /// Does nothing (and notifies nobody) if `id` is already active or names a
    /// disabled row. Before switching, every registered submenu trigger other
    /// than `id` has its submenu closed, so at most one sibling submenu is open.
    /// Keyboard-caused changes scroll the new row into view.
    ///
    /// Returns `true` if the active row changed.
    pub fn set_active_id(&mut self, id: Option<&str>, cause: ActiveCause) -> bool {
        if self.state.active_id.as_deref() == id {
            return false;
        }
        if let Some(id) = id
            && self.rows.get(id).is_some_and(|r| r.disabled)
        {
            return false;
        }

        for (row_id, record) in &self.rows {
            if Some(row_id.as_str()) == id || record.kind != RowKind::Submenu {
                continue;
            }
            if let Some(control) = &record.submenu
                && control.is_open()
            {
                control.close_sub();
            }
        }

        tracing::trace!(
            message = "rows.active",
            list = %self.state.list_id,
            from = ?self.state.active_id,
            to = ?id,
            cause = ?cause
        );
        self.state.active_id = id.map(ToString::to_string);
        self.notify();

        if cause == ActiveCause::Keyboard
            && let Some(id) = id
        {
            self.scroll_into_view(id);
        }
        true
    }

    fn scroll_into_view(&self, id: &str) {
        let Some(record) = self.rows.get(id) else {
            return;
        };
        if record.mounted {
            if let Some(list) = &self.list {
                list.scroll_row_into_view(id);
            }
            return;
        }
        let (Some(index), Some(virtualizer)) = (record.index, &self.virtualizer) else {
            return;
        };
        let pos = self.order.iter().position(|o| o == id);
        if pos == Some(0) {
            virtualizer.scroll_to_index(index, ScrollAlign::Start);
        } else if pos.is_some() && pos == self.order.len().checked_sub(1) {
            virtualizer.scroll_to_index(index, ScrollAlign::End);
        }
    }

    fn active_position(&self) -> Option<usize> {
        let active = self.state.active_id.as_ref()?;
        self.order.iter().position(|id| id == active)
    }

    fn activate_position(&mut self, pos: usize, cause: ActiveCause) -> bool {
        let id = self.order.get(pos).cloned();
        self.set_active_id(id.as_deref(), cause)
    }

    /// Activate the first row in the order.
    pub fn first(&mut self, cause: ActiveCause) -> bool {
        if self.order.is_empty() {
            return false;
        }
        self.activate_position(0, cause)
    }

    /// Activate the last row in the order.
    pub fn last(&mut self, cause: ActiveCause) -> bool {
        match self.order.len().checked_sub(1) {
            Some(pos) => self.activate_position(pos, cause),
            None => false,
        }
    }

    /// Activate the next row, wrapping from the last to the first.
    ///
    /// With no active row this activates the first row.
    pub fn next(&mut self, cause: ActiveCause) -> bool {
        let len = self.order.len();
        if len == 0 {
            return false;
        }
        let pos = match self.active_position() {
            Some(pos) => (pos + 1) % len,
            None => 0,
        };
        self.activate_position(pos, cause)
    }

    /// Activate the previous row, wrapping from the first to the last.
    ///
    /// With no active row this activates the last row.
    pub fn prev(&mut self, cause: ActiveCause) -> bool {
        let len = self.order.len();
        if len == 0 {
            return false;
        }
        let pos = match self.active_position() {
            Some(0) | None => len - 1,
            Some(pos) => pos - 1,
        };
        self.activate_position(pos, cause)
    }

    /// Activate the row at `index` in the order, clamped to the valid range.
    pub fn set_active_by_index(&mut self, index: usize, cause: ActiveCause) -> bool {
        match self.order.len().checked_sub(1) {
            Some(max) => self.activate_position(index.min(max), cause),
            None => false,
        }
    }

    /// Move by `delta` rows without wrapping (page navigation).
    pub fn step_clamped(&mut self, delta: isize, cause: ActiveCause) -> bool {
        if self.order.is_empty() {
            return false;
        }
        let target = match self.active_position() {
            Some(pos) => pos.saturating_add_signed(delta),
            None if delta < 0 => usize::MAX,
            None => 0,
        };
        self.set_active_by_index(target, cause)
    }

    /// Show or hide the search input.
    pub fn set_has_input(&mut self, has_input: bool) {
        if self.state.has_input != has_input {
            self.state.has_input = has_input;
            self.notify();
        }
    }

    /// Close every open submenu registered on this surface.
    pub fn close_all_submenus(&self) {
        for record in self.rows.values() {
            if let Some(control) = &record.submenu
                && control.is_open()
            {
                control.close_sub();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubmenuControl;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    fn store_with(ids: &[&str]) -> SurfaceStore {
        let mut store = SurfaceStore::new("list");
        for id in ids {
            store.register_row(*id, RowRecord::new(RowKind::Item));
        }
        store.set_order(ids.iter().copied());
        store.first(ActiveCause::Programmatic);
        store
    }

    #[derive(Default)]
    struct Sub {
        open: Cell<bool>,
        closes: Cell<u32>,
    }

    impl SubmenuControl for Sub {
        fn open_sub(&self) {
            self.open.set(true);
        }
        fn close_sub(&self) {
            self.open.set(false);
            self.closes.set(self.closes.get() + 1);
        }
        fn is_open(&self) -> bool {
            self.open.get()
        }
    }

    #[test]
    fn set_order_does_not_pick_an_active_row() {
        let mut store = SurfaceStore::new("list");
        store.set_order(["a", "b"]);
        assert_eq!(store.active_id(), None);
        store.first(ActiveCause::Programmatic);
        assert_eq!(store.active_id(), Some("a"));
    }

    #[test]
    fn same_id_is_a_no_op() {
        let mut store = store_with(&["a", "b"]);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        store.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(!store.set_active_id(Some("a"), ActiveCause::Keyboard));
        assert_eq!(calls.get(), 0);
        assert!(store.set_active_id(Some("b"), ActiveCause::Keyboard));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn next_and_prev_wrap() {
        let mut store = store_with(&["a", "b", "c"]);
        store.last(ActiveCause::Keyboard);
        store.next(ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("a"));
        store.prev(ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("c"));
    }

    #[test]
    fn disabled_rows_are_not_navigable() {
        let mut store = SurfaceStore::new("list");
        store.register_row("a", RowRecord::new(RowKind::Item));
        store.register_row("b", RowRecord::new(RowKind::Item).disabled(true));
        store.register_row("c", RowRecord::new(RowKind::Item));
        store.set_order(["a", "b", "c"]);
        assert_eq!(store.order(), &["a", "c"]);
        store.first(ActiveCause::Keyboard);
        store.next(ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("c"));
        assert!(!store.set_active_id(Some("b"), ActiveCause::Pointer));
        assert_eq!(store.active_id(), Some("c"));
    }

    #[test]
    fn activating_closes_other_submenus() {
        let mut store = SurfaceStore::new("list");
        let a = Rc::new(Sub::default());
        let b = Rc::new(Sub::default());
        store.register_row("a", RowRecord::submenu(a.clone()));
        store.register_row("b", RowRecord::submenu(b.clone()));
        store.set_order(["a", "b"]);

        a.open_sub();
        store.set_active_id(Some("b"), ActiveCause::Pointer);
        b.open_sub();
        assert!(!a.is_open());
        assert!(b.is_open());
        assert_eq!(a.closes.get(), 1);
        // Closed submenus are left alone.
        store.set_active_id(Some("a"), ActiveCause::Pointer);
        assert_eq!(a.closes.get(), 1);
        assert!(!b.is_open());
    }

    #[test]
    fn set_active_by_index_clamps() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_active_by_index(99, ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("c"));
        store.step_clamped(-10, ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("a"));
        store.step_clamped(2, ActiveCause::Keyboard);
        assert_eq!(store.active_id(), Some("c"));
    }

    #[test]
    fn removing_active_row_moves_to_first() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_active_id(Some("c"), ActiveCause::Pointer);
        store.set_order(["a", "b"]);
        assert_eq!(store.active_id(), Some("a"));
        store.set_order(core::iter::empty::<&str>());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn select_subscription_fires_on_change_only() {
        let mut store = store_with(&["a", "b"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe_select(
            |s| s.has_input,
            move |v: &bool| sink.borrow_mut().push(*v),
        );
        store.set_active_id(Some("b"), ActiveCause::Pointer);
        store.set_has_input(false);
        store.set_has_input(false);
        assert_eq!(*seen.borrow(), vec![false]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = store_with(&["a", "b"]);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let sub = store.subscribe(move |_| seen.set(seen.get() + 1));
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.next(ActiveCause::Keyboard);
        assert_eq!(calls.get(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[derive(Default)]
    struct Scrolls {
        element: RefCell<Vec<String>>,
        index: RefCell<Vec<(usize, ScrollAlign)>>,
    }

    impl ListElement for Scrolls {
        fn scroll_row_into_view(&self, id: &str) {
            self.element.borrow_mut().push(id.to_string());
        }
    }

    impl Virtualizer for Scrolls {
        fn scroll_to_index(&self, index: usize, align: ScrollAlign) {
            self.index.borrow_mut().push((index, align));
        }
    }

    #[test]
    fn keyboard_activation_scrolls() {
        let scrolls = Rc::new(Scrolls::default());
        let mut store = SurfaceStore::new("list");
        store.set_list(Some(scrolls.clone()));
        store.set_virtualizer(Some(scrolls.clone()));
        store.register_row("a", RowRecord::new(RowKind::Item).with_index(0));
        store.register_row("b", RowRecord::new(RowKind::Item).with_index(1).mounted(false));
        store.register_row("c", RowRecord::new(RowKind::Item).with_index(2).mounted(false));
        store.register_row("d", RowRecord::new(RowKind::Item).with_index(3).mounted(false));
        store.set_order(["a", "b", "c", "d"]);

        // Pointer-caused changes never scroll.
        store.set_active_id(Some("d"), ActiveCause::Pointer);
        assert!(scrolls.index.borrow().is_empty());

        // Wrapping to the first row scrolls the mounted element.
        store.next(ActiveCause::Keyboard);
        assert_eq!(*scrolls.element.borrow(), vec![String::from("a")]);

        // An unmounted middle row does not trigger a virtualizer scroll.
        store.next(ActiveCause::Keyboard);
        assert!(scrolls.index.borrow().is_empty());

        // Wrapping back to the last row scrolls by index.
        store.first(ActiveCause::Keyboard);
        store.prev(ActiveCause::Keyboard);
        assert_eq!(*scrolls.index.borrow(), vec![(3, ScrollAlign::End)]);

        // Re-activating the same row does not scroll again.
        store.set_active_id(Some("d"), ActiveCause::Keyboard);
        assert_eq!(scrolls.index.borrow().len(), 1);
    }
}
