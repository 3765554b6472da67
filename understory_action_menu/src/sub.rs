// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Submenu state machines.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::Rect;
use understory_rows::SubmenuControl;

/// Lifecycle of one submenu surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubState {
    /// Not shown.
    #[default]
    Closed,
    /// Opened; its content has not mounted or taken focus yet.
    OpenPending,
    /// Mounted and focused; it owns keyboard input.
    OpenFocused,
}

/// How a surface was opened.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Modality {
    /// By keyboard: the first row becomes active on mount and hover is
    /// ignored until the pointer moves.
    Keyboard,
    /// By pointer.
    #[default]
    Pointer,
}

/// A request recorded by a [`SubHandle`] for the menu to carry out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SubRequest {
    Open(String),
    Close(String),
}

pub(crate) type Requests = Rc<RefCell<Vec<SubRequest>>>;

/// Open/close handle for one submenu, registered with its trigger row.
///
/// Row stores call into handles while they are mid-update, so a handle only
/// flips its own state and records a request; the menu applies the request
/// (creating or tearing down the child surface) once the store is done.
#[derive(Debug)]
pub struct SubHandle {
    child: String,
    parent: String,
    trigger: String,
    state: Cell<SubState>,
    modality: Cell<Modality>,
    trigger_rect: Cell<Option<Rect>>,
    content_rect: Cell<Option<Rect>>,
    requests: Requests,
}

impl SubHandle {
    pub(crate) fn new(child: String, parent: String, trigger: String, requests: Requests) -> Self {
        Self {
            child,
            parent,
            trigger,
            state: Cell::new(SubState::Closed),
            modality: Cell::new(Modality::Pointer),
            trigger_rect: Cell::new(None),
            content_rect: Cell::new(None),
            requests,
        }
    }

    /// Surface id of the submenu.
    pub fn child_surface(&self) -> &str {
        &self.child
    }

    /// Surface id of the surface holding the trigger.
    pub fn parent_surface(&self) -> &str {
        &self.parent
    }

    /// Row id of the trigger on the parent surface.
    pub fn trigger_id(&self) -> &str {
        &self.trigger
    }

    /// Current state.
    pub fn state(&self) -> SubState {
        self.state.get()
    }

    /// How the submenu was last opened.
    pub fn modality(&self) -> Modality {
        self.modality.get()
    }

    pub(crate) fn set_modality(&self, modality: Modality) {
        self.modality.set(modality);
    }

    pub(crate) fn set_focused(&self) {
        if self.state.get() == SubState::OpenPending {
            self.state.set(SubState::OpenFocused);
        }
    }

    /// Last reported trigger bounds.
    pub fn trigger_rect(&self) -> Option<Rect> {
        self.trigger_rect.get()
    }

    pub(crate) fn set_trigger_rect(&self, rect: Option<Rect>) {
        self.trigger_rect.set(rect);
    }

    /// Last reported content bounds.
    pub fn content_rect(&self) -> Option<Rect> {
        self.content_rect.get()
    }

    pub(crate) fn set_content_rect(&self, rect: Option<Rect>) {
        self.content_rect.set(rect);
    }
}

impl SubmenuControl for SubHandle {
    fn open_sub(&self) {
        if self.state.get() == SubState::Closed {
            self.state.set(SubState::OpenPending);
            self.requests
                .borrow_mut()
                .push(SubRequest::Open(self.child.clone()));
        }
    }

    fn close_sub(&self) {
        if self.state.get() != SubState::Closed {
            self.state.set(SubState::Closed);
            self.requests
                .borrow_mut()
                .push(SubRequest::Close(self.child.clone()));
        }
    }

    fn is_open(&self) -> bool {
        self.state.get() != SubState::Closed
    }
}
