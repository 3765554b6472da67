// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bind props handed to rendering slots.
//!
//! A [`Props`] value is what a slot spreads onto its element: id, role,
//! class names, attributes, event handlers, and ref callbacks. The menu
//! computes core props for each slot and merges caller overrides into them
//! with [`Props::merge`]:
//!
//! - class names are joined, core first;
//! - attributes, `id`, and `role` from the overrides replace core values;
//! - handlers and refs are composed, never replaced.
//!
//! Core behavior is not a closure on the props but a [`BindTarget`]. The host
//! routes element events through [`ActionMenu::dispatch`](crate::ActionMenu::dispatch),
//! which runs caller handlers in order and then the core behavior for the
//! target, unless a handler returned [`Outcome::Stop`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use kurbo::Point;
use smallvec::SmallVec;

use crate::KeyEvent;

/// Whether later handlers, and the core behavior, still run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going.
    #[default]
    Continue,
    /// Skip the remaining handlers and the core behavior.
    Stop,
}

/// An element event routed through bind props.
#[derive(Clone, Debug, PartialEq)]
pub enum PropEvent {
    /// The pointer entered the element.
    PointerEnter {
        /// Pointer position.
        position: Point,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// The pointer moved over the element.
    PointerMove {
        /// Pointer position.
        position: Point,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// The pointer left the element.
    PointerLeave {
        /// Exit position.
        position: Point,
        /// Timestamp in milliseconds.
        time: u64,
    },
    /// Click or tap.
    Click,
    /// A key press while the element has focus.
    KeyDown(KeyEvent),
    /// The input's text changed.
    Input(String),
}

/// The kind of a [`PropEvent`], used to register handlers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropEventKind {
    /// [`PropEvent::PointerEnter`].
    PointerEnter,
    /// [`PropEvent::PointerMove`].
    PointerMove,
    /// [`PropEvent::PointerLeave`].
    PointerLeave,
    /// [`PropEvent::Click`].
    Click,
    /// [`PropEvent::KeyDown`].
    KeyDown,
    /// [`PropEvent::Input`].
    Input,
}

impl PropEvent {
    /// This event's kind.
    pub fn kind(&self) -> PropEventKind {
        match self {
            Self::PointerEnter { .. } => PropEventKind::PointerEnter,
            Self::PointerMove { .. } => PropEventKind::PointerMove,
            Self::PointerLeave { .. } => PropEventKind::PointerLeave,
            Self::Click => PropEventKind::Click,
            Self::KeyDown(_) => PropEventKind::KeyDown,
            Self::Input(_) => PropEventKind::Input,
        }
    }
}

/// An event handler.
pub type Handler = Rc<dyn Fn(&PropEvent) -> Outcome>;

/// A host element, opaque to the menu.
pub type ElementRef = Rc<dyn Any>;

/// Called with the element on mount and `None` on unmount.
pub type RefCallback = Rc<dyn Fn(Option<&ElementRef>)>;

/// What a set of props is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindTarget {
    /// A row on a surface.
    Row {
        /// Surface id.
        surface: String,
        /// Row id.
        row: String,
    },
    /// A surface's search input.
    Input(String),
    /// A surface's list.
    List(String),
    /// A surface's content container.
    Content(String),
    /// A group heading on a surface.
    GroupHeading {
        /// Surface id.
        surface: String,
        /// Row id of the heading.
        row: String,
    },
}

/// Props for one slot element.
#[derive(Clone, Default)]
pub struct Props {
    /// Element id.
    pub id: Option<String>,
    /// ARIA role.
    pub role: Option<String>,
    /// Space-separated class names.
    pub class_name: String,
    /// Other attributes (`aria-*`, `data-*`, `style`, ...).
    pub attrs: BTreeMap<String, String>,
    handlers: SmallVec<[(PropEventKind, Handler); 2]>,
    refs: SmallVec<[RefCallback; 1]>,
    target: Option<BindTarget>,
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("class_name", &self.class_name)
            .field("attrs", &self.attrs)
            .field("handlers", &self.handlers.len())
            .field("refs", &self.refs.len())
            .field("target", &self.target)
            .finish()
    }
}

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bound(target: BindTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Append class names.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.class_name = join_classes([self.class_name.as_str(), class]);
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Add a handler for events of `kind`.
    #[must_use]
    pub fn on(mut self, kind: PropEventKind, handler: impl Fn(&PropEvent) -> Outcome + 'static) -> Self {
        self.handlers.push((kind, Rc::new(handler)));
        self
    }

    /// Add a ref callback.
    #[must_use]
    pub fn on_ref(mut self, callback: impl Fn(Option<&ElementRef>) + 'static) -> Self {
        self.refs.push(Rc::new(callback));
        self
    }

    /// What these props are bound to, if computed by the menu.
    pub fn target(&self) -> Option<&BindTarget> {
        self.target.as_ref()
    }

    /// Attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: PropEventKind) -> usize {
        self.handlers.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Merge caller `overrides` into these core props.
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        let Self {
            id,
            role,
            class_name,
            attrs,
            handlers,
            refs,
            target: _,
        } = overrides;
        if id.is_some() {
            self.id = id;
        }
        if role.is_some() {
            self.role = role;
        }
        self.class_name = join_classes([self.class_name.as_str(), class_name.as_str()]);
        self.attrs.extend(attrs);
        self.handlers.extend(handlers);
        self.refs.extend(refs);
        self
    }

    /// Run the handlers registered for `event`'s kind, in order.
    pub fn run_handlers(&self, event: &PropEvent) -> Outcome {
        let kind = event.kind();
        for (k, handler) in &self.handlers {
            if *k == kind && handler(event) == Outcome::Stop {
                return Outcome::Stop;
            }
        }
        Outcome::Continue
    }

    /// Call every ref callback.
    pub fn call_refs(&self, element: Option<&ElementRef>) {
        for r in &self.refs {
            r(element);
        }
    }
}

/// Join class names with single spaces, skipping empty parts.
pub fn join_classes<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
