// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Action Menu: a headless command menu with nested submenus.
//!
//! [`ActionMenu`] ties the other Understory menu crates together:
//!
//! - definitions are instantiated with `understory_menu_tree`;
//! - each open surface keeps an `understory_rows` store (active row,
//!   navigable order, submenu handles);
//! - rows come from an `understory_menu_filter` pipeline for the surface's
//!   query;
//! - submenu loaders and deep search run through an
//!   `understory_menu_loader` adapter;
//! - hover changes are aim-guarded with `understory_aim` while the pointer
//!   travels toward an open submenu.
//!
//! The menu renders nothing. Hosts render slots from [`ActionMenu::render`]
//! or the `get_*_props` bind APIs, and feed input back through
//! [`ActionMenu::dispatch`], [`ActionMenu::key_down`], and the pointer
//! methods.
//!
//! ## Surfaces and focus
//!
//! The root surface exists while the menu is open. Opening a submenu moves
//! its [`SubHandle`] to [`SubState::OpenPending`]; once the host reports the
//! content mounted ([`ActionMenu::surface_mounted`]), focus moves into it,
//! the state becomes [`SubState::OpenFocused`], and keyboard input goes to
//! the new surface. Focus moves that race the mount are retried on later
//! frames through a [`FocusHost`] and abandoned after
//! [`MAX_FOCUS_ATTEMPTS`].
//!
//! At most one submenu per surface is open: activating another row closes
//! its siblings. Escape (or the close arrow, or `Ctrl+h`) closes the focused
//! submenu and returns focus to its trigger. Selecting an item closes every
//! surface unless the item (or its menu's defaults) says otherwise;
//! checkbox and radio items stay open by default.
//!
//! ## Presentation
//!
//! [`Responsive`] picks [`PresentationMode::Dropdown`] or
//! [`PresentationMode::Drawer`]. Hover and aim guarding only apply to
//! dropdowns under a fine pointer. Changing mode closes the menu.
//!
//! ## Example
//!
//! ```
//! use understory_action_menu::{ActionMenu, Key, KeyEvent, MenuConfig, SubState};
//! use understory_menu_tree::{MenuDef, NodeDef, SubmenuDef};
//!
//! let def = MenuDef::new("cmd")
//!     .node(NodeDef::item("new", "New file"))
//!     .node(SubmenuDef::new("recent", "Open recent").nodes([NodeDef::item("a", "a.txt")]));
//! let mut menu = ActionMenu::new(def, MenuConfig::default()).unwrap();
//!
//! menu.set_open(true);
//! menu.surface_mounted("cmd").unwrap();
//! assert_eq!(menu.active_id("cmd"), Some("new"));
//!
//! menu.key_down(&KeyEvent::new(Key::ArrowDown));
//! menu.key_down(&KeyEvent::new(Key::ArrowRight));
//! assert_eq!(menu.sub_state("cmd::recent"), SubState::OpenPending);
//!
//! menu.surface_mounted("cmd::recent").unwrap();
//! assert_eq!(menu.sub_state("cmd::recent"), SubState::OpenFocused);
//! assert_eq!(menu.owner(), Some("cmd::recent"));
//! assert_eq!(menu.active_id("cmd::recent"), Some("a"));
//!
//! menu.key_down(&KeyEvent::new(Key::Escape));
//! assert_eq!(menu.owner(), Some("cmd"));
//! assert_eq!(menu.active_id("cmd"), Some("recent"));
//! ```

mod bind;
mod config;
mod error;
mod event;
mod focus;
mod keyboard;
mod menu;
mod props;
mod render;
mod shell;
mod sub;
mod surface;

pub use config::{ActionMenuFactory, FactoryDefaults, MenuConfig, create_action_menu};
pub use error::MenuError;
pub use event::MenuEvent;
pub use focus::{FocusHost, FocusOutcome, FocusRetry, FocusTarget, MAX_FOCUS_ATTEMPTS};
pub use keyboard::{Command, Direction, Key, KeyEvent, KeyboardOptions, Modifiers, command_for};
pub use menu::ActionMenu;
pub use props::{
    BindTarget, ElementRef, Handler, Outcome, PropEvent, PropEventKind, Props, RefCallback,
    join_classes,
};
pub use render::{RowView, SlotRenderer};
pub use shell::{Environment, MediaQuery, PointerKind, PresentationMode, Responsive, hover_enabled};
pub use sub::{Modality, SubHandle, SubState};
pub use surface::{SurfaceStatus, SurfaceView};
