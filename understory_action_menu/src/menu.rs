// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The action menu orchestrator.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::mem;
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_aim::{AimTracker, HoverDecision};
use understory_menu_filter::{Row, RowKind};
use understory_menu_loader::{DeepSearch, DeepSearchState, LoaderAdapter, LoaderState, Notify};
use understory_menu_tree::{
    InputVisibility, ItemVariant, LoadError, Loader, LoaderContext, MenuDef, MenuKey, MenuTree,
    NodeKey, NodeKind, PATH_SEPARATOR, SelectEvent, instantiate,
};
use understory_rows::{ActiveCause, ListElement, RowRecord, SubmenuControl, SurfaceStore, Virtualizer};

use crate::focus::{FocusOutcome, FocusRetry};
use crate::shell::hover_enabled;
use crate::sub::{Requests, SubRequest};
use crate::surface::Surface;
use crate::{
    Command, Environment, FocusTarget, KeyEvent, MenuConfig, MenuError, MenuEvent, Modality,
    PresentationMode, SubHandle, SubState, SurfaceStatus, SurfaceView, command_for,
};

/// State transitions log at `debug` when the menu was built with `debug`.
macro_rules! transition {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::debug!($($arg)+);
        } else {
            tracing::trace!($($arg)+);
        }
    };
}

/// Resolves static loaders only; used when no adapter is configured.
#[derive(Debug)]
struct StaticAdapter;

impl LoaderAdapter for StaticAdapter {
    fn load(&self, _: &LoaderContext, loader: &Loader) -> LoaderState {
        match loader {
            Loader::Static(nodes) => LoaderState::ready(nodes.clone()),
            Loader::Future(_) | Loader::Handle(_) => {
                LoaderState::failed(LoadError::new("no loader adapter configured"))
            }
        }
    }

    fn release(&self, _: &LoaderContext) {}

    fn set_notify(&self, _: Notify) {}
}

/// A headless action menu: a root surface plus any open submenu surfaces.
///
/// The menu owns one [`SurfaceStore`] per open surface and re-derives every
/// surface's rows from the definition whenever its inputs change (query,
/// loader progress, definition updates). Hosts feed it pointer and keyboard
/// input, report mounts and geometry, and render what
/// [`render`](Self::render) hands them.
pub struct ActionMenu {
    def: MenuDef,
    tree: MenuTree,
    config: MenuConfig,
    adapter: Rc<dyn LoaderAdapter>,
    deep: DeepSearch,
    deep_state: DeepSearchState,
    lazy: HashSet<LoaderContext>,
    dirty: Rc<Cell<bool>>,
    root_id: String,
    open: bool,
    mode: PresentationMode,
    environment: Environment,
    root_modality: Modality,
    surfaces: Vec<Surface>,
    subs: HashMap<String, Rc<SubHandle>>,
    requests: Requests,
    owner: Option<String>,
    aim: AimTracker<(String, String)>,
    focus: FocusRetry,
    checked: HashMap<(String, String), bool>,
    radio: HashMap<(String, String), String>,
    events: Vec<MenuEvent>,
}

impl fmt::Debug for ActionMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMenu")
            .field("root_id", &self.root_id)
            .field("open", &self.open)
            .field("mode", &self.mode)
            .field("owner", &self.owner)
            .field(
                "surfaces",
                &self.surfaces.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            )
            .field("deep", &self.deep)
            .finish_non_exhaustive()
    }
}

impl ActionMenu {
    /// Build a menu from a definition.
    ///
    /// Fails if the definition is invalid.
    pub fn new(def: MenuDef, config: MenuConfig) -> Result<Self, MenuError> {
        let root_id = config.id.clone().unwrap_or_else(|| def.id.clone());
        let tree = instantiate(&def, &root_id, 0)?;
        let adapter = config
            .loader_adapter
            .clone()
            .unwrap_or_else(|| Rc::new(StaticAdapter));
        let dirty = Rc::new(Cell::new(false));
        let flag = dirty.clone();
        adapter.set_notify(Rc::new(move || flag.set(true)));
        let environment = config.environment;
        let mode = config.responsive.resolve(&environment);
        let start_open = config.open.unwrap_or(config.default_open);

        let mut menu = Self {
            def,
            tree,
            deep: DeepSearch::new(adapter.clone()),
            adapter,
            deep_state: DeepSearchState::default(),
            lazy: HashSet::new(),
            dirty,
            root_id,
            open: false,
            mode,
            environment,
            root_modality: Modality::Pointer,
            surfaces: Vec::new(),
            subs: HashMap::new(),
            requests: Requests::default(),
            owner: None,
            aim: AimTracker::new(config.aim),
            focus: FocusRetry::default(),
            checked: HashMap::new(),
            radio: HashMap::new(),
            events: Vec::new(),
            config,
        };
        if start_open {
            menu.apply_open(true);
        }
        Ok(menu)
    }

    // --- open state -------------------------------------------------------

    /// Whether the root surface is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Request an open state change, as a trigger or dismissal would.
    ///
    /// Reports the request through `on_open_change` and
    /// [`MenuEvent::OpenChange`]. Uncontrolled menus apply it immediately;
    /// controlled menus wait for [`set_open_prop`](Self::set_open_prop).
    pub fn set_open(&mut self, open: bool) {
        if open == self.open {
            return;
        }
        if let Some(cb) = &self.config.on_open_change {
            cb.call(&open);
        }
        self.events.push(MenuEvent::OpenChange { open });
        if self.config.open.is_none() {
            self.apply_open(open);
        }
    }

    /// Open the menu, recording how it was opened.
    ///
    /// Keyboard-opened menus activate their first row once mounted.
    pub fn open_with(&mut self, modality: Modality) {
        self.root_modality = modality;
        self.set_open(true);
    }

    /// Update the controlled open state; `None` makes the menu uncontrolled.
    pub fn set_open_prop(&mut self, open: Option<bool>) {
        self.config.open = open;
        if let Some(open) = open {
            self.apply_open(open);
        }
    }

    fn apply_open(&mut self, open: bool) {
        if open == self.open {
            return;
        }
        self.open = open;
        transition!(self.config.debug, message = "menu.open", root = %self.root_id, open);
        if open {
            let input = self
                .tree
                .menu(self.tree.root())
                .input
                .unwrap_or(self.config.input);
            self.surfaces
                .push(Surface::new(self.root_id.clone(), 0, input));
            self.owner = Some(self.root_id.clone());
            self.settle();
        } else {
            self.teardown_all();
        }
    }

    fn teardown_all(&mut self) {
        for handle in self.subs.values() {
            handle.close_sub();
        }
        self.requests.borrow_mut().clear();
        self.subs.clear();
        self.surfaces.clear();
        for cx in self.lazy.drain() {
            self.adapter.release(&cx);
        }
        self.deep.release_all();
        self.deep_state = DeepSearchState::default();
        self.owner = None;
        self.focus.cancel();
        self.aim.reset();
        self.root_modality = Modality::Pointer;
    }

    // --- responsive shell -------------------------------------------------

    /// The resolved presentation mode.
    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// The last reported environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Report a new environment (pointer kind, viewport width).
    ///
    /// A change of presentation mode closes the menu.
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
        let mode = self.config.responsive.resolve(&environment);
        if mode != self.mode {
            transition!(self.config.debug, message = "shell.mode", from = ?self.mode, to = ?mode);
            self.mode = mode;
            self.set_open(false);
        }
    }

    // --- queries ----------------------------------------------------------

    /// Id of the root surface.
    pub fn root_surface_id(&self) -> &str {
        &self.root_id
    }

    /// Surface that owns keyboard input.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Ids of open surfaces, parents before children.
    pub fn open_surfaces(&self) -> impl Iterator<Item = &str> + '_ {
        self.surfaces.iter().map(|s| s.id.as_str())
    }

    /// The instantiated definition currently shown, including loaded nodes.
    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    /// The host definition.
    pub fn def(&self) -> &MenuDef {
        &self.def
    }

    /// Deep-search state for the root query.
    pub fn deep_search_state(&self) -> &DeepSearchState {
        &self.deep_state
    }

    pub(crate) fn surface_ref(&self, id: &str) -> Result<&Surface, MenuError> {
        self.surfaces
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| MenuError::UnknownSurface(id.to_owned()))
    }

    fn surface_mut(&mut self, id: &str) -> Result<&mut Surface, MenuError> {
        self.surfaces
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MenuError::UnknownSurface(id.to_owned()))
    }

    pub(crate) fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// A read-only view of an open surface.
    pub fn surface(&self, id: &str) -> Result<SurfaceView<'_>, MenuError> {
        let s = self.surface_ref(id)?;
        Ok(SurfaceView {
            id: &s.id,
            depth: s.depth,
            mode: self.mode,
            query: &s.query,
            rows: &s.rows,
            active_id: s.store.active_id(),
            has_input: s.store.state().has_input,
            placeholder: s.placeholder.as_deref(),
            status: self.status_of(s),
            min_width: s.min_width,
        })
    }

    pub(crate) fn status_of(&self, s: &Surface) -> SurfaceStatus {
        if s.id == self.root_id {
            s.status(self.deep_state.is_loading, self.deep_state.is_fetching)
        } else {
            s.status(false, false)
        }
    }

    /// Rows of an open surface, in display order.
    pub fn rows(&self, surface_id: &str) -> Result<&[Row], MenuError> {
        Ok(&self.surface_ref(surface_id)?.rows)
    }

    /// Active row of an open surface.
    pub fn active_id(&self, surface_id: &str) -> Option<&str> {
        self.surface_ref(surface_id).ok()?.store.active_id()
    }

    /// The row store of an open surface.
    pub fn store(&self, surface_id: &str) -> Result<&SurfaceStore, MenuError> {
        Ok(&self.surface_ref(surface_id)?.store)
    }

    /// The row store of an open surface, for subscribing.
    pub fn store_mut(&mut self, surface_id: &str) -> Result<&mut SurfaceStore, MenuError> {
        Ok(&mut self.surface_mut(surface_id)?.store)
    }

    /// The handle of the submenu with surface id `child`.
    pub fn sub(&self, child: &str) -> Option<&SubHandle> {
        self.subs.get(child).map(|h| &**h)
    }

    /// State of the submenu with surface id `child`.
    pub fn sub_state(&self, child: &str) -> SubState {
        self.sub(child).map_or(SubState::Closed, SubHandle::state)
    }

    /// Checked state of a checkbox or radio row; `None` for other rows.
    pub fn is_checked(&self, surface_id: &str, row_id: &str) -> Option<bool> {
        let node = self.surface_ref(surface_id).ok()?.row(row_id)?.node?;
        self.checked_of(node)
    }

    pub(crate) fn checked_of(&self, key: NodeKey) -> Option<bool> {
        let node = self.tree.node(key);
        let NodeKind::Item(item) = &node.kind else {
            return None;
        };
        match item.variant {
            ItemVariant::Button => None,
            ItemVariant::Checkbox => Some(item.checked.unwrap_or_else(|| {
                self.checked
                    .get(&(node.surface_id.clone(), node.id.clone()))
                    .copied()
                    .unwrap_or(false)
            })),
            ItemVariant::Radio => {
                let value = item.value.as_deref().unwrap_or(&node.id);
                let group = self.tree.node(node.group?);
                let NodeKind::Group(g) = &group.kind else {
                    return None;
                };
                let current = match &g.value {
                    Some(v) => Some(v.as_str()),
                    None => self
                        .radio
                        .get(&(group.surface_id.clone(), group.id.clone()))
                        .map(String::as_str),
                };
                Some(current == Some(value))
            }
        }
    }

    /// Take the queued events.
    pub fn drain_events(&mut self) -> Vec<MenuEvent> {
        mem::take(&mut self.events)
    }

    // --- definition and loaders -------------------------------------------

    /// Replace the definition, keeping surfaces whose ids survive.
    pub fn update_menu(&mut self, def: MenuDef) -> Result<(), MenuError> {
        self.tree = instantiate(&def, &self.root_id, 0)?;
        self.def = def;
        self.settle();
        Ok(())
    }

    /// Whether a loader settled since the last [`refresh`](Self::refresh).
    pub fn needs_refresh(&self) -> bool {
        self.dirty.get()
    }

    /// Re-derive every open surface from current loader state.
    pub fn refresh(&mut self) {
        self.dirty.set(false);
        self.settle();
    }

    /// Submenu ids from the root to `surface_id`.
    fn def_path<'a>(&self, surface_id: &'a str) -> Option<Vec<&'a str>> {
        let rest = surface_id.strip_prefix(self.root_id.as_str())?;
        if rest.is_empty() {
            return Some(Vec::new());
        }
        Some(rest.strip_prefix(PATH_SEPARATOR)?.split(PATH_SEPARATOR).collect())
    }

    /// Sync and apply submenu requests until nothing changes.
    fn settle(&mut self) {
        if !self.open {
            return;
        }
        loop {
            self.sync();
            if !self.flush() {
                break;
            }
        }
    }

    /// Rebuild the shown tree and every open surface's rows.
    fn sync(&mut self) {
        let root_query = self
            .surfaces
            .first()
            .map(|s| s.query.clone())
            .unwrap_or_default();
        let (mut view, deep_state) = self.deep.resolve(&self.def, &self.root_id, &root_query);
        self.deep_state = deep_state;

        let mut wanted = HashSet::new();
        let mut loads = Vec::with_capacity(self.surfaces.len());
        for s in &self.surfaces {
            let Some(path) = self.def_path(&s.id).filter(|p| !p.is_empty()) else {
                loads.push(None);
                continue;
            };
            let Some(sub) = view.submenu_mut(&path) else {
                loads.push(None);
                continue;
            };
            let (true, Some(loader)) = (sub.needs_load(), sub.loader.clone()) else {
                loads.push(None);
                continue;
            };
            let cx = LoaderContext {
                query: String::new(),
                surface_id: s.id.clone(),
            };
            let st = self.adapter.load(&cx, &loader);
            if let Some(data) = &st.data {
                sub.resolve(data.clone(), "");
            }
            wanted.insert(cx);
            loads.push(Some(st));
        }
        for stale in self.lazy.difference(&wanted) {
            self.adapter.release(stale);
        }
        self.lazy = wanted;

        self.tree = match instantiate(&view, &self.root_id, 0) {
            Ok(tree) => tree,
            Err(error) => {
                tracing::warn!(message = "menu.loaded_invalid", %error);
                match instantiate(&self.def, &self.root_id, 0) {
                    Ok(tree) => tree,
                    Err(_) => return,
                }
            }
        };

        let mut vanished = Vec::new();
        for (i, load) in loads.into_iter().enumerate() {
            self.surfaces[i].load = load;
            if !self.sync_rows(i) {
                vanished.push(self.surfaces[i].id.clone());
            }
        }
        for id in vanished {
            self.close_surface(&id);
        }
        self.close_orphaned_subs();
    }

    /// Re-derive one surface's rows and registry. Returns `false` if the
    /// surface no longer exists in the tree.
    fn sync_rows(&mut self, index: usize) -> bool {
        let Self {
            surfaces,
            tree,
            config,
            subs,
            requests,
            ..
        } = self;
        let s = &mut surfaces[index];
        let Some(key) = tree.menu_by_surface(&s.id) else {
            return false;
        };
        let menu = tree.menu(key);
        s.input = menu.input.unwrap_or(config.input);
        s.placeholder = menu.placeholder.clone().or_else(|| config.placeholder.clone());
        s.ui = menu.ui.clone();
        if s.input == InputVisibility::Never {
            s.store.set_has_input(false);
        }
        s.rows = config.pipeline.run(tree, key, &s.query);

        let before: Vec<String> = s.store.row_ids().map(ToOwned::to_owned).collect();
        let mut live = HashSet::with_capacity(s.rows.len());
        for (i, row) in s.rows.iter().enumerate() {
            let mounted = s.store.row(&row.id).is_some_and(|r| r.mounted);
            let record = match row.kind {
                RowKind::Item | RowKind::Create { .. } => {
                    RowRecord::new(understory_rows::RowKind::Item)
                }
                RowKind::Submenu => {
                    let Some(child) = row.node.and_then(|n| tree.submenu_child(n)) else {
                        continue;
                    };
                    let child = tree.menu(child).surface_id.clone();
                    let handle = subs
                        .entry(child.clone())
                        .or_insert_with(|| {
                            Rc::new(SubHandle::new(
                                child,
                                s.id.clone(),
                                row.id.clone(),
                                requests.clone(),
                            ))
                        })
                        .clone();
                    RowRecord::submenu(handle)
                }
                RowKind::GroupHeading | RowKind::Separator => continue,
            };
            s.store.register_row(
                row.id.clone(),
                record.disabled(row.disabled).with_index(i).mounted(mounted),
            );
            live.insert(row.id.as_str());
        }
        for id in before.iter().filter(|id| !live.contains(id.as_str())) {
            s.store.unregister_row(id);
        }
        s.store.set_order(
            s.rows
                .iter()
                .filter(|r| r.is_navigable())
                .map(|r| r.id.as_str()),
        );
        // Results streaming into an empty search get an active row.
        if !s.query.trim().is_empty() && s.store.active_id().is_none() {
            s.store.first(ActiveCause::Programmatic);
        }
        true
    }

    /// Close open submenus whose trigger row is gone from their parent.
    fn close_orphaned_subs(&mut self) {
        for handle in self.subs.values() {
            if !handle.is_open() {
                continue;
            }
            let trigger_present = self
                .surfaces
                .iter()
                .find(|s| s.id == handle.parent_surface())
                .is_some_and(|p| p.store.row(handle.trigger_id()).is_some());
            if !trigger_present {
                handle.close_sub();
            }
        }
        let open: HashSet<&str> = self.surfaces.iter().map(|s| s.id.as_str()).collect();
        self.subs
            .retain(|_, h| h.is_open() || open.contains(h.parent_surface()));
    }

    /// Apply queued submenu requests. Returns `true` if any surface opened or closed.
    fn flush(&mut self) -> bool {
        let mut changed = false;
        loop {
            let requests = mem::take(&mut *self.requests.borrow_mut());
            if requests.is_empty() {
                return changed;
            }
            for request in requests {
                changed |= match request {
                    SubRequest::Open(child) => self.mount_sub(&child),
                    SubRequest::Close(child) => self.close_surface(&child),
                };
            }
        }
    }

    fn mount_sub(&mut self, child: &str) -> bool {
        let Some(handle) = self.subs.get(child).cloned() else {
            return false;
        };
        if !handle.is_open() || self.surfaces.iter().any(|s| s.id == child) {
            return false;
        }
        let Some(parent_depth) = self
            .surfaces
            .iter()
            .find(|s| s.id == handle.parent_surface())
            .map(|s| s.depth)
        else {
            handle.close_sub();
            return false;
        };
        let input = self
            .tree
            .menu_by_surface(child)
            .and_then(|k| self.tree.menu(k).input)
            .unwrap_or(self.config.input);
        let mut surface = Surface::new(child.to_owned(), parent_depth + 1, input);
        surface.hover_blocked = handle.modality() == Modality::Keyboard;
        self.surfaces.push(surface);
        transition!(
            self.config.debug,
            message = "sub.open",
            surface = child,
            modality = ?handle.modality()
        );
        true
    }

    /// Tear down `id` and every surface nested below it.
    fn close_surface(&mut self, id: &str) -> bool {
        let prefix = format!("{id}{PATH_SEPARATOR}");
        let before = self.surfaces.len();
        self.surfaces
            .retain(|s| s.id != id && !s.id.starts_with(&prefix));
        if self.surfaces.len() == before {
            return false;
        }
        for (child, handle) in &self.subs {
            if child == id || child.starts_with(&prefix) {
                handle.close_sub();
            }
        }
        self.focus.cancel_surface(id);
        let owner_closed = self
            .owner
            .as_ref()
            .is_some_and(|o| o == id || o.starts_with(&prefix));
        if owner_closed {
            self.owner = self
                .subs
                .get(id)
                .map(|h| h.parent_surface().to_owned())
                .or_else(|| Some(self.root_id.clone()));
        }
        transition!(self.config.debug, message = "sub.close", surface = id);
        true
    }

    /// Close the focused submenu `child` and return focus to its trigger.
    fn close_to_parent(&mut self, child: &str) -> bool {
        let Some(handle) = self.subs.get(child).cloned() else {
            return false;
        };
        handle.close_sub();
        self.flush();
        if let Ok(parent) = self.surface_mut(handle.parent_surface()) {
            parent
                .store
                .set_active_id(Some(handle.trigger_id()), ActiveCause::Keyboard);
        }
        self.owner = Some(handle.parent_surface().to_owned());
        self.settle();
        true
    }

    /// Close `surface_id`, every submenu above it, and the root.
    fn close_chain(&mut self, surface_id: &str) {
        let mut current = surface_id.to_owned();
        while let Some(handle) = self.subs.get(&current).cloned() {
            handle.close_sub();
            current = handle.parent_surface().to_owned();
        }
        self.flush();
        self.set_open(false);
    }

    // --- focus ------------------------------------------------------------

    /// The host mounted a surface's content; move focus into it.
    pub fn surface_mounted(&mut self, surface_id: &str) -> Result<(), MenuError> {
        let s = self.surface_ref(surface_id)?;
        let target = if s.store.state().has_input {
            FocusTarget::Input(surface_id.to_owned())
        } else {
            FocusTarget::List(surface_id.to_owned())
        };
        let host = self.config.focus_host.clone();
        if self.focus.start(host.as_deref(), target) == FocusOutcome::Focused {
            self.complete_focus(surface_id);
        }
        Ok(())
    }

    /// Retry a pending focus move; call once per frame after
    /// [`FocusHost::request_frame`](crate::FocusHost::request_frame).
    pub fn run_frame(&mut self) {
        let host = self.config.focus_host.clone();
        if let Some((target, FocusOutcome::Focused)) = self.focus.frame(host.as_deref()) {
            self.complete_focus(target.surface_id());
        }
    }

    fn complete_focus(&mut self, surface_id: &str) {
        if self.surface_ref(surface_id).is_err() {
            tracing::trace!(message = "focus.stale", surface = surface_id);
            return;
        }
        let handle = self.subs.get(surface_id).cloned();
        let modality = match &handle {
            Some(h) => {
                h.set_focused();
                h.modality()
            }
            None => self.root_modality,
        };
        self.owner = Some(surface_id.to_owned());
        if let Ok(s) = self.surface_mut(surface_id) {
            let has_input = s.store.state().has_input;
            if modality == Modality::Keyboard || (has_input && handle.is_none()) {
                s.store.first(ActiveCause::Keyboard);
            }
        }
        transition!(self.config.debug, message = "sub.focus", surface = surface_id, modality = ?modality);
        self.settle();
    }

    // --- search -----------------------------------------------------------

    /// Current query of an open surface.
    pub fn query(&self, surface_id: &str) -> Option<&str> {
        Some(self.surface_ref(surface_id).ok()?.query.as_str())
    }

    /// Replace a surface's query. The first row becomes active.
    pub fn set_query(&mut self, surface_id: &str, query: &str) -> Result<(), MenuError> {
        let s = self.surface_mut(surface_id)?;
        if s.query == query {
            return Ok(());
        }
        s.query = query.to_owned();
        self.settle();
        if let Ok(s) = self.surface_mut(surface_id) {
            s.store.first(ActiveCause::Keyboard);
        }
        self.settle();
        Ok(())
    }

    fn type_char(&mut self, surface_id: &str, c: char) -> bool {
        let Ok(s) = self.surface_mut(surface_id) else {
            return false;
        };
        if s.input == InputVisibility::Never {
            return false;
        }
        s.store.set_has_input(true);
        let mut query = s.query.clone();
        query.push(c);
        self.set_query(surface_id, &query).is_ok()
    }

    fn backspace(&mut self, surface_id: &str) -> bool {
        let Ok(s) = self.surface_ref(surface_id) else {
            return false;
        };
        let mut query = s.query.clone();
        if query.pop().is_none() {
            return false;
        }
        self.set_query(surface_id, &query).is_ok()
    }

    // --- keyboard ---------------------------------------------------------

    /// Handle a key press on the focused surface. Returns `true` if handled.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        if !self.open {
            return false;
        }
        let Some(command) = command_for(event, &self.config.keyboard) else {
            return false;
        };
        let owner = self.owner.clone().unwrap_or_else(|| self.root_id.clone());
        let page = isize::try_from(self.config.keyboard.page_size).unwrap_or(isize::MAX);
        let handled = match command {
            Command::Next => self.with_store(&owner, |s| s.next(ActiveCause::Keyboard)),
            Command::Prev => self.with_store(&owner, |s| s.prev(ActiveCause::Keyboard)),
            Command::First => self.with_store(&owner, |s| s.first(ActiveCause::Keyboard)),
            Command::Last => self.with_store(&owner, |s| s.last(ActiveCause::Keyboard)),
            Command::PageDown => {
                self.with_store(&owner, |s| s.step_clamped(page, ActiveCause::Keyboard))
            }
            Command::PageUp => {
                self.with_store(&owner, |s| s.step_clamped(-page, ActiveCause::Keyboard))
            }
            Command::OpenSubmenu => match self.active_id(&owner).map(ToOwned::to_owned) {
                Some(active) => self.open_submenu(&owner, &active, Modality::Keyboard),
                None => false,
            },
            Command::CloseSubmenu { by_arrow } => {
                let has_query = self.query(&owner).is_some_and(|q| !q.is_empty());
                if owner == self.root_id || (by_arrow && has_query) {
                    false
                } else {
                    self.close_to_parent(&owner)
                }
            }
            Command::Activate => match self.active_id(&owner).map(ToOwned::to_owned) {
                Some(active) => self
                    .activate(&owner, &active, Modality::Keyboard)
                    .unwrap_or(false),
                None => false,
            },
            Command::Dismiss => {
                if owner == self.root_id {
                    self.set_open(false);
                    true
                } else {
                    self.close_to_parent(&owner)
                }
            }
            Command::Type(c) => self.type_char(&owner, c),
            Command::Backspace => self.backspace(&owner),
        };
        self.settle();
        handled
    }

    fn with_store(&mut self, surface_id: &str, f: impl FnOnce(&mut SurfaceStore) -> bool) -> bool {
        let changed = match self.surface_mut(surface_id) {
            Ok(s) => f(&mut s.store),
            Err(_) => false,
        };
        self.flush();
        changed
    }

    // --- pointer ----------------------------------------------------------

    fn hover_active(&self) -> bool {
        self.open && hover_enabled(self.mode, &self.environment)
    }

    /// Record a pointer move anywhere over the menu.
    pub fn pointer_move(&mut self, position: Point, time: u64) {
        self.aim.pointer_moved(position, time);
        for s in &mut self.surfaces {
            s.hover_blocked = false;
        }
    }

    /// The pointer entered a row. Returns `true` if the row became active.
    ///
    /// Ignored outside hover-capable dropdown mode, while the surface was
    /// just opened by keyboard and the pointer has not moved, and while an
    /// aim guard protects another trigger on the same surface.
    pub fn pointer_enter_row(&mut self, surface_id: &str, row_id: &str, time: u64) -> bool {
        if !self.hover_active() {
            return false;
        }
        let Ok(s) = self.surface_ref(surface_id) else {
            return false;
        };
        let Some(record) = s.store.row(row_id) else {
            return false;
        };
        if s.hover_blocked || record.disabled {
            return false;
        }
        let is_trigger = record.kind == understory_rows::RowKind::Submenu;

        let guard_here = self
            .aim
            .guard()
            .owner(time)
            .is_some_and(|(surface, _)| surface == surface_id);
        if guard_here {
            let key = (surface_id.to_owned(), row_id.to_owned());
            if self.aim.hover(&key, time) == HoverDecision::Suppressed {
                transition!(self.config.debug, message = "aim.suppressed", surface = surface_id, row = row_id);
                return false;
            }
        } else if self.aim.guard().is_active(time) {
            self.aim.reset();
        }

        let changed = self.with_store(surface_id, |st| {
            st.set_active_id(Some(row_id), ActiveCause::Pointer)
        });
        if is_trigger {
            self.open_submenu(surface_id, row_id, Modality::Pointer);
        }
        self.settle();
        changed || is_trigger
    }

    /// The pointer left a row at `position`. Leaving an open submenu's
    /// trigger toward its surface arms the aim guard.
    pub fn pointer_leave_row(&mut self, surface_id: &str, row_id: &str, position: Point, time: u64) {
        if !self.hover_active() {
            return;
        }
        let Some(handle) = self
            .subs
            .values()
            .find(|h| h.parent_surface() == surface_id && h.trigger_id() == row_id && h.is_open())
        else {
            return;
        };
        let (Some(trigger), Some(content)) = (handle.trigger_rect(), handle.content_rect()) else {
            return;
        };
        let armed = self.aim.trigger_left(
            (surface_id.to_owned(), row_id.to_owned()),
            position,
            time,
            trigger,
            content,
        );
        if armed {
            transition!(self.config.debug, message = "aim.guard", surface = surface_id, row = row_id);
        }
    }

    /// Click or tap on a row.
    pub fn click_row(&mut self, surface_id: &str, row_id: &str) -> Result<bool, MenuError> {
        self.activate(surface_id, row_id, Modality::Pointer)
    }

    /// Report a submenu trigger's bounds.
    pub fn set_trigger_rect(&mut self, surface_id: &str, row_id: &str, rect: Rect) {
        if let Some(h) = self
            .subs
            .values()
            .find(|h| h.parent_surface() == surface_id && h.trigger_id() == row_id)
        {
            h.set_trigger_rect(Some(rect));
        }
    }

    /// Report a submenu surface's content bounds.
    pub fn set_content_rect(&mut self, surface_id: &str, rect: Rect) {
        if let Some(h) = self.subs.get(surface_id) {
            h.set_content_rect(Some(rect));
        }
    }

    // --- rows and measurement ---------------------------------------------

    /// Attach or detach a surface's scrollable list element.
    pub fn set_list_element(
        &mut self,
        surface_id: &str,
        list: Option<Rc<dyn ListElement>>,
    ) -> Result<(), MenuError> {
        self.surface_mut(surface_id)?.store.set_list(list);
        Ok(())
    }

    /// Attach or detach a surface's virtualizer.
    pub fn set_virtualizer(
        &mut self,
        surface_id: &str,
        virtualizer: Option<Rc<dyn Virtualizer>>,
    ) -> Result<(), MenuError> {
        self.surface_mut(surface_id)?.store.set_virtualizer(virtualizer);
        Ok(())
    }

    /// Mark a row as having (or no longer having) a mounted element.
    pub fn set_row_mounted(
        &mut self,
        surface_id: &str,
        row_id: &str,
        mounted: bool,
    ) -> Result<(), MenuError> {
        let s = self.surface_mut(surface_id)?;
        let record = s.store.row_mut(row_id).ok_or_else(|| MenuError::UnknownRow {
            surface: surface_id.to_owned(),
            row: row_id.to_owned(),
        })?;
        record.mounted = mounted;
        Ok(())
    }

    /// Measure mounted rows and widen the surface's sticky minimum width.
    ///
    /// All widths are read before the single write, so measuring never
    /// interleaves with layout changes. The width only grows until the
    /// surface closes. Returns the minimum width.
    pub fn measure_row_widths(
        &mut self,
        surface_id: &str,
        mut measure: impl FnMut(&str) -> Option<f64>,
    ) -> Result<Option<f64>, MenuError> {
        let s = self.surface_mut(surface_id)?;
        let widths: Vec<f64> = s
            .store
            .row_ids()
            .filter(|id| s.store.row(id).is_some_and(|r| r.mounted))
            .filter_map(&mut measure)
            .collect();
        if let Some(widest) = widths.into_iter().reduce(f64::max) {
            s.min_width = Some(s.min_width.map_or(widest, |w| w.max(widest)));
        }
        Ok(s.min_width)
    }

    // --- selection --------------------------------------------------------

    /// Open the submenu behind trigger `row_id` on `surface_id`.
    pub fn open_submenu(&mut self, surface_id: &str, row_id: &str, modality: Modality) -> bool {
        let Ok(s) = self.surface_mut(surface_id) else {
            return false;
        };
        let Some(control) = s
            .store
            .row(row_id)
            .filter(|r| !r.disabled)
            .and_then(|r| r.submenu.clone())
        else {
            return false;
        };
        let cause = match modality {
            Modality::Keyboard => ActiveCause::Keyboard,
            Modality::Pointer => ActiveCause::Pointer,
        };
        s.store.set_active_id(Some(row_id), cause);
        if let Some(handle) = self
            .subs
            .values()
            .find(|h| h.parent_surface() == surface_id && h.trigger_id() == row_id)
        {
            handle.set_modality(modality);
        }
        control.open_sub();
        self.settle();
        true
    }

    /// Select a row as Enter or a click would.
    ///
    /// Submenu triggers open their submenu; disabled rows do nothing.
    /// Returns `true` if something happened.
    pub fn select(&mut self, surface_id: &str, row_id: &str) -> Result<bool, MenuError> {
        self.activate(surface_id, row_id, Modality::Pointer)
    }

    fn activate(
        &mut self,
        surface_id: &str,
        row_id: &str,
        modality: Modality,
    ) -> Result<bool, MenuError> {
        let row = self
            .surface_ref(surface_id)?
            .row(row_id)
            .cloned()
            .ok_or_else(|| MenuError::UnknownRow {
                surface: surface_id.to_owned(),
                row: row_id.to_owned(),
            })?;
        if row.disabled {
            return Ok(false);
        }
        match row.kind {
            RowKind::Submenu => Ok(self.open_submenu(surface_id, row_id, modality)),
            RowKind::Create { query } => {
                transition!(self.config.debug, message = "menu.create", surface = surface_id, query = %query);
                self.events.push(MenuEvent::Create {
                    surface_id: surface_id.to_owned(),
                    query,
                });
                self.close_chain(surface_id);
                Ok(true)
            }
            RowKind::Item => match row.node {
                Some(node) => {
                    self.select_item(surface_id, node);
                    Ok(true)
                }
                None => Ok(false),
            },
            RowKind::GroupHeading | RowKind::Separator => Ok(false),
        }
    }

    fn select_item(&mut self, surface_id: &str, key: NodeKey) {
        let checked = self.checked_of(key);
        let node = self.tree.node(key);
        let NodeKind::Item(item) = &node.kind else {
            return;
        };
        let menu = self.tree.menu(node.menu);
        let close = item
            .close_on_select
            .or(menu.defaults.close_on_select)
            .unwrap_or(item.variant == ItemVariant::Button);
        let on_select = item
            .on_select
            .clone()
            .or_else(|| menu.defaults.on_select.clone());
        let select = SelectEvent {
            id: node.id.clone(),
            surface_id: node.surface_id.clone(),
            value: item.value.clone(),
        };

        match item.variant {
            ItemVariant::Button => {}
            ItemVariant::Checkbox => {
                let next = !checked.unwrap_or(false);
                if item.checked.is_none() {
                    self.checked
                        .insert((node.surface_id.clone(), node.id.clone()), next);
                }
                if let Some(cb) = &item.on_checked_change {
                    cb.call(&next);
                }
                self.events.push(MenuEvent::CheckedChange {
                    surface_id: node.surface_id.clone(),
                    id: node.id.clone(),
                    checked: next,
                });
            }
            ItemVariant::Radio => {
                let group = node.group.map(|g| self.tree.node(g));
                if checked != Some(true)
                    && let Some(group) = group
                    && let NodeKind::Group(g) = &group.kind
                {
                    let value = item.value.clone().unwrap_or_else(|| node.id.clone());
                    if g.value.is_none() {
                        self.radio
                            .insert((group.surface_id.clone(), group.id.clone()), value.clone());
                    }
                    if let Some(cb) = &g.on_value_change {
                        cb.call(&value);
                    }
                    self.events.push(MenuEvent::ValueChange {
                        surface_id: group.surface_id.clone(),
                        group: group.id.clone(),
                        value,
                    });
                }
            }
        }

        transition!(
            self.config.debug,
            message = "menu.select",
            surface = surface_id,
            id = %select.id,
            close
        );
        if let Some(cb) = on_select {
            cb.call(&select);
        }
        self.events.push(MenuEvent::Select {
            surface_id: select.surface_id,
            id: select.id,
            value: select.value,
        });
        if close {
            self.close_chain(surface_id);
        } else {
            self.settle();
        }
    }

    pub(crate) fn menu_key(&self, surface_id: &str) -> Option<MenuKey> {
        self.tree.menu_by_surface(surface_id)
    }

    pub(crate) fn config(&self) -> &MenuConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_menu_tree::{ItemDef, NodeDef, SubmenuDef};

    fn def() -> MenuDef {
        MenuDef::new("m")
            .node(NodeDef::item("a", "Alpha"))
            .node(SubmenuDef::new("s", "Sub").nodes([NodeDef::item("x", "X")]))
            .node(ItemDef::new("d", "Delta").disabled(true))
    }

    fn opened() -> ActionMenu {
        let mut menu = ActionMenu::new(def(), MenuConfig::default().default_open(true)).unwrap();
        menu.surface_mounted("m").unwrap();
        menu
    }

    #[test]
    fn starts_open_with_the_input_focused() {
        let menu = opened();
        assert!(menu.is_open());
        assert_eq!(menu.owner(), Some("m"));
        assert_eq!(menu.active_id("m"), Some("a"), "an input surface activates its first row");
        assert_eq!(menu.store("m").unwrap().order(), ["a", "s"]);
    }

    #[test]
    fn surface_paths_map_to_definition_paths() {
        let menu = opened();
        assert_eq!(menu.def_path("m"), Some(vec![]));
        assert_eq!(menu.def_path("m::s::t"), Some(vec!["s", "t"]));
        assert_eq!(menu.def_path("other"), None);
    }

    #[test]
    fn unknown_surfaces_are_errors() {
        let mut menu = opened();
        assert_eq!(
            menu.set_query("nope", "x"),
            Err(MenuError::UnknownSurface("nope".into()))
        );
        assert!(matches!(menu.select("m", "zzz"), Err(MenuError::UnknownRow { .. })));
    }

    #[test]
    fn closing_clears_surfaces_and_handles() {
        let mut menu = opened();
        assert!(menu.open_submenu("m", "s", Modality::Pointer));
        assert_eq!(menu.open_surfaces().count(), 2);
        menu.set_open(false);
        assert_eq!(menu.open_surfaces().count(), 0);
        assert!(menu.sub("m::s").is_none());
        assert_eq!(menu.owner(), None);
        assert_eq!(
            menu.drain_events(),
            [MenuEvent::OpenChange { open: false }]
        );
    }

    #[test]
    fn future_loaders_fail_without_an_adapter() {
        let def = MenuDef::new("m").node(
            SubmenuDef::new("s", "Sub")
                .loader(Loader::from_fn(|_| async { Ok(Vec::new()) })),
        );
        let mut menu = ActionMenu::new(def, MenuConfig::default().default_open(true)).unwrap();
        menu.open_submenu("m", "s", Modality::Pointer);
        let status = menu.surface("m::s").unwrap().status;
        assert!(status.error.is_some());
        assert!(!status.loading);
    }
}
