// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bind props for slots, and routing element events back into the menu.

use understory_menu_filter::RowKind;
use understory_menu_tree::{InputVisibility, ItemVariant, NodeKind, SlotKind};

use crate::props::{BindTarget, ElementRef, Outcome, PropEvent, Props, join_classes};
use crate::surface::{Surface, list_id, row_element_id};
use crate::{ActionMenu, Command, MenuError, PresentationMode, SubState, command_for};

impl ActionMenu {
    fn slot_class(&self, surface: &Surface, slot: SlotKind) -> String {
        join_classes([
            self.config().class_names.class_for(slot).unwrap_or(""),
            surface.ui.class_for(slot).unwrap_or(""),
        ])
    }

    /// Props for a slot without core behavior (`Header`, `Footer`, `Empty`,
    /// `Loading`, `Error`, `Separator`).
    pub fn get_slot_props(
        &self,
        surface_id: &str,
        slot: SlotKind,
        overrides: Props,
    ) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        let mut props = Props::new().class(&self.slot_class(s, slot));
        if slot == SlotKind::Separator {
            props = props.role("separator");
        }
        Ok(props.merge(overrides))
    }

    /// Props for a row.
    pub fn get_row_props(
        &self,
        surface_id: &str,
        row_id: &str,
        overrides: Props,
    ) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        let row = s.row(row_id).ok_or_else(|| MenuError::UnknownRow {
            surface: surface_id.to_owned(),
            row: row_id.to_owned(),
        })?;
        match row.kind {
            RowKind::GroupHeading => return self.get_group_heading_props(surface_id, row_id, overrides),
            RowKind::Separator => return self.get_slot_props(surface_id, SlotKind::Separator, overrides),
            RowKind::Item | RowKind::Submenu | RowKind::Create { .. } => {}
        }

        let slot = if row.kind == RowKind::Submenu {
            SlotKind::SubmenuTrigger
        } else {
            SlotKind::Item
        };
        let mut props = Props::bound(BindTarget::Row {
            surface: surface_id.to_owned(),
            row: row_id.to_owned(),
        })
        .id(row_element_id(surface_id, row_id))
        .class(&self.slot_class(s, slot));

        let tree = self.tree();
        let variant = row.node.map(|n| &tree.node(n).kind);
        props = props.role(match variant {
            Some(NodeKind::Item(item)) if item.variant == ItemVariant::Checkbox => "menuitemcheckbox",
            Some(NodeKind::Item(item)) if item.variant == ItemVariant::Radio => "menuitemradio",
            _ => "menuitem",
        });
        if row.kind == RowKind::Submenu
            && let Some(child) = row.node.and_then(|n| tree.submenu_child(n))
        {
            let child = &tree.menu(child).surface_id;
            let expanded = self.sub_state(child) != SubState::Closed;
            props = props
                .attr("aria-haspopup", "menu")
                .attr("aria-expanded", if expanded { "true" } else { "false" })
                .attr("aria-controls", list_id(child));
        }
        if s.store.active_id() == Some(row_id) {
            props = props.attr("data-active", "true");
        }
        if row.disabled {
            props = props
                .attr("aria-disabled", "true")
                .attr("data-disabled", "true");
        }
        if let Some(checked) = row.node.and_then(|n| self.checked_of(n)) {
            props = props.attr("aria-checked", if checked { "true" } else { "false" });
        }
        if matches!(row.kind, RowKind::Create { .. }) {
            props = props.attr("data-create", "true");
        }
        Ok(props.merge(overrides))
    }

    /// Props for a surface's search input.
    pub fn get_input_props(&self, surface_id: &str, overrides: Props) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        let mut props = Props::bound(BindTarget::Input(surface_id.to_owned()))
            .id(format!("{surface_id}-input"))
            .role("combobox")
            .class(&self.slot_class(s, SlotKind::Input))
            .attr("aria-controls", list_id(surface_id))
            .attr("aria-expanded", "true")
            .attr("aria-autocomplete", "list")
            .attr("value", s.query.clone());
        if let Some(active) = s.store.active_id() {
            props = props.attr("aria-activedescendant", row_element_id(surface_id, active));
        }
        if let Some(placeholder) = &s.placeholder {
            props = props.attr("placeholder", placeholder.clone());
        }
        if !s.store.state().has_input {
            props = props.attr("hidden", "true");
        }
        Ok(props.merge(overrides))
    }

    /// Props for a surface's list.
    pub fn get_list_props(&self, surface_id: &str, overrides: Props) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        let has_input = s.store.state().has_input;
        let mut props = Props::bound(BindTarget::List(surface_id.to_owned()))
            .id(list_id(surface_id))
            .role(if has_input { "listbox" } else { "menu" })
            .class(&self.slot_class(s, SlotKind::List));
        if !has_input && let Some(active) = s.store.active_id() {
            props = props.attr("aria-activedescendant", row_element_id(surface_id, active));
        }
        Ok(props.merge(overrides))
    }

    /// Props for a surface's content container.
    pub fn get_content_props(&self, surface_id: &str, overrides: Props) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        let mode = self.mode();
        let mut props = Props::bound(BindTarget::Content(surface_id.to_owned()))
            .id(format!("{surface_id}-content"))
            .role(match mode {
                PresentationMode::Drawer => "dialog",
                PresentationMode::Dropdown => "presentation",
            })
            .class(&self.slot_class(s, SlotKind::Content))
            .attr("data-mode", mode.as_str())
            .attr("data-depth", s.depth.to_string());
        if self.config().modal {
            props = props.attr("aria-modal", "true");
        }
        if let Some(width) = s.min_width {
            props = props.attr("style", format!("min-width: {width}px"));
        }
        Ok(props.merge(overrides))
    }

    /// Props for a group heading row.
    pub fn get_group_heading_props(
        &self,
        surface_id: &str,
        row_id: &str,
        overrides: Props,
    ) -> Result<Props, MenuError> {
        let s = self.surface_ref(surface_id)?;
        if s.row(row_id).is_none() {
            return Err(MenuError::UnknownRow {
                surface: surface_id.to_owned(),
                row: row_id.to_owned(),
            });
        }
        let props = Props::bound(BindTarget::GroupHeading {
            surface: surface_id.to_owned(),
            row: row_id.to_owned(),
        })
        .id(row_element_id(surface_id, row_id))
        .role("presentation")
        .class(&self.slot_class(s, SlotKind::GroupHeading));
        Ok(props.merge(overrides))
    }

    /// Route an element event: caller handlers first, then the core behavior
    /// for the props' target unless a handler stopped it.
    ///
    /// Returns `true` if the core handled the event.
    pub fn dispatch(&mut self, props: &Props, event: &PropEvent) -> bool {
        if props.run_handlers(event) == Outcome::Stop {
            return false;
        }
        let Some(target) = props.target().cloned() else {
            return false;
        };
        match (target, event) {
            (_, PropEvent::PointerMove { position, time }) => {
                self.pointer_move(*position, *time);
                true
            }
            (BindTarget::Row { surface, row }, PropEvent::PointerEnter { time, .. }) => {
                self.pointer_enter_row(&surface, &row, *time)
            }
            (BindTarget::Row { surface, row }, PropEvent::PointerLeave { position, time }) => {
                self.pointer_leave_row(&surface, &row, *position, *time);
                true
            }
            (BindTarget::Row { surface, row }, PropEvent::Click) => {
                self.click_row(&surface, &row).unwrap_or(false)
            }
            (BindTarget::Input(surface), PropEvent::Input(text)) => {
                let filters = self
                    .surface_ref(&surface)
                    .is_ok_and(|s| s.input != InputVisibility::Never);
                if !filters {
                    return false;
                }
                if let Ok(s) = self.store_mut(&surface) {
                    s.set_has_input(true);
                }
                self.set_query(&surface, text).is_ok()
            }
            (BindTarget::Input(_), PropEvent::KeyDown(key)) => {
                // Text editing belongs to the input element itself.
                match command_for(key, &self.config().keyboard) {
                    Some(Command::Type(_) | Command::Backspace) | None => false,
                    Some(_) => self.key_down(key),
                }
            }
            (BindTarget::List(_) | BindTarget::Content(_), PropEvent::KeyDown(key)) => {
                self.key_down(key)
            }
            _ => false,
        }
    }

    /// Attach (`Some`) or detach (`None`) the element for `props`.
    ///
    /// Caller ref callbacks run first. Rows track whether they are mounted;
    /// mounting a content container moves focus into its surface.
    pub fn bind_ref(&mut self, props: &Props, element: Option<ElementRef>) {
        props.call_refs(element.as_ref());
        match props.target() {
            Some(BindTarget::Row { surface, row }) => {
                let _ = self.set_row_mounted(surface, row, element.is_some());
            }
            Some(BindTarget::Content(surface)) if element.is_some() => {
                let _ = self.surface_mounted(surface);
            }
            _ => {}
        }
    }
}
