// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless render walk.

use understory_menu_filter::{Row, RowKind};
use understory_menu_tree::{LoadError, SlotKind};

use crate::{ActionMenu, Props, SubState, SurfaceView};

/// A row as handed to a renderer.
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    /// The row.
    pub row: &'a Row,
    /// Whether it is the surface's active row.
    pub active: bool,
    /// Checked state for checkbox and radio rows.
    pub checked: Option<bool>,
    /// For submenu triggers, whether the submenu is open.
    pub open: bool,
}

/// Receives every slot of every open surface, in document order.
///
/// All methods default to doing nothing, so renderers implement only the
/// slots they draw.
pub trait SlotRenderer {
    /// The surface container. Called first for each surface.
    fn content(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// Content above the input.
    fn header(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// The search input; only called while the surface shows it.
    fn input(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// The list container, before its rows.
    fn list(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// An item or create row.
    fn item(&mut self, _surface: &SurfaceView<'_>, _row: &RowView<'_>, _props: &Props) {}
    /// A submenu trigger row.
    fn submenu_trigger(&mut self, _surface: &SurfaceView<'_>, _row: &RowView<'_>, _props: &Props) {}
    /// A group heading row.
    fn group_heading(&mut self, _surface: &SurfaceView<'_>, _row: &RowView<'_>, _props: &Props) {}
    /// A separator row.
    fn separator(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// Rows are still arriving.
    fn loading(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// The surface's loader failed.
    fn error(&mut self, _surface: &SurfaceView<'_>, _error: &LoadError, _props: &Props) {}
    /// Nothing to show.
    fn empty(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
    /// Content below the list.
    fn footer(&mut self, _surface: &SurfaceView<'_>, _props: &Props) {}
}

impl ActionMenu {
    /// Walk every open surface, parents first, handing merged props to `renderer`.
    pub fn render<R: SlotRenderer + ?Sized>(&self, renderer: &mut R) {
        for surface in self.surfaces() {
            let Ok(view) = self.surface(&surface.id) else {
                continue;
            };
            let id = view.id;
            let slot = |kind| self.get_slot_props(id, kind, Props::new()).unwrap_or_default();

            if let Ok(p) = self.get_content_props(id, Props::new()) {
                renderer.content(&view, &p);
            }
            renderer.header(&view, &slot(SlotKind::Header));
            if view.has_input
                && let Ok(p) = self.get_input_props(id, Props::new())
            {
                renderer.input(&view, &p);
            }
            if let Ok(p) = self.get_list_props(id, Props::new()) {
                renderer.list(&view, &p);
            }

            for row in view.rows {
                let Ok(props) = self.get_row_props(id, &row.id, Props::new()) else {
                    continue;
                };
                let open = row
                    .node
                    .and_then(|n| self.tree().submenu_child(n))
                    .is_some_and(|m| {
                        self.sub_state(&self.tree().menu(m).surface_id) != SubState::Closed
                    });
                let rv = RowView {
                    row,
                    active: view.active_id == Some(row.id.as_str()),
                    checked: row.node.and_then(|n| self.checked_of(n)),
                    open,
                };
                match row.kind {
                    RowKind::Item | RowKind::Create { .. } => renderer.item(&view, &rv, &props),
                    RowKind::Submenu => renderer.submenu_trigger(&view, &rv, &props),
                    RowKind::GroupHeading => renderer.group_heading(&view, &rv, &props),
                    RowKind::Separator => renderer.separator(&view, &props),
                }
            }

            if view.status.loading {
                renderer.loading(&view, &slot(SlotKind::Loading));
            }
            if let Some(error) = &view.status.error {
                renderer.error(&view, error, &slot(SlotKind::Error));
            }
            if view.status.empty {
                renderer.empty(&view, &slot(SlotKind::Empty));
            }
            renderer.footer(&view, &slot(SlotKind::Footer));
        }
    }
}
