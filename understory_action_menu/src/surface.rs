// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-surface state.

use understory_menu_filter::Row;
use understory_menu_loader::LoaderState;
use understory_menu_tree::{InputVisibility, LoadError, UiOverrides};
use understory_rows::SurfaceStore;

use crate::PresentationMode;

/// Data-loading status of a surface, for the `Loading`, `Error`, and `Empty` slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStatus {
    /// Rows are still arriving. Rows already present may be shown alongside.
    pub loading: bool,
    /// Cached rows are being revalidated.
    pub fetching: bool,
    /// The surface's own loader failed.
    pub error: Option<LoadError>,
    /// Nothing to show and nothing pending.
    pub empty: bool,
}

/// A read-only view of an open surface.
#[derive(Clone, Debug)]
pub struct SurfaceView<'a> {
    /// Surface id.
    pub id: &'a str,
    /// Nesting depth; the root is 0.
    pub depth: u32,
    /// Presentation mode.
    pub mode: PresentationMode,
    /// Current query.
    pub query: &'a str,
    /// Rows in display order.
    pub rows: &'a [Row],
    /// Active row id.
    pub active_id: Option<&'a str>,
    /// Whether the input is shown.
    pub has_input: bool,
    /// Input placeholder.
    pub placeholder: Option<&'a str>,
    /// Loading status.
    pub status: SurfaceStatus,
    /// Sticky minimum width from the last measurement.
    pub min_width: Option<f64>,
}

#[derive(Debug)]
pub(crate) struct Surface {
    pub(crate) id: String,
    pub(crate) depth: u32,
    pub(crate) store: SurfaceStore,
    pub(crate) query: String,
    pub(crate) rows: Vec<Row>,
    pub(crate) input: InputVisibility,
    pub(crate) placeholder: Option<String>,
    pub(crate) ui: UiOverrides,
    pub(crate) load: Option<LoaderState>,
    pub(crate) min_width: Option<f64>,
    /// Opened by keyboard; hover is ignored until the pointer moves.
    pub(crate) hover_blocked: bool,
}

impl Surface {
    pub(crate) fn new(id: String, depth: u32, input: InputVisibility) -> Self {
        let mut store = SurfaceStore::new(list_id(&id));
        store.set_has_input(input == InputVisibility::Always);
        Self {
            id,
            depth,
            store,
            query: String::new(),
            rows: Vec::new(),
            input,
            placeholder: None,
            ui: UiOverrides::default(),
            load: None,
            min_width: None,
            hover_blocked: false,
        }
    }

    pub(crate) fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Loading status, folding in deep-search state for the root surface.
    pub(crate) fn status(&self, deep_loading: bool, deep_fetching: bool) -> SurfaceStatus {
        let (mut loading, mut fetching, error) = match &self.load {
            Some(st) => (st.is_loading, st.is_fetching, st.error.clone()),
            None => (false, false, None),
        };
        loading |= deep_loading;
        fetching |= deep_fetching;
        let empty = !loading && error.is_none() && !self.rows.iter().any(Row::is_navigable);
        SurfaceStatus {
            loading,
            fetching,
            error,
            empty,
        }
    }
}

/// Element id of a surface's list.
pub(crate) fn list_id(surface_id: &str) -> String {
    format!("{surface_id}-list")
}

/// Element id of a row, referenced by `aria-activedescendant`.
pub(crate) fn row_element_id(surface_id: &str, row_id: &str) -> String {
    format!("{surface_id}-row-{row_id}")
}
