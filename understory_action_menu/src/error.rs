// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_menu_tree::DefinitionError;

/// Errors returned by [`ActionMenu`](crate::ActionMenu).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// The menu definition is invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// No open surface has this id.
    #[error("no open surface `{0}`")]
    UnknownSurface(String),
    /// The surface has no row with this id.
    #[error("surface `{surface}` has no row `{row}`")]
    UnknownRow {
        /// Surface id.
        surface: String,
        /// Row id.
        row: String,
    },
}
