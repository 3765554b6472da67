// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// A malformed menu definition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A node has an empty id.
    #[error("node with empty id on surface `{surface}`")]
    EmptyId {
        /// Surface the node belongs to.
        surface: String,
    },

    /// A node id contains the surface path separator.
    #[error("node id `{id}` on surface `{surface}` contains the `::` path separator")]
    InvalidId {
        /// Surface the node belongs to.
        surface: String,
        /// The offending id.
        id: String,
    },

    /// Two nodes on one surface share an id.
    #[error("duplicate node id `{id}` on surface `{surface}`")]
    DuplicateId {
        /// Surface both nodes belong to.
        surface: String,
        /// The repeated id.
        id: String,
    },

    /// A radio item is not enclosed by a radio group.
    #[error("radio item `{id}` on surface `{surface}` is not inside a radio group")]
    RadioOutsideGroup {
        /// Surface the item belongs to.
        surface: String,
        /// The item id.
        id: String,
    },
}
