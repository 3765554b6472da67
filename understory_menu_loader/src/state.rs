// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use understory_menu_tree::{LoadError, LoadResult, Loader, LoaderContext, NodeDef};

/// Callback invoked when a pending load settles.
pub type Notify = Rc<dyn Fn()>;

/// The observable state of one load.
#[derive(Clone, Debug, Default)]
pub struct LoaderState {
    /// Resolved nodes, if any (possibly stale while revalidating).
    pub data: Option<Vec<NodeDef>>,
    /// No data yet and a fetch is in flight.
    pub is_loading: bool,
    /// A fetch is in flight, with or without data.
    pub is_fetching: bool,
    /// The last fetch failed.
    pub is_error: bool,
    /// The last failure.
    pub error: Option<LoadError>,
}

impl LoaderState {
    /// First fetch in flight.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_fetching: true,
            ..Self::default()
        }
    }

    /// Settled with data.
    pub fn ready(data: Vec<NodeDef>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Settled with an error.
    pub fn failed(error: LoadError) -> Self {
        Self {
            is_error: true,
            error: Some(error),
            ..Self::default()
        }
    }

    /// State for a finished [`LoadResult`].
    pub fn settled(result: LoadResult) -> Self {
        match result {
            Ok(data) => Self::ready(data),
            Err(e) => Self::failed(e),
        }
    }

    /// Returns `true` once a fetch finished and nothing is in flight.
    pub fn is_settled(&self) -> bool {
        !self.is_fetching && (self.data.is_some() || self.is_error)
    }
}

/// Turns loader values into [`LoaderState`].
///
/// Adapters are polled: the host calls [`LoaderAdapter::load`] whenever it
/// renders, and the adapter starts work on the first call for a context and
/// reports progress on later ones. When pending work settles the adapter
/// invokes the notify callback so the host knows to render again.
pub trait LoaderAdapter {
    /// Current state of `loader` for `cx`, starting it if needed.
    fn load(&self, cx: &LoaderContext, loader: &Loader) -> LoaderState;

    /// The host no longer needs `cx`.
    fn release(&self, cx: &LoaderContext);

    /// Install the settle callback.
    fn set_notify(&self, notify: Notify);
}
