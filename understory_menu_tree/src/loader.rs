// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loader values attached to submenus.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::NodeDef;

/// Failure reported by a loader.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    /// Human-readable description.
    pub message: String,
}

impl LoadError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What a loader produces.
pub type LoadResult = Result<Vec<NodeDef>, LoadError>;

/// Context handed to a loader invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LoaderContext {
    /// The active search query (empty when browsing).
    pub query: String,
    /// Surface id of the submenu being loaded.
    pub surface_id: String,
}

/// A loader factory returning a fresh future per invocation.
pub type LoaderFn = Rc<dyn Fn(&LoaderContext) -> LocalBoxFuture<'static, LoadResult>>;

/// Source of a submenu's nodes.
///
/// A future can only be awaited once, so asynchronous loaders are factories:
/// reopening a submenu or changing the query invokes the factory again.
#[derive(Clone)]
pub enum Loader {
    /// Nodes available synchronously.
    Static(Vec<NodeDef>),
    /// An asynchronous loader.
    Future(LoaderFn),
    /// An adapter-specific handle (for example a query key understood by a
    /// caching adapter). Adapters downcast it.
    Handle(Rc<dyn Any>),
}

impl Loader {
    /// Build an asynchronous loader from a closure returning a future.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(&LoaderContext) -> Fut + 'static,
        Fut: Future<Output = LoadResult> + 'static,
    {
        Self::Future(Rc::new(move |ctx| f(ctx).boxed_local()))
    }

    /// Wrap an adapter-specific handle.
    pub fn handle<T: Any>(handle: T) -> Self {
        Self::Handle(Rc::new(handle))
    }

    /// Downcast an adapter-specific handle.
    pub fn downcast_handle<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Handle(h) => (**h).downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(nodes) => f.debug_tuple("Static").field(&nodes.len()).finish(),
            Self::Future(_) => f.write_str("Future(..)"),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}
