// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus handoff to newly mounted surfaces.
//!
//! Moving focus into a surface can race its mount: the host may not have an
//! element to focus yet. [`FocusRetry`] makes a bounded number of attempts,
//! one per frame, and then gives up without reporting an error.

use understory_menu_tree::PATH_SEPARATOR;

/// The element a surface wants focused.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// The surface's search input.
    Input(String),
    /// The surface's list, for surfaces without a visible input.
    List(String),
}

impl FocusTarget {
    /// The surface this target belongs to.
    pub fn surface_id(&self) -> &str {
        match self {
            Self::Input(s) | Self::List(s) => s,
        }
    }
}

/// Host hooks for moving focus and scheduling frames.
pub trait FocusHost {
    /// Try to focus `target`. Returns `false` if it is not mounted yet.
    fn focus(&self, target: &FocusTarget) -> bool;

    /// Ask for [`ActionMenu::run_frame`](crate::ActionMenu::run_frame) to be
    /// called on the next frame.
    fn request_frame(&self) {}
}

/// Attempts made before a focus request is abandoned.
pub const MAX_FOCUS_ATTEMPTS: u8 = 3;

/// Outcome of a focus attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The target took focus.
    Focused,
    /// Not mounted yet; another attempt is scheduled.
    Retrying,
    /// Out of attempts.
    Abandoned,
}

/// A pending focus request.
#[derive(Clone, Debug, Default)]
pub struct FocusRetry {
    pending: Option<(FocusTarget, u8)>,
}

impl FocusRetry {
    /// The target still waiting for focus, if any.
    pub fn pending(&self) -> Option<&FocusTarget> {
        self.pending.as_ref().map(|(t, _)| t)
    }

    /// Drop any pending request.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Drop the pending request if it targets `surface_id` or a surface
    /// nested below it.
    pub fn cancel_surface(&mut self, surface_id: &str) {
        let nested = |id: &str| {
            id.strip_prefix(surface_id)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(PATH_SEPARATOR))
        };
        if self
            .pending
            .as_ref()
            .is_some_and(|(t, _)| nested(t.surface_id()))
        {
            self.pending = None;
        }
    }

    /// Make the first attempt for `target`, replacing any pending request.
    pub fn start(&mut self, host: Option<&dyn FocusHost>, target: FocusTarget) -> FocusOutcome {
        self.pending = Some((target, 0));
        self.attempt(host)
    }

    /// Retry the pending request, if any.
    pub fn frame(&mut self, host: Option<&dyn FocusHost>) -> Option<(FocusTarget, FocusOutcome)> {
        let target = self.pending()?.clone();
        Some((target, self.attempt(host)))
    }

    fn attempt(&mut self, host: Option<&dyn FocusHost>) -> FocusOutcome {
        let Some((target, attempts)) = self.pending.as_mut() else {
            return FocusOutcome::Abandoned;
        };
        *attempts += 1;
        let focused = host.is_none_or(|h| h.focus(target));
        if focused {
            self.pending = None;
            return FocusOutcome::Focused;
        }
        if *attempts >= MAX_FOCUS_ATTEMPTS {
            tracing::trace!(message = "focus.abandon", target = ?target, attempts = *attempts);
            self.pending = None;
            return FocusOutcome::Abandoned;
        }
        tracing::trace!(message = "focus.retry", target = ?target, attempts = *attempts);
        if let Some(host) = host {
            host.request_frame();
        }
        FocusOutcome::Retrying
    }
}
