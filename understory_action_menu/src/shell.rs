// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation mode resolution.

/// How surfaces are presented.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresentationMode {
    /// Anchored popovers; submenus open as nested popovers and follow hover.
    #[default]
    Dropdown,
    /// Bottom or top sheets; submenus open as nested drawers on tap only.
    Drawer,
}

impl PresentationMode {
    /// Lowercase name, as exposed in bind props.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dropdown => "dropdown",
            Self::Drawer => "drawer",
        }
    }
}

/// Primary pointer precision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Mouse, trackpad, or pen.
    #[default]
    Fine,
    /// Touch.
    Coarse,
}

/// What the host reports about the display.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Environment {
    /// Primary pointer precision.
    pub pointer: PointerKind,
    /// Viewport width in logical pixels.
    pub viewport_width: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            pointer: PointerKind::Fine,
            viewport_width: 1024.0,
        }
    }
}

/// The media query selecting [`PresentationMode::Drawer`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MediaQuery {
    /// Coarse pointers select the drawer.
    pub coarse_pointer: bool,
    /// Viewports strictly narrower than this select the drawer.
    pub max_width: f64,
}

impl Default for MediaQuery {
    fn default() -> Self {
        Self {
            coarse_pointer: true,
            max_width: 640.0,
        }
    }
}

impl MediaQuery {
    /// Whether `env` matches.
    pub fn matches(&self, env: &Environment) -> bool {
        (self.coarse_pointer && env.pointer == PointerKind::Coarse)
            || env.viewport_width < self.max_width
    }
}

/// Explicit mode override, or a media query.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Responsive {
    /// Forces a mode when set.
    pub mode: Option<PresentationMode>,
    /// Consulted when no mode is forced.
    pub query: MediaQuery,
}

impl Responsive {
    /// Always present as `mode`.
    pub fn fixed(mode: PresentationMode) -> Self {
        Self {
            mode: Some(mode),
            query: MediaQuery::default(),
        }
    }

    /// Resolve the mode for `env`.
    pub fn resolve(&self, env: &Environment) -> PresentationMode {
        match self.mode {
            Some(mode) => mode,
            None if self.query.matches(env) => PresentationMode::Drawer,
            None => PresentationMode::Dropdown,
        }
    }
}

/// Whether hover and aim guarding apply.
pub fn hover_enabled(mode: PresentationMode, env: &Environment) -> bool {
    mode == PresentationMode::Dropdown && env.pointer == PointerKind::Fine
}
