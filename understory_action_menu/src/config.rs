// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options and the menu factory.

use std::fmt;
use std::rc::Rc;

use understory_aim::AimParams;
use understory_menu_filter::Pipeline;
use understory_menu_loader::LoaderAdapter;
use understory_menu_tree::{Callback, InputVisibility, MenuDef, SlotKind, UiOverrides};

use crate::props::join_classes;
use crate::{ActionMenu, Environment, FocusHost, KeyboardOptions, MenuError, Responsive};

/// Options for one [`ActionMenu`].
#[derive(Clone)]
pub struct MenuConfig {
    /// Root surface id; defaults to the definition's id.
    pub id: Option<String>,
    /// Controlled open state. When set, the menu only reports requested
    /// changes through `on_open_change` and waits for the host to update it.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Called with every requested open state change.
    pub on_open_change: Option<Callback<bool>>,
    /// Modal surfaces trap focus and block the page behind them.
    pub modal: bool,
    /// Mode override or media query.
    pub responsive: Responsive,
    /// Initial environment for the media query.
    pub environment: Environment,
    /// Keyboard behavior.
    pub keyboard: KeyboardOptions,
    /// Default input visibility for surfaces that do not set their own.
    pub input: InputVisibility,
    /// Default input placeholder.
    pub placeholder: Option<String>,
    /// Class names per slot, composed after the factory's.
    pub class_names: UiOverrides,
    /// Search middleware.
    pub pipeline: Pipeline,
    /// Loader adapter; without one only static loaders resolve.
    pub loader_adapter: Option<Rc<dyn LoaderAdapter>>,
    /// Focus hooks; without one focus moves are assumed to succeed.
    pub focus_host: Option<Rc<dyn FocusHost>>,
    /// Aim guard tuning.
    pub aim: AimParams,
    /// Log state transitions at `debug` instead of `trace`.
    pub debug: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            id: None,
            open: None,
            default_open: false,
            on_open_change: None,
            modal: true,
            responsive: Responsive::default(),
            environment: Environment::default(),
            keyboard: KeyboardOptions::default(),
            input: InputVisibility::Always,
            placeholder: None,
            class_names: UiOverrides::default(),
            pipeline: Pipeline::new(),
            loader_adapter: None,
            focus_host: None,
            aim: AimParams::default(),
            debug: false,
        }
    }
}

impl fmt::Debug for MenuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuConfig")
            .field("id", &self.id)
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("modal", &self.modal)
            .field("responsive", &self.responsive)
            .field("environment", &self.environment)
            .field("keyboard", &self.keyboard)
            .field("input", &self.input)
            .field("class_names", &self.class_names)
            .field("pipeline", &self.pipeline)
            .field("loader_adapter", &self.loader_adapter.is_some())
            .field("focus_host", &self.focus_host.is_some())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl MenuConfig {
    /// Set the root surface id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Control the open state.
    #[must_use]
    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    /// Start open (uncontrolled).
    #[must_use]
    pub fn default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    /// Observe open state requests.
    #[must_use]
    pub fn on_open_change(mut self, f: impl Fn(&bool) + 'static) -> Self {
        self.on_open_change = Some(Callback::new(f));
        self
    }

    /// Set modality.
    #[must_use]
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Set the responsive policy.
    #[must_use]
    pub fn responsive(mut self, responsive: Responsive) -> Self {
        self.responsive = responsive;
        self
    }

    /// Set the initial environment.
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set keyboard behavior.
    #[must_use]
    pub fn keyboard(mut self, keyboard: KeyboardOptions) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Set the default input visibility.
    #[must_use]
    pub fn input(mut self, input: InputVisibility) -> Self {
        self.input = input;
        self
    }

    /// Compose a class name for `slot` after any already configured.
    #[must_use]
    pub fn class(mut self, slot: SlotKind, class: &str) -> Self {
        let joined = join_classes([self.class_names.class_for(slot).unwrap_or(""), class]);
        self.class_names = self.class_names.class(slot, joined);
        self
    }

    /// Set the search pipeline.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set the loader adapter.
    #[must_use]
    pub fn loader_adapter(mut self, adapter: Rc<dyn LoaderAdapter>) -> Self {
        self.loader_adapter = Some(adapter);
        self
    }

    /// Set the focus host.
    #[must_use]
    pub fn focus_host(mut self, host: Rc<dyn FocusHost>) -> Self {
        self.focus_host = Some(host);
        self
    }

    /// Set aim guard tuning.
    #[must_use]
    pub fn aim(mut self, aim: AimParams) -> Self {
        self.aim = aim;
        self
    }

    /// Raise transition logging to `debug`.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Defaults shared by every menu a factory builds.
#[derive(Clone, Debug, Default)]
pub struct FactoryDefaults {
    /// Seed configuration; per-menu options are applied on top.
    pub config: MenuConfig,
}

impl FactoryDefaults {
    /// Compose a default class name for `slot`.
    #[must_use]
    pub fn class(mut self, slot: SlotKind, class: &str) -> Self {
        self.config = self.config.class(slot, class);
        self
    }

    /// Default keyboard behavior.
    #[must_use]
    pub fn keyboard(mut self, keyboard: KeyboardOptions) -> Self {
        self.config.keyboard = keyboard;
        self
    }

    /// Default responsive policy.
    #[must_use]
    pub fn responsive(mut self, responsive: Responsive) -> Self {
        self.config.responsive = responsive;
        self
    }

    /// Default input visibility.
    #[must_use]
    pub fn input(mut self, input: InputVisibility) -> Self {
        self.config.input = input;
        self
    }

    /// Default loader adapter.
    #[must_use]
    pub fn loader_adapter(mut self, adapter: Rc<dyn LoaderAdapter>) -> Self {
        self.config.loader_adapter = Some(adapter);
        self
    }

    /// Default search pipeline.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.config.pipeline = pipeline;
        self
    }
}

/// Builds menus that share [`FactoryDefaults`].
#[derive(Clone, Debug)]
pub struct ActionMenuFactory {
    defaults: FactoryDefaults,
}

/// Create a factory from shared defaults.
pub fn create_action_menu(defaults: FactoryDefaults) -> ActionMenuFactory {
    ActionMenuFactory { defaults }
}

impl ActionMenuFactory {
    /// A configuration seeded with the factory defaults.
    pub fn config(&self) -> MenuConfig {
        self.defaults.config.clone()
    }

    /// Build a menu with the factory defaults.
    pub fn build(&self, def: MenuDef) -> Result<ActionMenu, MenuError> {
        ActionMenu::new(def, self.config())
    }

    /// Build a menu, adjusting the seeded configuration first.
    pub fn build_with(
        &self,
        def: MenuDef,
        configure: impl FnOnce(MenuConfig) -> MenuConfig,
    ) -> Result<ActionMenu, MenuError> {
        ActionMenu::new(def, configure(self.config()))
    }
}
