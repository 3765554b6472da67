// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative, serializable menu definitions.

use serde::{Deserialize, Serialize};

use crate::{Callback, InputVisibility, Loader, UiOverrides};

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_true(b: &bool) -> bool {
    *b
}

fn default_true() -> bool {
    true
}

/// Payload passed to selection handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectEvent {
    /// Id of the selected node.
    pub id: String,
    /// Surface the node was selected on.
    pub surface_id: String,
    /// The node's value (radio items), if any.
    pub value: Option<String>,
}

/// Fallback behavior for items on one menu surface.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDefaults {
    /// Whether selecting an item closes the menu, unless the item says otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_on_select: Option<bool>,
    /// Selection handler for items without their own.
    #[serde(skip)]
    pub on_select: Option<Callback<SelectEvent>>,
}

/// Root of a menu definition, and the shape shared by submenu children.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDef {
    /// Menu id.
    pub id: String,
    /// Top-level nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeDef>,
    /// Item-level fallbacks.
    #[serde(default)]
    pub defaults: MenuDefaults,
    /// Presentation overrides.
    #[serde(default)]
    pub ui: UiOverrides,
    /// Search input visibility; `None` defers to the host configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputVisibility>,
    /// Placeholder text for the search input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl MenuDef {
    /// An empty menu.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Append a node.
    #[must_use]
    pub fn node(mut self, node: impl Into<NodeDef>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Append several nodes.
    #[must_use]
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeDef>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Set item-level fallbacks.
    #[must_use]
    pub fn defaults(mut self, defaults: MenuDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set presentation overrides.
    #[must_use]
    pub fn ui(mut self, ui: UiOverrides) -> Self {
        self.ui = ui;
        self
    }

    /// Set search input visibility.
    #[must_use]
    pub fn input(mut self, input: InputVisibility) -> Self {
        self.input = Some(input);
        self
    }

    /// Find the submenu reached by following `path` (submenu ids from the root).
    pub fn submenu(&self, path: &[&str]) -> Option<&SubmenuDef> {
        let (first, rest) = path.split_first()?;
        let mut cur = find_submenu(&self.nodes, first)?;
        for id in rest {
            cur = find_submenu(&cur.nodes, id)?;
        }
        Some(cur)
    }

    /// Mutable variant of [`MenuDef::submenu`].
    pub fn submenu_mut(&mut self, path: &[&str]) -> Option<&mut SubmenuDef> {
        let (first, rest) = path.split_first()?;
        let mut cur = find_submenu_mut(&mut self.nodes, first)?;
        for id in rest {
            cur = find_submenu_mut(&mut cur.nodes, id)?;
        }
        Some(cur)
    }
}

fn find_submenu<'a>(nodes: &'a [NodeDef], id: &str) -> Option<&'a SubmenuDef> {
    nodes.iter().find_map(|n| match n {
        NodeDef::Submenu(s) if s.id == id => Some(s),
        NodeDef::Group(g) => find_submenu(&g.nodes, id),
        _ => None,
    })
}

fn find_submenu_mut<'a>(nodes: &'a mut [NodeDef], id: &str) -> Option<&'a mut SubmenuDef> {
    nodes.iter_mut().find_map(|n| match n {
        NodeDef::Submenu(s) if s.id == id => Some(s),
        NodeDef::Group(g) => find_submenu_mut(&mut g.nodes, id),
        _ => None,
    })
}

/// One node of a menu definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeDef {
    /// A selectable item.
    Item(ItemDef),
    /// A labeled (optionally radio) grouping of nodes on the same surface.
    Group(GroupDef),
    /// A trigger opening a nested surface.
    Submenu(SubmenuDef),
}

impl NodeDef {
    /// A button item.
    pub fn item(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Item(ItemDef::new(id, label))
    }

    /// A group of nodes.
    pub fn group(
        id: impl Into<String>,
        label: impl Into<String>,
        nodes: impl IntoIterator<Item = Self>,
    ) -> Self {
        Self::Group(GroupDef::new(id).label(label).nodes(nodes))
    }

    /// A submenu with static nodes.
    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        nodes: impl IntoIterator<Item = Self>,
    ) -> Self {
        Self::Submenu(SubmenuDef::new(id, label).nodes(nodes))
    }

    /// The node id.
    pub fn id(&self) -> &str {
        match self {
            Self::Item(d) => &d.id,
            Self::Group(d) => &d.id,
            Self::Submenu(d) => &d.id,
        }
    }

    /// The node label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Item(d) => d.label.as_deref(),
            Self::Group(d) => d.label.as_deref(),
            Self::Submenu(d) => d.label.as_deref(),
        }
    }

    /// Child definitions (group members or static submenu nodes).
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Item(_) => &[],
            Self::Group(d) => &d.nodes,
            Self::Submenu(d) => &d.nodes,
        }
    }
}

impl From<ItemDef> for NodeDef {
    fn from(d: ItemDef) -> Self {
        Self::Item(d)
    }
}

impl From<GroupDef> for NodeDef {
    fn from(d: GroupDef) -> Self {
        Self::Group(d)
    }
}

impl From<SubmenuDef> for NodeDef {
    fn from(d: SubmenuDef) -> Self {
        Self::Submenu(d)
    }
}

/// Item behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemVariant {
    /// Runs its handler; closes the menu by default.
    #[default]
    Button,
    /// Toggles `checked`; stays open by default.
    Checkbox,
    /// One value of a radio group; stays open by default.
    Radio,
}

/// Definition of an item.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    /// Id, unique on its surface.
    pub id: String,
    /// Display label; also the primary search text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Icon name, interpreted by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Search aliases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Disabled items are not focusable or selectable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Hidden items are not rendered or searched.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Behavior; defaults to [`ItemVariant::Button`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ItemVariant>,
    /// Checked state for checkbox items; `None` leaves it to the menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Radio value; defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Overrides whether selecting this item closes the menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_on_select: Option<bool>,
    /// Selection handler.
    #[serde(skip)]
    pub on_select: Option<Callback<SelectEvent>>,
    /// Checkbox change handler.
    #[serde(skip)]
    pub on_checked_change: Option<Callback<bool>>,
}

impl ItemDef {
    /// A button item.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// A checkbox item.
    pub fn checkbox(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label).variant(ItemVariant::Checkbox)
    }

    /// A radio item.
    pub fn radio(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label).variant(ItemVariant::Radio)
    }

    /// Set the variant.
    #[must_use]
    pub fn variant(mut self, variant: ItemVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Set search aliases.
    #[must_use]
    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the hidden flag.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the controlled checked state.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Set the radio value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Override close-on-select.
    #[must_use]
    pub fn close_on_select(mut self, close: bool) -> Self {
        self.close_on_select = Some(close);
        self
    }

    /// Set the selection handler.
    #[must_use]
    pub fn on_select(mut self, f: impl Fn(&SelectEvent) + 'static) -> Self {
        self.on_select = Some(Callback::new(f));
        self
    }

    /// Set the checkbox change handler.
    #[must_use]
    pub fn on_checked_change(mut self, f: impl Fn(&bool) + 'static) -> Self {
        self.on_checked_change = Some(Callback::new(f));
        self
    }
}

/// Group behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupVariant {
    /// Child items form one mutually exclusive set.
    Radio,
}

/// Definition of a group.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDef {
    /// Id, unique on its surface.
    pub id: String,
    /// Heading text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Hidden groups are not rendered or searched.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Collapsed groups show their heading but not their members while browsing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    /// Group behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<GroupVariant>,
    /// Selected value of a radio group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Radio change handler.
    #[serde(skip)]
    pub on_value_change: Option<Callback<String>>,
    /// Members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeDef>,
}

impl GroupDef {
    /// An empty group.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the heading.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Make this a radio group with the given selected value.
    #[must_use]
    pub fn radio(mut self, value: Option<String>) -> Self {
        self.variant = Some(GroupVariant::Radio);
        self.value = value;
        self
    }

    /// Set the radio change handler.
    #[must_use]
    pub fn on_value_change(mut self, f: impl Fn(&String) + 'static) -> Self {
        self.on_value_change = Some(Callback::new(f));
        self
    }

    /// Set the collapsed flag.
    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Set the hidden flag.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Append a member.
    #[must_use]
    pub fn node(mut self, node: impl Into<NodeDef>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Append several members.
    #[must_use]
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeDef>) -> Self {
        self.nodes.extend(nodes);
        self
    }
}

/// Definition of a submenu.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmenuDef {
    /// Id, unique on its surface; also the last segment of the child surface id.
    pub id: String,
    /// Trigger label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Trigger icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Search aliases for the trigger.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Disabled triggers cannot be focused or opened.
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Hidden triggers are not rendered or searched.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Static child nodes (or nodes resolved from the loader).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeDef>,
    /// Loader for child nodes.
    #[serde(skip)]
    pub loader: Option<Loader>,
    /// Load eagerly while a query is active so results can include this submenu.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deep_search: bool,
    /// Whether the parent surface's search descends into this submenu.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub searchable: bool,
    /// The child surface's own item-level fallbacks.
    #[serde(default)]
    pub defaults: MenuDefaults,
    /// The child surface's own presentation overrides.
    #[serde(default)]
    pub ui: UiOverrides,
    /// The child surface's search input visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputVisibility>,
    /// The child surface's input placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Query for which `nodes` were injected from `loader`, if they were.
    #[serde(skip)]
    pub resolved_query: Option<String>,
}

impl SubmenuDef {
    /// An empty submenu.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            icon: None,
            keywords: Vec::new(),
            disabled: false,
            hidden: false,
            nodes: Vec::new(),
            loader: None,
            deep_search: false,
            searchable: true,
            defaults: MenuDefaults::default(),
            ui: UiOverrides::default(),
            input: None,
            placeholder: None,
            resolved_query: None,
        }
    }

    /// Append static nodes.
    #[must_use]
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeDef>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Set the loader.
    #[must_use]
    pub fn loader(mut self, loader: Loader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Enable eager loading during search.
    #[must_use]
    pub fn deep_search(mut self, deep: bool) -> Self {
        self.deep_search = deep;
        self
    }

    /// Control whether parent search descends into this submenu.
    #[must_use]
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Set search aliases.
    #[must_use]
    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the child surface's fallbacks.
    #[must_use]
    pub fn defaults(mut self, defaults: MenuDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the child surface's presentation overrides.
    #[must_use]
    pub fn ui(mut self, ui: UiOverrides) -> Self {
        self.ui = ui;
        self
    }

    /// Set the child surface's input visibility.
    #[must_use]
    pub fn input(mut self, input: InputVisibility) -> Self {
        self.input = Some(input);
        self
    }

    /// Replace the nodes with loader output for `query`, keeping the loader.
    pub fn resolve(&mut self, nodes: Vec<NodeDef>, query: impl Into<String>) {
        self.nodes = nodes;
        self.resolved_query = Some(query.into());
    }

    /// Whether the nodes still have to come from the loader.
    pub fn needs_load(&self) -> bool {
        self.resolved_query.is_none() && matches!(self.loader, Some(Loader::Future(_) | Loader::Handle(_)))
    }
}
