// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live, instantiated menu tree.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    Callback, DefinitionError, GroupVariant, InputVisibility, ItemVariant, Loader, MenuDef,
    MenuDefaults, NodeDef, PATH_SEPARATOR, SelectEvent, UiOverrides, child_surface_id,
};

/// Identifier of a [`Menu`] (one surface) inside a [`MenuTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuKey(u32);

/// Identifier of a [`Node`] inside a [`MenuTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u32);

impl MenuKey {
    /// Dense index of this menu, in instantiation order.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl NodeKey {
    /// Dense index of this node, in document order.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One surface of the live tree.
#[derive(Clone, Debug)]
pub struct Menu {
    /// Definition id (the root menu id, or the submenu's id).
    pub id: String,
    /// Unique surface path.
    pub surface_id: String,
    /// Nesting depth; the root is 0.
    pub depth: u32,
    /// Top-level nodes in document order.
    pub nodes: Vec<NodeKey>,
    /// Item-level fallbacks for this surface.
    pub defaults: MenuDefaults,
    /// Presentation overrides for this surface.
    pub ui: UiOverrides,
    /// Search input visibility for this surface.
    pub input: Option<InputVisibility>,
    /// Input placeholder for this surface.
    pub placeholder: Option<String>,
    /// The submenu trigger that spawned this surface; `None` for the root.
    pub parent: Option<NodeKey>,
    /// Submenu ids leading from the root definition to this surface.
    pub def_path: Vec<String>,
}

/// One node of the live tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// Definition id, unique on its surface.
    pub id: String,
    /// Surface the node is rendered on.
    pub surface_id: String,
    /// Enclosing menu.
    pub menu: MenuKey,
    /// Enclosing group, if any.
    pub group: Option<NodeKey>,
    /// Display label.
    pub label: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Search aliases.
    pub keywords: Vec<String>,
    /// Disabled nodes are never focusable or selectable.
    pub disabled: bool,
    /// Hidden nodes are neither rendered nor searched.
    pub hidden: bool,
    /// Kind-specific data.
    pub kind: NodeKind,
}

impl Node {
    /// The label, or the id when no label was given.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Returns `true` for submenu triggers.
    pub fn is_submenu(&self) -> bool {
        matches!(self.kind, NodeKind::Submenu(_))
    }

    /// Returns `true` for items and submenu triggers.
    pub fn is_row(&self) -> bool {
        !matches!(self.kind, NodeKind::Group(_))
    }
}

/// Kind-specific node data.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A selectable item.
    Item(Item),
    /// A group of nodes on the same surface.
    Group(Group),
    /// A submenu trigger with its materialized child surface.
    Submenu(Submenu),
}

/// Live item data.
#[derive(Clone, Debug)]
pub struct Item {
    /// Resolved variant.
    pub variant: ItemVariant,
    /// Controlled checked state. Radio items always carry one.
    pub checked: Option<bool>,
    /// Resolved value; radio items default to their id.
    pub value: Option<String>,
    /// Item-level close override.
    pub close_on_select: Option<bool>,
    /// Selection handler.
    pub on_select: Option<Callback<SelectEvent>>,
    /// Checkbox change handler.
    pub on_checked_change: Option<Callback<bool>>,
}

/// Live group data.
#[derive(Clone, Debug)]
pub struct Group {
    /// Group behavior.
    pub variant: Option<GroupVariant>,
    /// Selected value of a radio group.
    pub value: Option<String>,
    /// Whether members are omitted while browsing.
    pub collapsed: bool,
    /// Radio change handler.
    pub on_value_change: Option<Callback<String>>,
    /// Members in document order.
    pub children: Vec<NodeKey>,
}

impl Group {
    /// Returns `true` for radio groups.
    pub fn is_radio(&self) -> bool {
        self.variant == Some(GroupVariant::Radio)
    }
}

/// Live submenu data.
#[derive(Clone, Debug)]
pub struct Submenu {
    /// The child surface.
    pub child: MenuKey,
    /// Loader for the child's nodes, kept even after results were injected.
    pub loader: Option<Loader>,
    /// Eagerly loaded while a query is active.
    pub deep_search: bool,
    /// Whether parent-surface search descends into this submenu.
    pub searchable: bool,
    /// Query for which the child's nodes were injected from the loader.
    pub resolved_query: Option<String>,
}

impl Submenu {
    /// Whether the child's nodes still have to come from an asynchronous loader.
    pub fn needs_load(&self) -> bool {
        self.resolved_query.is_none()
            && matches!(self.loader, Some(Loader::Future(_) | Loader::Handle(_)))
    }
}

/// The instantiated form of a [`MenuDef`].
#[derive(Clone, Debug)]
pub struct MenuTree {
    def: Rc<MenuDef>,
    menus: Vec<Menu>,
    nodes: Vec<Node>,
    by_surface: HashMap<String, MenuKey>,
}

impl MenuTree {
    /// The root surface.
    pub fn root(&self) -> MenuKey {
        MenuKey(0)
    }

    /// The definition this tree was instantiated from.
    pub fn def(&self) -> &MenuDef {
        &self.def
    }

    /// Access a menu.
    ///
    /// Panics if `key` did not come from this tree.
    pub fn menu(&self, key: MenuKey) -> &Menu {
        &self.menus[key.index()]
    }

    /// Access a node.
    ///
    /// Panics if `key` did not come from this tree.
    pub fn node(&self, key: NodeKey) -> &Node {
        &self.nodes[key.index()]
    }

    /// Iterate every surface in instantiation order.
    pub fn menus(&self) -> impl Iterator<Item = (MenuKey, &Menu)> + '_ {
        (0_u32..).zip(&self.menus).map(|(i, m)| (MenuKey(i), m))
    }

    /// Number of nodes across all surfaces.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look a surface up by its path.
    pub fn menu_by_surface(&self, surface_id: &str) -> Option<MenuKey> {
        self.by_surface.get(surface_id).copied()
    }

    /// Find a node on `menu` (including inside groups) by id.
    pub fn node_by_id(&self, menu: MenuKey, id: &str) -> Option<NodeKey> {
        self.surface_nodes(menu)
            .into_iter()
            .find(|&k| self.node(k).id == id)
    }

    /// All nodes rendered on `menu`, depth-first through groups, in document order.
    ///
    /// Submenu children belong to their own surface and are not included.
    pub fn surface_nodes(&self, menu: MenuKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.push_surface_nodes(&self.menu(menu).nodes, &mut out);
        out
    }

    fn push_surface_nodes(&self, keys: &[NodeKey], out: &mut Vec<NodeKey>) {
        for &k in keys {
            out.push(k);
            if let NodeKind::Group(g) = &self.node(k).kind {
                self.push_surface_nodes(&g.children, out);
            }
        }
    }

    /// The trigger node of `menu`'s parent surface, if `menu` is a submenu.
    pub fn parent_menu(&self, menu: MenuKey) -> Option<MenuKey> {
        self.menu(menu).parent.map(|n| self.node(n).menu)
    }

    /// Child surface of a submenu trigger.
    pub fn submenu_child(&self, node: NodeKey) -> Option<MenuKey> {
        match &self.node(node).kind {
            NodeKind::Submenu(s) => Some(s.child),
            _ => None,
        }
    }

    /// Labels of the groups and submenu triggers enclosing `node`, outermost
    /// first, stopping at the surface `from`.
    ///
    /// If `from` is not an ancestor surface of `node`, the path runs up to the root.
    pub fn breadcrumb(&self, from: MenuKey, node: NodeKey) -> SmallVec<[String; 4]> {
        let mut rev: SmallVec<[String; 4]> = SmallVec::new();
        let mut cur = self.node(node);
        loop {
            if let Some(g) = cur.group {
                let g = self.node(g);
                rev.push(g.display_label().to_owned());
                cur = g;
                continue;
            }
            if cur.menu == from {
                break;
            }
            match self.menu(cur.menu).parent {
                Some(trigger) => {
                    let t = self.node(trigger);
                    rev.push(t.display_label().to_owned());
                    cur = t;
                }
                None => break,
            }
        }
        rev.reverse();
        rev
    }

    /// Submenu ids from `from` down to the surface of `node`.
    pub fn submenu_path(&self, from: MenuKey, node: NodeKey) -> SmallVec<[String; 4]> {
        let mut rev: SmallVec<[String; 4]> = SmallVec::new();
        let mut menu = self.node(node).menu;
        while menu != from {
            let Some(trigger) = self.menu(menu).parent else {
                break;
            };
            let t = self.node(trigger);
            rev.push(t.id.clone());
            menu = t.menu;
        }
        rev.reverse();
        rev
    }

    /// Iterate every surface id.
    pub fn surfaces(&self) -> impl Iterator<Item = &str> + '_ {
        self.menus.iter().map(|m| m.surface_id.as_str())
    }

    /// Returns `true` if `ancestor` is `menu` or one of its enclosing surfaces.
    pub fn is_ancestor_or_self(&self, ancestor: MenuKey, menu: MenuKey) -> bool {
        let mut cur = Some(menu);
        while let Some(m) = cur {
            if m == ancestor {
                return true;
            }
            cur = self.parent_menu(m);
        }
        false
    }
}

/// Instantiate `def` as a live tree rooted at `surface_id` with the given depth.
///
/// Pure and deterministic: node and surface ids derive from the definition
/// path, so instantiating an updated definition keeps the ids of unchanged
/// parts stable.
pub fn instantiate(
    def: &MenuDef,
    surface_id: &str,
    depth: u32,
) -> Result<MenuTree, DefinitionError> {
    let mut b = Builder::default();
    b.build_menu(
        MenuSource {
            id: &def.id,
            nodes: &def.nodes,
            defaults: &def.defaults,
            ui: &def.ui,
            input: def.input,
            placeholder: def.placeholder.as_deref(),
        },
        surface_id.to_owned(),
        depth,
        None,
        Vec::new(),
    )?;
    tracing::trace!(
        message = "menu.instantiate",
        surface = surface_id,
        surfaces = b.menus.len(),
        nodes = b.nodes.len()
    );
    Ok(MenuTree {
        def: Rc::new(def.clone()),
        menus: b.menus,
        nodes: b.nodes,
        by_surface: b.by_surface,
    })
}

struct MenuSource<'a> {
    id: &'a str,
    nodes: &'a [NodeDef],
    defaults: &'a MenuDefaults,
    ui: &'a UiOverrides,
    input: Option<InputVisibility>,
    placeholder: Option<&'a str>,
}

/// Radio wiring handed down from an enclosing radio group.
#[derive(Copy, Clone)]
struct RadioScope<'a> {
    value: Option<&'a str>,
}

#[derive(Default)]
struct Builder {
    menus: Vec<Menu>,
    nodes: Vec<Node>,
    by_surface: HashMap<String, MenuKey>,
}

impl Builder {
    fn build_menu(
        &mut self,
        src: MenuSource<'_>,
        surface_id: String,
        depth: u32,
        parent: Option<NodeKey>,
        def_path: Vec<String>,
    ) -> Result<MenuKey, DefinitionError> {
        let key = MenuKey(len_u32(self.menus.len()));
        self.by_surface.insert(surface_id.clone(), key);
        self.menus.push(Menu {
            id: src.id.to_owned(),
            surface_id: surface_id.clone(),
            depth,
            nodes: Vec::new(),
            defaults: src.defaults.clone(),
            ui: src.ui.clone(),
            input: src.input,
            placeholder: src.placeholder.map(str::to_owned),
            parent,
            def_path: def_path.clone(),
        });
        let mut seen = HashSet::new();
        let top = self.build_nodes(
            key,
            &surface_id,
            depth,
            &def_path,
            src.nodes,
            None,
            &mut seen,
        )?;
        self.menus[key.index()].nodes = top;
        Ok(key)
    }

    fn build_nodes(
        &mut self,
        menu: MenuKey,
        surface_id: &str,
        depth: u32,
        def_path: &[String],
        defs: &[NodeDef],
        radio: Option<RadioScope<'_>>,
        seen: &mut HashSet<String>,
    ) -> Result<Vec<NodeKey>, DefinitionError> {
        let mut out = Vec::with_capacity(defs.len());
        for def in defs {
            let id = def.id();
            check_id(surface_id, id, seen)?;
            let key = NodeKey(len_u32(self.nodes.len()));
            let (label, icon, keywords, disabled, hidden) = match def {
                NodeDef::Item(d) => (
                    d.label.clone(),
                    d.icon.clone(),
                    d.keywords.clone(),
                    d.disabled,
                    d.hidden,
                ),
                NodeDef::Group(d) => (d.label.clone(), None, Vec::new(), false, d.hidden),
                NodeDef::Submenu(d) => (
                    d.label.clone(),
                    d.icon.clone(),
                    d.keywords.clone(),
                    d.disabled,
                    d.hidden,
                ),
            };
            // Reserve the slot so document order matches key order.
            self.nodes.push(Node {
                id: id.to_owned(),
                surface_id: surface_id.to_owned(),
                menu,
                group: None,
                label,
                icon,
                keywords,
                disabled,
                hidden,
                kind: NodeKind::Group(Group {
                    variant: None,
                    value: None,
                    collapsed: false,
                    on_value_change: None,
                    children: Vec::new(),
                }),
            });
            let kind = match def {
                NodeDef::Item(d) => {
                    let variant = match (radio, d.variant) {
                        (Some(_), None | Some(ItemVariant::Radio)) => ItemVariant::Radio,
                        (_, Some(v)) => v,
                        (None, None) => ItemVariant::Button,
                    };
                    if variant == ItemVariant::Radio && radio.is_none() {
                        return Err(DefinitionError::RadioOutsideGroup {
                            surface: surface_id.to_owned(),
                            id: id.to_owned(),
                        });
                    }
                    let (value, checked) = if variant == ItemVariant::Radio {
                        let value = d.value.clone().unwrap_or_else(|| d.id.clone());
                        let checked = radio.and_then(|r| r.value) == Some(value.as_str());
                        (Some(value), Some(checked))
                    } else {
                        (d.value.clone(), d.checked)
                    };
                    NodeKind::Item(Item {
                        variant,
                        checked,
                        value,
                        close_on_select: d.close_on_select,
                        on_select: d.on_select.clone(),
                        on_checked_change: d.on_checked_change.clone(),
                    })
                }
                NodeDef::Group(d) => {
                    let scope = (d.variant == Some(GroupVariant::Radio)).then(|| RadioScope {
                        value: d.value.as_deref(),
                    });
                    let children = self.build_nodes(
                        menu, surface_id, depth, def_path, &d.nodes, scope, seen,
                    )?;
                    for &c in &children {
                        self.nodes[c.index()].group = Some(key);
                    }
                    NodeKind::Group(Group {
                        variant: d.variant,
                        value: d.value.clone(),
                        collapsed: d.collapsed,
                        on_value_change: d.on_value_change.clone(),
                        children,
                    })
                }
                NodeDef::Submenu(d) => {
                    let nodes = match &d.loader {
                        Some(Loader::Static(n)) if d.nodes.is_empty() => n.as_slice(),
                        _ => d.nodes.as_slice(),
                    };
                    let mut child_path = def_path.to_vec();
                    child_path.push(d.id.clone());
                    let child = self.build_menu(
                        MenuSource {
                            id: &d.id,
                            nodes,
                            defaults: &d.defaults,
                            ui: &d.ui,
                            input: d.input,
                            placeholder: d.placeholder.as_deref(),
                        },
                        child_surface_id(surface_id, &d.id),
                        depth + 1,
                        Some(key),
                        child_path,
                    )?;
                    NodeKind::Submenu(Submenu {
                        child,
                        loader: d.loader.clone(),
                        deep_search: d.deep_search,
                        searchable: d.searchable,
                        resolved_query: d.resolved_query.clone(),
                    })
                }
            };
            self.nodes[key.index()].kind = kind;
            out.push(key);
        }
        Ok(out)
    }
}

fn check_id(surface_id: &str, id: &str, seen: &mut HashSet<String>) -> Result<(), DefinitionError> {
    if id.is_empty() {
        return Err(DefinitionError::EmptyId {
            surface: surface_id.to_owned(),
        });
    }
    if id.contains(PATH_SEPARATOR) {
        return Err(DefinitionError::InvalidId {
            surface: surface_id.to_owned(),
            id: id.to_owned(),
        });
    }
    if !seen.insert(id.to_owned()) {
        return Err(DefinitionError::DuplicateId {
            surface: surface_id.to_owned(),
            id: id.to_owned(),
        });
    }
    Ok(())
}

#[expect(clippy::cast_possible_truncation, reason = "menus never hold 2^32 nodes")]
fn len_u32(len: usize) -> u32 {
    len as u32
}
