// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection semantics, open state, and bind props.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_action_menu::{
    ActionMenu, ElementRef, FactoryDefaults, Key, KeyEvent, MenuConfig, MenuError, MenuEvent,
    Outcome, PropEvent, PropEventKind, Props, create_action_menu,
};
use understory_menu_filter::{CREATE_ROW_ID, CreateNew, Pipeline, RowKind};
use understory_menu_tree::{
    Callback, DefinitionError, GroupDef, InputVisibility, ItemDef, MenuDef, MenuDefaults, NodeDef,
    SlotKind, SubmenuDef,
};
use understory_rows::ActiveCause;

fn def() -> MenuDef {
    MenuDef::new("m")
        .node(NodeDef::item("new", "New"))
        .node(ItemDef::new("gone", "Gone").disabled(true))
        .node(SubmenuDef::new("view", "View").nodes([
            ItemDef::checkbox("grid", "Show grid").into(),
            NodeDef::item("reset", "Reset zoom"),
            GroupDef::new("size")
                .label("Size")
                .radio(None)
                .nodes([NodeDef::item("s", "Small"), NodeDef::item("l", "Large")])
                .into(),
        ]))
}

fn opened(def: MenuDef, config: MenuConfig) -> ActionMenu {
    let mut menu = ActionMenu::new(def, config.default_open(true)).unwrap();
    menu.surface_mounted("m").unwrap();
    menu
}

/// Open the view submenu and drop the events so far.
fn in_view(menu: &mut ActionMenu) {
    assert_eq!(menu.click_row("m", "view"), Ok(true));
    menu.surface_mounted("m::view").unwrap();
    menu.drain_events();
}

#[test]
fn disabled_rows_are_inert() {
    let mut menu = opened(def(), MenuConfig::default());
    assert!(!menu.store("m").unwrap().order().iter().any(|id| id == "gone"));
    assert!(
        !menu
            .store_mut("m")
            .unwrap()
            .set_active_id(Some("gone"), ActiveCause::Keyboard)
    );
    assert_eq!(menu.select("m", "gone"), Ok(false));
    assert!(!menu.pointer_enter_row("m", "gone", 0));
    assert!(menu.drain_events().is_empty());
    assert!(menu.is_open());
}

#[test]
fn checkboxes_toggle_without_closing() {
    let mut menu = opened(def(), MenuConfig::default());
    in_view(&mut menu);
    assert_eq!(menu.is_checked("m::view", "grid"), Some(false));

    assert_eq!(menu.select("m::view", "grid"), Ok(true));
    assert_eq!(menu.is_checked("m::view", "grid"), Some(true));
    assert!(menu.is_open());
    assert_eq!(menu.open_surfaces().collect::<Vec<_>>(), ["m", "m::view"]);
    assert_eq!(
        menu.drain_events(),
        [
            MenuEvent::CheckedChange {
                surface_id: "m::view".into(),
                id: "grid".into(),
                checked: true,
            },
            MenuEvent::Select {
                surface_id: "m::view".into(),
                id: "grid".into(),
                value: None,
            },
        ]
    );

    menu.select("m::view", "grid").unwrap();
    assert_eq!(menu.is_checked("m::view", "grid"), Some(false));
}

#[test]
fn buttons_close_every_surface() {
    let mut menu = opened(def(), MenuConfig::default());
    in_view(&mut menu);

    assert_eq!(menu.select("m::view", "reset"), Ok(true));
    assert!(!menu.is_open());
    assert_eq!(menu.open_surfaces().count(), 0);
    assert_eq!(
        menu.drain_events(),
        [
            MenuEvent::Select {
                surface_id: "m::view".into(),
                id: "reset".into(),
                value: None,
            },
            MenuEvent::OpenChange { open: false },
        ]
    );
}

#[test]
fn enter_selects_the_active_row() {
    let mut menu = opened(def(), MenuConfig::default());
    assert!(menu.key_down(&KeyEvent::new(Key::Enter)));
    assert!(!menu.is_open());
    assert!(matches!(
        menu.drain_events().first(),
        Some(MenuEvent::Select { id, .. }) if id == "new"
    ));
}

#[test]
fn radio_groups_track_an_uncontrolled_value() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let def = MenuDef::new("m").node(
        GroupDef::new("size")
            .radio(None)
            .on_value_change(move |v: &String| log.borrow_mut().push(v.clone()))
            .nodes([NodeDef::item("s", "Small"), NodeDef::item("l", "Large")]),
    );
    let mut menu = opened(def, MenuConfig::default());
    assert_eq!(menu.is_checked("m", "s"), Some(false));
    assert_eq!(menu.is_checked("m", "l"), Some(false));

    menu.select("m", "l").unwrap();
    assert!(menu.is_open(), "radio items keep the menu open");
    assert_eq!(menu.is_checked("m", "l"), Some(true));
    assert_eq!(menu.is_checked("m", "s"), Some(false));
    assert_eq!(*seen.borrow(), ["l"]);
    assert!(menu.drain_events().contains(&MenuEvent::ValueChange {
        surface_id: "m".into(),
        group: "size".into(),
        value: "l".into(),
    }));

    menu.select("m", "l").unwrap();
    assert_eq!(seen.borrow().len(), 1, "reselecting the checked value changes nothing");
    assert!(
        !menu
            .drain_events()
            .iter()
            .any(|e| matches!(e, MenuEvent::ValueChange { .. }))
    );

    menu.set_open(false);
    menu.set_open(true);
    assert_eq!(menu.is_checked("m", "l"), Some(true), "state survives reopening");
}

#[test]
fn close_on_select_can_be_overridden() {
    let selected = Rc::new(Cell::new(0));
    let count = selected.clone();
    let def = MenuDef::new("m")
        .defaults(MenuDefaults {
            close_on_select: Some(false),
            on_select: Some(Callback::new(move |_| {
                count.set(count.get() + 1);
            })),
        })
        .node(NodeDef::item("stay", "Stay"))
        .node(ItemDef::new("go", "Go").close_on_select(true));
    let mut menu = opened(def, MenuConfig::default());

    menu.select("m", "stay").unwrap();
    assert!(menu.is_open(), "menu defaults keep buttons open");
    assert_eq!(selected.get(), 1, "menu-level handler runs for items without one");

    menu.select("m", "go").unwrap();
    assert!(!menu.is_open());
    assert_eq!(selected.get(), 2);
}

#[test]
fn controlled_open_waits_for_the_host() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let log = requests.clone();
    let config = MenuConfig::default()
        .open(false)
        .on_open_change(move |open| log.borrow_mut().push(*open));
    let mut menu = ActionMenu::new(def(), config).unwrap();

    menu.set_open(true);
    assert!(!menu.is_open());
    assert_eq!(*requests.borrow(), [true]);

    menu.set_open_prop(Some(true));
    assert!(menu.is_open());
    assert_eq!(menu.open_surfaces().collect::<Vec<_>>(), ["m"]);

    menu.key_down(&KeyEvent::new(Key::Escape));
    assert!(menu.is_open(), "dismissal is only a request");
    assert_eq!(*requests.borrow(), [true, false]);
}

#[test]
fn typing_reveals_a_hidden_input() {
    let mut menu = opened(def(), MenuConfig::default().input(InputVisibility::UntilTyping));
    assert!(!menu.surface("m").unwrap().has_input);
    assert!(menu.key_down(&KeyEvent::char('n')));
    let view = menu.surface("m").unwrap();
    assert!(view.has_input);
    assert_eq!(view.query, "n");

    let mut menu = opened(def(), MenuConfig::default().input(InputVisibility::Never));
    assert!(!menu.key_down(&KeyEvent::char('n')));
    assert_eq!(menu.query("m"), Some(""));
}

#[test]
fn create_rows_report_the_query() {
    let config = MenuConfig::default().pipeline(Pipeline::new().with(CreateNew::new()));
    let mut menu = opened(def(), config);
    menu.set_query("m", "zebra").unwrap();

    let rows = menu.rows("m").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, CREATE_ROW_ID);
    assert!(matches!(&rows[0].kind, RowKind::Create { query } if query == "zebra"));
    assert_eq!(menu.active_id("m"), Some(CREATE_ROW_ID));

    assert!(menu.key_down(&KeyEvent::new(Key::Enter)));
    assert!(!menu.is_open());
    assert_eq!(
        menu.drain_events(),
        [
            MenuEvent::Create {
                surface_id: "m".into(),
                query: "zebra".into(),
            },
            MenuEvent::OpenChange { open: false },
        ]
    );
}

#[test]
fn definition_updates_keep_surviving_surfaces() {
    let mut menu = opened(def(), MenuConfig::default());
    in_view(&mut menu);

    menu.update_menu(def().node(NodeDef::item("extra", "Extra")))
        .unwrap();
    assert_eq!(menu.open_surfaces().collect::<Vec<_>>(), ["m", "m::view"]);

    menu.update_menu(MenuDef::new("m").node(NodeDef::item("new", "New")))
        .unwrap();
    assert_eq!(menu.open_surfaces().collect::<Vec<_>>(), ["m"]);
    assert_eq!(menu.owner(), Some("m"));

    let duplicate = MenuDef::new("m")
        .node(NodeDef::item("x", "X"))
        .node(NodeDef::item("x", "Again"));
    assert!(matches!(
        menu.update_menu(duplicate),
        Err(MenuError::Definition(DefinitionError::DuplicateId { .. }))
    ));
}

#[test]
fn row_props_compose_classes_and_aria() {
    let factory = create_action_menu(FactoryDefaults::default().class(SlotKind::Item, "row"));
    let mut menu = factory
        .build_with(def(), |c| c.class(SlotKind::Item, "compact").default_open(true))
        .unwrap();
    menu.surface_mounted("m").unwrap();

    let props = menu
        .get_row_props("m", "new", Props::new().class("mine").attr("data-x", "1"))
        .unwrap();
    assert_eq!(props.class_name, "row compact mine");
    assert_eq!(props.id.as_deref(), Some("m-row-new"));
    assert_eq!(props.role.as_deref(), Some("menuitem"));
    assert_eq!(props.get_attr("data-active"), Some("true"));
    assert_eq!(props.get_attr("data-x"), Some("1"));

    let disabled = menu.get_row_props("m", "gone", Props::new()).unwrap();
    assert_eq!(disabled.get_attr("aria-disabled"), Some("true"));

    let trigger = menu.get_row_props("m", "view", Props::new()).unwrap();
    assert_eq!(trigger.get_attr("aria-haspopup"), Some("menu"));
    assert_eq!(trigger.get_attr("aria-expanded"), Some("false"));
    assert_eq!(trigger.get_attr("aria-controls"), Some("m::view-list"));
    in_view(&mut menu);
    let trigger = menu.get_row_props("m", "view", Props::new()).unwrap();
    assert_eq!(trigger.get_attr("aria-expanded"), Some("true"));

    let grid = menu.get_row_props("m::view", "grid", Props::new()).unwrap();
    assert_eq!(grid.role.as_deref(), Some("menuitemcheckbox"));
    assert_eq!(grid.get_attr("aria-checked"), Some("false"));

    let input = menu.get_input_props("m", Props::new()).unwrap();
    assert_eq!(input.role.as_deref(), Some("combobox"));
    assert_eq!(input.get_attr("aria-controls"), Some("m-list"));
    assert_eq!(input.get_attr("aria-activedescendant"), Some("m-row-view"));

    assert!(matches!(
        menu.get_row_props("m", "nope", Props::new()),
        Err(MenuError::UnknownRow { .. })
    ));
}

#[test]
fn a_stopping_handler_skips_the_core_behavior() {
    let mut menu = opened(def(), MenuConfig::default());
    let clicks = Rc::new(Cell::new(0));
    let seen = clicks.clone();
    let stopped = menu
        .get_row_props(
            "m",
            "new",
            Props::new().on(PropEventKind::Click, move |_| {
                seen.set(seen.get() + 1);
                Outcome::Stop
            }),
        )
        .unwrap();
    assert!(!menu.dispatch(&stopped, &PropEvent::Click));
    assert_eq!(clicks.get(), 1);
    assert!(menu.is_open());
    assert!(menu.drain_events().is_empty());

    let plain = menu.get_row_props("m", "new", Props::new()).unwrap();
    assert!(menu.dispatch(&plain, &PropEvent::Click));
    assert!(!menu.is_open());
}

#[test]
fn input_props_route_text_and_navigation() {
    let mut menu = opened(def(), MenuConfig::default());
    let input = menu.get_input_props("m", Props::new()).unwrap();

    assert!(menu.dispatch(&input, &PropEvent::Input("vi".into())));
    assert_eq!(menu.query("m"), Some("vi"));
    assert!(
        !menu.dispatch(&input, &PropEvent::KeyDown(KeyEvent::char('x'))),
        "text editing stays with the element"
    );
    assert_eq!(menu.query("m"), Some("vi"));

    assert!(menu.dispatch(&input, &PropEvent::KeyDown(KeyEvent::new(Key::Escape))));
    assert!(!menu.is_open());
}

#[test]
fn input_events_do_not_filter_a_surface_without_search() {
    let mut menu = opened(def(), MenuConfig::default().input(InputVisibility::Never));
    let input = menu.get_input_props("m", Props::new()).unwrap();

    assert!(!menu.dispatch(&input, &PropEvent::Input("vi".into())));
    assert_eq!(menu.query("m"), Some(""));
    assert!(!menu.surface("m").unwrap().has_input);
    let labels: Vec<_> = menu.rows("m").unwrap().iter().map(|r| r.label.clone()).collect();
    assert_eq!(labels, ["New", "Gone", "View"]);
}

#[test]
fn refs_track_mounts() {
    let mut menu = ActionMenu::new(def(), MenuConfig::default().default_open(true)).unwrap();
    assert_eq!(menu.active_id("m"), None, "nothing is active before the mount");

    let attached = Rc::new(Cell::new(0));
    let count = attached.clone();
    let content = menu
        .get_content_props(
            "m",
            Props::new().on_ref(move |el| {
                if el.is_some() {
                    count.set(count.get() + 1);
                }
            }),
        )
        .unwrap();
    let element: ElementRef = Rc::new(());
    menu.bind_ref(&content, Some(element.clone()));
    assert_eq!(attached.get(), 1);
    assert_eq!(menu.active_id("m"), Some("new"));

    let row = menu.get_row_props("m", "new", Props::new()).unwrap();
    menu.bind_ref(&row, Some(element));
    assert!(menu.store("m").unwrap().row("new").unwrap().mounted);
    menu.bind_ref(&row, None);
    assert!(!menu.store("m").unwrap().row("new").unwrap().mounted);
}

#[test]
fn measured_widths_only_grow() {
    let mut menu = opened(def(), MenuConfig::default());
    for row in ["new", "view"] {
        menu.set_row_mounted("m", row, true).unwrap();
    }
    let widths = |id: &str| match id {
        "new" => Some(80.0),
        "view" => Some(120.0),
        _ => None,
    };
    assert_eq!(menu.measure_row_widths("m", widths), Ok(Some(120.0)));

    menu.set_query("m", "new").unwrap();
    assert_eq!(
        menu.measure_row_widths("m", |_| Some(60.0)),
        Ok(Some(120.0)),
        "narrower rows never shrink the surface"
    );
    assert_eq!(menu.surface("m").unwrap().min_width, Some(120.0));
    let content = menu.get_content_props("m", Props::new()).unwrap();
    assert_eq!(content.get_attr("style"), Some("min-width: 120px"));
}
