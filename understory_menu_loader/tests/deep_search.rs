// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deep search across several loaders settling in a controlled order.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use understory_menu_filter::Pipeline;
use understory_menu_loader::{DeepSearch, DeepSearchState, LoaderAdapter, NativeAdapter, Phase};
use understory_menu_tree::{
    LoadError, LoadResult, Loader, MenuDef, NodeDef, SubmenuDef, instantiate,
};

/// A loader whose first invocation waits on the returned sender.
fn gated() -> (Loader, oneshot::Sender<LoadResult>) {
    let (tx, rx) = oneshot::channel::<LoadResult>();
    let rx = RefCell::new(Some(rx));
    let loader = Loader::from_fn(move |_| {
        let rx = rx.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(LoadError::new("dropped"))),
                None => Err(LoadError::new("invoked twice")),
            }
        }
    });
    (loader, tx)
}

fn deep(id: &str, label: &str, loader: Loader) -> NodeDef {
    SubmenuDef::new(id, label)
        .loader(loader)
        .deep_search(true)
        .into()
}

fn found(def: &MenuDef, query: &str) -> Vec<String> {
    let tree = instantiate(def, "root", 0).unwrap();
    Pipeline::new()
        .run(&tree, tree.root(), query)
        .into_iter()
        .map(|r| r.label)
        .collect()
}

#[test]
fn loading_holds_until_all_settle_and_results_stream_in() {
    let mut pool = LocalPool::new();
    let adapter: Rc<dyn LoaderAdapter> = Rc::new(NativeAdapter::new(pool.spawner()));
    let mut search = DeepSearch::new(adapter);

    // Delays of 800ms, 1200ms, and 1000ms: they settle as fast, medium, slow.
    let (fast, fast_tx) = gated();
    let (slow, slow_tx) = gated();
    let (medium, medium_tx) = gated();
    let def = MenuDef::new("m")
        .node(deep("people", "People", fast))
        .node(deep("files", "Files", slow))
        .node(deep("tags", "Tags", medium));

    let (resolved, state) = search.resolve(&def, "root", "report");
    assert!(state.is_loading);
    assert_eq!(state.progress.len(), 3);
    assert!(state.progress.iter().all(|p| p.phase == Phase::Loading));
    assert!(found(&resolved, "report").is_empty());

    fast_tx
        .send(Ok(vec![NodeDef::item("r1", "Report owners")]))
        .unwrap();
    pool.run_until_stalled();
    let (resolved, state) = search.resolve(&def, "root", "report");
    assert!(state.is_loading, "two loaders are still pending");
    assert_eq!(found(&resolved, "report"), ["Report owners"]);
    assert_eq!(state.progress[0].phase, Phase::Ready);
    assert_eq!(state.progress[0].breadcrumb, ["People"]);

    medium_tx
        .send(Ok(vec![NodeDef::item("r2", "Reports tag")]))
        .unwrap();
    pool.run_until_stalled();
    let (_, state) = search.resolve(&def, "root", "report");
    assert!(state.is_loading, "the slowest loader is still pending");

    slow_tx
        .send(Ok(vec![NodeDef::item("r3", "report.pdf")]))
        .unwrap();
    pool.run_until_stalled();
    let (resolved, state) = search.resolve(&def, "root", "report");
    assert!(!state.is_loading && !state.is_fetching && !state.is_error);
    let mut all = found(&resolved, "report");
    all.sort();
    assert_eq!(all, ["Report owners", "Reports tag", "report.pdf"]);
}

#[test]
fn one_failure_does_not_hide_the_others() {
    let mut pool = LocalPool::new();
    let adapter: Rc<dyn LoaderAdapter> = Rc::new(NativeAdapter::new(pool.spawner()));
    let mut search = DeepSearch::new(adapter);
    let (ok, ok_tx) = gated();
    let (bad, bad_tx) = gated();
    let def = MenuDef::new("m")
        .node(deep("ok", "Ok", ok))
        .node(deep("bad", "Bad", bad));

    search.resolve(&def, "root", "x");
    bad_tx.send(Err(LoadError::new("offline"))).unwrap();
    ok_tx.send(Ok(vec![NodeDef::item("x", "Xylophone")])).unwrap();
    pool.run_until_stalled();

    let (resolved, state) = search.resolve(&def, "root", "x");
    assert!(state.is_error);
    assert!(!state.is_loading);
    assert_eq!(found(&resolved, "xylo"), ["Xylophone"]);
    assert_eq!(
        state.progress[1].phase,
        Phase::Failed(LoadError::new("offline"))
    );
    assert_eq!(state.progress[1].path, ["bad"]);
}

#[test]
fn resolved_submenus_keep_their_loader() {
    let mut pool = LocalPool::new();
    let adapter: Rc<dyn LoaderAdapter> = Rc::new(NativeAdapter::new(pool.spawner()));
    let mut search = DeepSearch::new(adapter);
    let (loader, tx) = gated();
    let def = MenuDef::new("m").node(deep("s", "S", loader));

    search.resolve(&def, "root", "a");
    tx.send(Ok(vec![NodeDef::item("a", "A")])).unwrap();
    pool.run_until_stalled();
    let (resolved, _) = search.resolve(&def, "root", "a");
    let sub = resolved.submenu(&["s"]).unwrap();
    assert_eq!(sub.resolved_query.as_deref(), Some("a"));
    assert!(sub.loader.is_some(), "the factory survives injection");
    assert_eq!(sub.nodes.len(), 1);
}

#[test]
fn nested_deep_submenus_load_once_their_parent_resolves() {
    let mut pool = LocalPool::new();
    let adapter: Rc<dyn LoaderAdapter> = Rc::new(NativeAdapter::new(pool.spawner()));
    let mut search = DeepSearch::new(adapter);
    let (inner, inner_tx) = gated();
    let (outer, outer_tx) = gated();
    let def = MenuDef::new("m").node(deep("outer", "Outer", outer));

    search.resolve(&def, "root", "deep");
    outer_tx
        .send(Ok(vec![deep("inner", "Inner", inner)]))
        .unwrap();
    pool.run_until_stalled();
    let (_, state) = search.resolve(&def, "root", "deep");
    assert_eq!(state.progress.len(), 2, "the nested loader was discovered");
    assert!(state.is_loading);
    assert_eq!(state.progress[1].path, ["outer", "inner"]);

    inner_tx
        .send(Ok(vec![NodeDef::item("d", "Deep item")]))
        .unwrap();
    pool.run_until_stalled();
    let (resolved, state) = search.resolve(&def, "root", "deep");
    assert!(!state.is_loading);
    assert_eq!(found(&resolved, "deep item"), ["Deep item"]);
}

#[test]
fn clearing_the_query_releases_everything() {
    let pool = LocalPool::new();
    let adapter: Rc<dyn LoaderAdapter> = Rc::new(NativeAdapter::new(pool.spawner()));
    let mut search = DeepSearch::new(adapter);
    let (loader, _tx) = gated();
    let def = MenuDef::new("m").node(deep("s", "S", loader));

    search.resolve(&def, "root", "q");
    assert_eq!(search.held(), 1);
    let (resolved, state) = search.resolve(&def, "root", "");
    assert_eq!(search.held(), 0);
    assert_eq!(state, DeepSearchState::default());
    assert!(resolved.submenu(&["s"]).unwrap().resolved_query.is_none());
}
