// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for circular navigation.

use proptest::prelude::*;
use understory_rows::{ActiveCause, RowKind, RowRecord, SurfaceStore};

fn store(len: usize, disabled: &[bool]) -> (SurfaceStore, Vec<String>) {
    let mut store = SurfaceStore::new("list");
    let ids: Vec<String> = (0..len).map(|i| format!("row-{i}")).collect();
    for (i, id) in ids.iter().enumerate() {
        let off = disabled.get(i).copied().unwrap_or(false);
        store.register_row(id.clone(), RowRecord::new(RowKind::Item).disabled(off));
    }
    store.set_order(&ids);
    (store, ids)
}

proptest! {
    #[test]
    fn next_len_times_returns_to_start(len in 1_usize..24, start in 0_usize..24) {
        let (mut s, _) = store(len, &[]);
        s.set_active_by_index(start, ActiveCause::Keyboard);
        let origin = s.active_id().map(str::to_owned);
        for _ in 0..len {
            s.next(ActiveCause::Keyboard);
        }
        prop_assert_eq!(s.active_id().map(str::to_owned), origin);
    }

    #[test]
    fn next_from_last_is_first_and_prev_from_first_is_last(len in 1_usize..24) {
        let (mut s, ids) = store(len, &[]);
        s.last(ActiveCause::Keyboard);
        s.next(ActiveCause::Keyboard);
        prop_assert_eq!(s.active_id(), Some(ids[0].as_str()));
        s.prev(ActiveCause::Keyboard);
        prop_assert_eq!(s.active_id(), Some(ids[len - 1].as_str()));
    }

    #[test]
    fn disabled_rows_are_never_active(disabled in proptest::collection::vec(any::<bool>(), 1..16), steps in 0_usize..40) {
        let (mut s, ids) = store(disabled.len(), &disabled);
        s.first(ActiveCause::Keyboard);
        for _ in 0..steps {
            s.next(ActiveCause::Keyboard);
            if let Some(active) = s.active_id() {
                let i = ids.iter().position(|id| id == active).unwrap();
                prop_assert!(!disabled[i]);
            }
        }
        let enabled = disabled.iter().filter(|d| !**d).count();
        prop_assert_eq!(s.order().len(), enabled);
    }
}
