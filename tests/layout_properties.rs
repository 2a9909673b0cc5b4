//! Property-based invariant tests for the stacked-column layout.
//!
//! 1. Fold policy enforcement reaches a fixpoint in one call.
//! 2. In full mode, content padding is monotonic and covers the total and
//!    margin of every earlier column.
//! 3. Sticky offsets are ordered and z-layers strictly decrease.
//! 4. Incremental reorganization agrees with a full re-derivation.
//! 5. Debounced requests for different stacks fire once, widened to all.
//! 6. Laying out twice with unchanged inputs gives the same positions.
//! 7. A persisted fold snapshot reproduces the same positions.

use std::time::Duration;

use proptest::prelude::*;
use stackboard::layout::engine::LayoutEngine;
use stackboard::layout::estimate::estimate_host;
use stackboard::layout::host::RegionMeasurement;
use stackboard::layout::policy;
use stackboard::layout::position::{ColumnInput, compute_stack};
use stackboard::layout::reorganize::reorganize_for_column;
use stackboard::layout::scheduler::{LayoutScope, ManualClock, UpdateScheduler};
use stackboard::model::{
    Board, EstimateConfig, FoldOrientation, FoldSnapshot, FoldStateStore, LayoutConfig, Stack,
    StackId, StackMembership, StickyMode,
};
use stackboard::parse::parse_board;

// ── Helpers ─────────────────────────────────────────────────────────────

/// (stack tag, row) per column
fn board_shape(max_len: usize) -> impl Strategy<Value = Vec<(bool, usize)>> {
    proptest::collection::vec((any::<bool>(), 1usize..=3), 1..=max_len)
}

fn board_from_shape(shape: &[(bool, usize)]) -> Board {
    let mut source = String::new();
    for (i, (stacked, row)) in shape.iter().enumerate() {
        source.push_str(&format!("## C{}", i));
        if *stacked {
            source.push_str(" #stack");
        }
        if *row > 1 {
            source.push_str(&format!(" #row{}", row));
        }
        source.push_str(" #sticky\n");
        for t in 0..(i % 3) {
            source.push_str(&format!("- [ ] task {}\n", t));
        }
    }
    parse_board(&source)
}

fn measurement() -> impl Strategy<Value = RegionMeasurement> {
    (0u16..20, 0u16..10, 0u16..60, 0u16..400, 0u16..30).prop_map(|(m, h, t, c, f)| {
        RegionMeasurement::from_regions(m.into(), h.into(), t.into(), c.into(), f.into())
    })
}

fn inputs(max_len: usize) -> impl Strategy<Value = Vec<ColumnInput>> {
    proptest::collection::vec((measurement(), any::<bool>()), 1..=max_len).prop_map(|cols| {
        cols.into_iter()
            .enumerate()
            .map(|(i, (measurement, sticky))| ColumnInput {
                id: format!("c{}", i),
                measurement,
                sticky_eligible: sticky,
                collapsed: false,
                orientation: FoldOrientation::Horizontal,
            })
            .collect()
    })
}

fn sticky_mode() -> impl Strategy<Value = StickyMode> {
    prop_oneof![
        Just(StickyMode::None),
        Just(StickyMode::TitleOnly),
        Just(StickyMode::Full),
    ]
}

/// Fold toggles: (column index, alt)
fn toggles() -> impl Strategy<Value = Vec<(usize, bool)>> {
    proptest::collection::vec((0usize..8, any::<bool>()), 0..12)
}

fn apply_toggles(engine: &mut LayoutEngine<ManualClock>, ops: &[(usize, bool)]) {
    let ids: Vec<String> = engine.board().column_ids().map(str::to_string).collect();
    for (idx, alt) in ops {
        let id = &ids[idx % ids.len()];
        if idx % 4 == 3 {
            engine.toggle_tasks_in_column(id).unwrap();
        } else {
            engine.toggle_column_fold(id, *alt).unwrap();
        }
    }
}

fn engine_for(board: Board) -> LayoutEngine<ManualClock> {
    LayoutEngine::with_clock(board, LayoutConfig::default(), ManualClock::new())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Enforcement fixpoint
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn enforce_is_a_fixpoint(
        folds in proptest::collection::vec((any::<bool>(), 0u8..3), 1..8)
    ) {
        let mut snapshot = FoldSnapshot::default();
        let columns: Vec<String> = (0..folds.len()).map(|i| format!("c{}", i)).collect();
        for (id, (collapsed, orientation)) in columns.iter().zip(&folds) {
            if *collapsed {
                snapshot.collapsed_columns.insert(id.clone());
            }
            match orientation {
                1 => { snapshot.orientations.insert(id.clone(), FoldOrientation::Vertical); }
                2 => { snapshot.orientations.insert(id.clone(), FoldOrientation::Horizontal); }
                _ => {}
            }
        }
        let mut store = FoldStateStore::from_snapshot(&snapshot);
        let stack = Stack { row: 1, columns: columns.clone() };

        let first = policy::enforce(&mut store, &stack);
        let second = policy::enforce(&mut store, &stack);
        prop_assert!(second.is_empty(), "second pass converted {:?}", second);

        for id in &columns {
            let fold = store.column(id);
            if columns.len() > 1 && fold.collapsed {
                prop_assert_eq!(fold.orientation, Some(FoldOrientation::Horizontal));
            }
            // Expanded columns are never touched
            if !fold.collapsed {
                prop_assert!(first.iter().all(|c| &c.column != id));
            }
        }
        if columns.len() == 1 {
            prop_assert!(first.is_empty());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Content padding
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn padding_is_monotonic_and_covers_earlier_columns(columns in inputs(8)) {
        let layout = compute_stack(StackId::from("c0"), &columns, StickyMode::Full, 1000);
        prop_assert_eq!(layout.positions[0].content_padding, 0.0);

        let mut covered = 0.0;
        for i in 1..layout.positions.len() {
            let prev = &columns[i - 1].measurement;
            covered = covered + prev.total + prev.margin;
            let pad = layout.positions[i].content_padding;
            prop_assert!(pad >= layout.positions[i - 1].content_padding);
            prop_assert!(pad >= covered, "padding {} < {} at {}", pad, covered, i);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Offset ordering and layers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_ordered_and_layers_decrease(
        columns in inputs(8),
        mode in sticky_mode(),
        z_base in 0i32..5000,
    ) {
        let layout = compute_stack(StackId::from("c0"), &columns, mode, z_base);
        let titles: Vec<_> = layout.positions.iter().filter_map(|p| p.title).collect();
        for pair in titles.windows(2) {
            prop_assert!(pair[0].top <= pair[1].top);
            prop_assert!(pair[0].bottom >= pair[1].bottom);
        }
        for pair in layout.positions.windows(2) {
            prop_assert!(pair[0].z_index > pair[1].z_index);
        }
        for p in &layout.positions {
            prop_assert_eq!(p.header_bar_z_index, p.z_index + 1);
            prop_assert!(p.z_index > z_base);
            if p.mode == StickyMode::None {
                prop_assert!(p.title.is_none() && p.margin.is_none());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Incremental reorganization
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reorganize_matches_full_derive(shape in board_shape(8), pick in 0usize..8) {
        let mut board = board_from_shape(&shape);
        let mut membership = StackMembership::derive(&board);
        let id = board.columns[pick % board.columns.len()].id.clone();

        let column = board.column_mut(&id).unwrap();
        let stacked = column.is_stacked();
        column.set_tag("stack", !stacked);

        let reorganization = reorganize_for_column(&mut membership, &board, &id).unwrap();
        prop_assert_eq!(&membership, &StackMembership::derive(&board));
        prop_assert!(membership.stacks.iter().all(|s| !s.is_empty()));
        for affected in &reorganization.affected {
            prop_assert!(membership.get(affected).is_some());
        }
        for removed in &reorganization.removed {
            prop_assert!(membership.get(removed).is_none());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Debounce coalescing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn requests_for_different_stacks_fire_once_as_all(
        requests in proptest::collection::vec((0usize..4, 0u64..150), 2..12)
    ) {
        let distinct: std::collections::HashSet<usize> = requests.iter().map(|(s, _)| *s).collect();
        prop_assume!(distinct.len() >= 2);

        let mut scheduler = UpdateScheduler::new(ManualClock::new(), Duration::from_millis(150));
        for (stack, delay) in &requests {
            scheduler.clock().advance(Duration::from_millis(*delay));
            prop_assert_eq!(scheduler.take_due(), None);
            scheduler.request(LayoutScope::Stack(StackId(format!("s{}", stack))));
        }
        scheduler.clock().advance(Duration::from_millis(150));
        prop_assert_eq!(scheduler.take_due(), Some(LayoutScope::All));
        prop_assert_eq!(scheduler.take_due(), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_now_is_idempotent(shape in board_shape(8), ops in toggles()) {
        let mut engine = engine_for(board_from_shape(&shape));
        apply_toggles(&mut engine, &ops);
        let mut host = estimate_host(
            engine.board(),
            engine.membership(),
            engine.store(),
            &EstimateConfig::default(),
        );

        let first = engine.layout_now(&mut host, LayoutScope::All);
        let second = engine.layout_now(&mut host, LayoutScope::All);
        prop_assert_eq!(&first.layouts, &second.layouts);
        prop_assert!(second.conversions.is_empty());
        prop_assert!(second.warnings.is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Snapshot round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn snapshot_reproduces_positions(shape in board_shape(8), ops in toggles()) {
        let board = board_from_shape(&shape);
        let estimate = EstimateConfig::default();

        let mut original = engine_for(board.clone());
        apply_toggles(&mut original, &ops);
        let mut host = estimate_host(original.board(), original.membership(), original.store(), &estimate);
        let before = original.layout_now(&mut host, LayoutScope::All);

        let json = serde_json::to_string(&original.fold_snapshot()).unwrap();
        let snapshot: FoldSnapshot = serde_json::from_str(&json).unwrap();
        let mut restored = engine_for(board);
        prop_assert!(restored.restore_fold_snapshot(&snapshot).is_empty());

        let mut host = estimate_host(restored.board(), restored.membership(), restored.store(), &estimate);
        let after = restored.layout_now(&mut host, LayoutScope::All);
        prop_assert_eq!(&before.layouts, &after.layouts);
        prop_assert_eq!(restored.global_fold_state(), original.global_fold_state());
    }
}
