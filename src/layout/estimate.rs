use super::host::{MemoryHost, RegionMeasurement};
use crate::model::board::{Board, Column};
use crate::model::config::EstimateConfig;
use crate::model::fold::FoldStateStore;
use crate::model::stack::StackMembership;

/// Estimated measurement of one column under its current fold state
pub fn estimate_column(column: &Column, store: &FoldStateStore, e: &EstimateConfig) -> RegionMeasurement {
    if store.is_collapsed(&column.id) {
        return RegionMeasurement::from_regions(e.margin, 0.0, e.collapsed, 0.0, 0.0);
    }
    let content: f64 = column
        .tasks
        .iter()
        .map(|t| {
            if store.is_task_collapsed(&column.id, &t.id) {
                e.collapsed_task
            } else {
                e.task
            }
        })
        .sum();
    RegionMeasurement::from_regions(e.margin, e.header_bar, e.title, content, e.footer)
}

/// Build a host holding estimated measurements and content boundaries.
///
/// Stacks in a row sit side by side starting at the row's top; each row
/// starts below the tallest stack of the row before it.
pub fn estimate_host(
    board: &Board,
    membership: &StackMembership,
    store: &FoldStateStore,
    e: &EstimateConfig,
) -> MemoryHost {
    let mut host = MemoryHost::new();
    let mut row_top = 0.0;
    let mut current_row = None;
    let mut row_height: f64 = 0.0;

    for stack in &membership.stacks {
        if current_row != Some(stack.row) {
            row_top += row_height;
            row_height = 0.0;
            current_row = Some(stack.row);
        }

        let mut y = row_top;
        for column_id in &stack.columns {
            let Some(column) = board.column(column_id) else {
                continue;
            };
            let m = estimate_column(column, store, e);
            host.boundaries.insert(
                column_id.clone(),
                y + m.margin + m.header_bar + m.title + m.content,
            );
            host.measurements.insert(column_id.clone(), m);
            y += m.total;
        }
        row_height = row_height.max(y - row_top);
    }

    host
}
