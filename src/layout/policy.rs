use serde::Serialize;

use super::warning::LayoutWarning;
use crate::model::fold::{FoldOrientation, FoldStateStore};
use crate::model::stack::Stack;

/// Default orientation for a column in a stack of `stack_size` columns
pub fn default_orientation(stack_size: usize) -> FoldOrientation {
    if stack_size > 1 {
        FoldOrientation::Horizontal
    } else {
        FoldOrientation::Vertical
    }
}

pub fn allows(stack_size: usize, orientation: FoldOrientation) -> bool {
    stack_size <= 1 || orientation == FoldOrientation::Horizontal
}

/// Orientation the column should fold in: its stored choice if the policy
/// allows it, otherwise the default for the stack size.
pub fn decide_orientation(
    store: &FoldStateStore,
    column_id: &str,
    stack_size: usize,
) -> FoldOrientation {
    match store.column(column_id).orientation {
        Some(o) if allows(stack_size, o) => o,
        _ => default_orientation(stack_size),
    }
}

/// Orientation used for layout. A collapsed column with no stored
/// orientation falls back to the default and reports it.
pub fn resolve_orientation(
    store: &FoldStateStore,
    column_id: &str,
    stack_size: usize,
) -> (FoldOrientation, Option<LayoutWarning>) {
    let fold = store.column(column_id);
    let orientation = decide_orientation(store, column_id, stack_size);
    let warning = (fold.collapsed && fold.orientation.is_none()).then(|| {
        LayoutWarning::OrientationDefaulted {
            column: column_id.to_string(),
            fallback: orientation,
        }
    });
    (orientation, warning)
}

/// A forced orientation change made by [`enforce`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldConversion {
    pub column: String,
    pub from: Option<FoldOrientation>,
    pub to: FoldOrientation,
}

/// Convert every collapsed member of a multi-column stack to horizontal.
/// A column alone in its stack may keep either orientation.
///
/// Returns the conversions made; empty when the stack already complies, so
/// a second call in a row never changes anything.
pub fn enforce(store: &mut FoldStateStore, stack: &Stack) -> Vec<FoldConversion> {
    if stack.len() <= 1 {
        return Vec::new();
    }

    let mut conversions = Vec::new();
    for column_id in &stack.columns {
        let fold = store.column(column_id);
        if !fold.collapsed || fold.orientation == Some(FoldOrientation::Horizontal) {
            continue;
        }
        store.set_orientation(column_id, FoldOrientation::Horizontal);
        tracing::debug!(column = %column_id, stack = %stack.id(), "fold converted to horizontal");
        conversions.push(FoldConversion {
            column: column_id.clone(),
            from: fold.orientation,
            to: FoldOrientation::Horizontal,
        });
    }
    conversions
}
