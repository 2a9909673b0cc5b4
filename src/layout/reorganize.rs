use serde::Serialize;

use super::warning::LayoutWarning;
use crate::model::board::Board;
use crate::model::stack::{Stack, StackId, StackMembership};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MembershipChange {
    /// The column (and the joined columns after it) moved into `into`
    Joined { into: StackId, moved: Vec<String> },
    /// The stack was split at the column; `created` are the new stacks
    Split { created: Vec<StackId> },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reorganization {
    pub column: String,
    pub change: MembershipChange,
    /// Stacks needing policy enforcement and a new layout, in board order
    pub affected: Vec<StackId>,
    /// Stack ids that no longer exist
    pub removed: Vec<StackId>,
}

/// Bring `membership` in line with the current stack tag of `column_id`.
///
/// Moves the column between groupings in place instead of deriving the
/// whole membership again.
pub fn reorganize_for_column(
    membership: &mut StackMembership,
    board: &Board,
    column_id: &str,
) -> Result<Reorganization, LayoutWarning> {
    let missing = || LayoutWarning::MissingColumn {
        column: column_id.to_string(),
    };
    let column = board.column(column_id).ok_or_else(missing)?;
    let idx = membership.index_of_column(column_id).ok_or_else(missing)?;
    let pos = membership.stacks[idx].position(column_id).ok_or_else(missing)?;

    let reorganization = if column.is_stacked() {
        join(membership, board, idx, pos, column_id)
    } else {
        split(membership, board, idx, pos, column_id)
    };

    let dropped = membership.remove_empty();
    if dropped > 0 {
        tracing::debug!(dropped, "removed empty stacks");
    }
    if reorganization.change != MembershipChange::Unchanged {
        tracing::info!(
            column = %column_id,
            affected = reorganization.affected.len(),
            "stacks reorganized"
        );
    }
    Ok(reorganization)
}

fn unchanged(column_id: &str) -> Reorganization {
    Reorganization {
        column: column_id.to_string(),
        change: MembershipChange::Unchanged,
        affected: Vec::new(),
        removed: Vec::new(),
    }
}

fn join(
    membership: &mut StackMembership,
    board: &Board,
    idx: usize,
    pos: usize,
    column_id: &str,
) -> Reorganization {
    // Already inside a stack, or nothing before it in the same row
    if pos != 0 || idx == 0 || membership.stacks[idx - 1].row != membership.stacks[idx].row {
        return unchanged(column_id);
    }

    let old_id = membership.stacks[idx].id();
    let source = &mut membership.stacks[idx];
    let take = source
        .columns
        .iter()
        .take_while(|c| board.column(c).is_some_and(|col| col.is_stacked()))
        .count();
    let moved: Vec<String> = source.columns.drain(..take).collect();
    let source_left = !source.is_empty();
    if !source_left {
        membership.stacks.remove(idx);
    }
    membership.stacks[idx - 1].columns.extend(moved.iter().cloned());

    let target = idx - 1;
    let last = if source_left { idx } else { target };
    let mut affected = Vec::new();
    push_neighbour(membership, &mut affected, target, -1);
    affected.push(membership.stacks[target].id());
    if source_left {
        affected.push(membership.stacks[idx].id());
    }
    push_neighbour(membership, &mut affected, last, 1);

    Reorganization {
        column: column_id.to_string(),
        change: MembershipChange::Joined {
            into: membership.stacks[target].id(),
            moved,
        },
        affected,
        removed: vec![old_id],
    }
}

fn split(
    membership: &mut StackMembership,
    board: &Board,
    idx: usize,
    pos: usize,
    column_id: &str,
) -> Reorganization {
    // The head of a stack has nothing to split from
    if pos == 0 {
        return unchanged(column_id);
    }

    let row = membership.stacks[idx].row;
    let tail = membership.stacks[idx].columns.split_off(pos);

    // A later column without the tag starts yet another stack
    let mut created: Vec<Stack> = Vec::new();
    for (i, column) in tail.into_iter().enumerate() {
        let joins = i > 0 && board.column(&column).is_some_and(|c| c.is_stacked());
        match created.last_mut() {
            Some(group) if joins => group.columns.push(column),
            _ => created.push(Stack {
                row,
                columns: vec![column],
            }),
        }
    }

    let created_ids: Vec<StackId> = created.iter().map(Stack::id).collect();
    let count = created.len();
    membership.stacks.splice(idx + 1..idx + 1, created);

    let mut affected = Vec::new();
    push_neighbour(membership, &mut affected, idx, -1);
    affected.push(membership.stacks[idx].id());
    affected.extend(created_ids.iter().cloned());
    push_neighbour(membership, &mut affected, idx + count, 1);

    Reorganization {
        column: column_id.to_string(),
        change: MembershipChange::Split {
            created: created_ids,
        },
        affected,
        removed: Vec::new(),
    }
}

/// Add the stack beside `idx` (direction -1 or 1) if it shares the row
fn push_neighbour(
    membership: &StackMembership,
    affected: &mut Vec<StackId>,
    idx: usize,
    direction: isize,
) {
    let Some(other) = idx.checked_add_signed(direction) else {
        return;
    };
    if let (Some(here), Some(there)) = (membership.stacks.get(idx), membership.stacks.get(other))
        && here.row == there.row
        && !there.is_empty()
    {
        affected.push(there.id());
    }
}
