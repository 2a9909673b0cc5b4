use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Board;

/// Identifies a stack by the id of its head (first) column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(pub String);

impl StackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StackId {
    fn from(s: &str) -> Self {
        StackId(s.to_string())
    }
}

/// A contiguous run of columns laid out as one vertical group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    pub row: usize,
    /// Column ids, top to bottom. Never empty once published.
    pub columns: Vec<String>,
}

impl Stack {
    pub fn id(&self) -> StackId {
        StackId(self.columns.first().cloned().unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.columns.iter().any(|c| c == column_id)
    }

    pub fn position(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column_id)
    }
}

/// Which columns are grouped into which stacks, in board order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StackMembership {
    pub stacks: Vec<Stack>,
}

impl StackMembership {
    /// Derive stacks from column tags.
    ///
    /// A column starts a new stack when it is the first column, lacks the
    /// stack tag, or sits in a different row than its predecessor.
    pub fn derive(board: &Board) -> Self {
        let mut stacks: Vec<Stack> = Vec::new();
        for column in &board.columns {
            let row = column.row();
            match stacks.last_mut() {
                Some(current) if column.is_stacked() && current.row == row => {
                    current.columns.push(column.id.clone());
                }
                _ => stacks.push(Stack {
                    row,
                    columns: vec![column.id.clone()],
                }),
            }
        }
        StackMembership { stacks }
    }

    pub fn get(&self, id: &StackId) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.columns.first() == Some(&id.0))
    }

    /// Index of the stack containing `column_id`
    pub fn index_of_column(&self, column_id: &str) -> Option<usize> {
        self.stacks.iter().position(|s| s.contains(column_id))
    }

    pub fn stack_of(&self, column_id: &str) -> Option<&Stack> {
        self.index_of_column(column_id).map(|i| &self.stacks[i])
    }

    /// Size of the stack holding `column_id` (0 when the column is unknown)
    pub fn stack_size(&self, column_id: &str) -> usize {
        self.stack_of(column_id).map_or(0, Stack::len)
    }

    pub fn ids(&self) -> Vec<StackId> {
        self.stacks.iter().map(Stack::id).collect()
    }

    /// Drop stacks left empty by a structural edit
    pub fn remove_empty(&mut self) -> usize {
        let before = self.stacks.len();
        self.stacks.retain(|s| !s.is_empty());
        before - self.stacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_board;

    #[test]
    fn derive_groups_tagged_columns() {
        let board = parse_board(
            "\
## A
## B #stack
## C #stack
## D
## E #stack #row2
## F #stack #row2
",
        );
        let m = StackMembership::derive(&board);
        let groups: Vec<Vec<&str>> = m
            .stacks
            .iter()
            .map(|s| s.columns.iter().map(String::as_str).collect())
            .collect();
        // E starts a new stack because it changes rows
        assert_eq!(groups, vec![vec!["a", "b", "c"], vec!["d"], vec!["e", "f"]]);
        assert_eq!(m.stacks[2].row, 2);
        assert_eq!(m.stack_size("b"), 3);
        assert_eq!(m.stack_size("missing"), 0);
    }

    #[test]
    fn first_column_stack_tag_is_ignored() {
        let board = parse_board("## A #stack\n## B\n");
        let m = StackMembership::derive(&board);
        assert_eq!(m.stacks.len(), 2);
    }

    #[test]
    fn lookup_by_head_id() {
        let board = parse_board("## A\n## B #stack\n");
        let m = StackMembership::derive(&board);
        assert!(m.get(&StackId::from("a")).is_some());
        assert!(m.get(&StackId::from("b")).is_none());
        assert_eq!(m.stack_of("b").map(Stack::id), Some(StackId::from("a")));
    }
}
