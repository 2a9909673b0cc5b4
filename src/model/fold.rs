use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};

/// Which way a collapsed column shrinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldOrientation {
    /// A thin horizontal strip remains
    Vertical,
    /// A thin vertical strip remains
    Horizontal,
}

impl FoldOrientation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Some(FoldOrientation::Vertical),
            "horizontal" => Some(FoldOrientation::Horizontal),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            FoldOrientation::Vertical => FoldOrientation::Horizontal,
            FoldOrientation::Horizontal => FoldOrientation::Vertical,
        }
    }
}

impl fmt::Display for FoldOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldOrientation::Vertical => write!(f, "vertical"),
            FoldOrientation::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Fold state of one column. An absent entry means expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnFold {
    pub collapsed: bool,
    /// `None` when never set or restored from a malformed value
    pub orientation: Option<FoldOrientation>,
}

/// Manual fold state the user last applied to all tasks of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFoldState {
    Collapsed,
    Expanded,
}

/// Aggregate fold state across the board, drives toggle-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalFoldState {
    AllCollapsed,
    AllExpanded,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TaskFolds {
    collapsed: IndexSet<String>,
    manual: Option<TaskFoldState>,
}

/// Owned store for every fold flag on the board.
///
/// Mutated only by user fold operations and fold-mode policy corrections;
/// read by every layout component.
#[derive(Debug, Clone, Default)]
pub struct FoldStateStore {
    columns: IndexMap<String, ColumnFold>,
    tasks: IndexMap<String, TaskFolds>,
    global: GlobalFoldState,
}

impl FoldStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, column_id: &str) -> ColumnFold {
        self.columns.get(column_id).copied().unwrap_or_default()
    }

    pub fn is_collapsed(&self, column_id: &str) -> bool {
        self.column(column_id).collapsed
    }

    pub fn collapse(&mut self, column_id: &str, orientation: FoldOrientation) {
        let entry = self.columns.entry(column_id.to_string()).or_default();
        entry.collapsed = true;
        entry.orientation = Some(orientation);
    }

    /// Expand a column, keeping its orientation for the next fold
    pub fn expand(&mut self, column_id: &str) {
        if let Some(entry) = self.columns.get_mut(column_id) {
            entry.collapsed = false;
        }
    }

    pub fn set_orientation(&mut self, column_id: &str, orientation: FoldOrientation) {
        self.columns
            .entry(column_id.to_string())
            .or_default()
            .orientation = Some(orientation);
    }

    /// Ids of every column currently collapsed, in insertion order
    pub fn collapsed_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, f)| f.collapsed)
            .map(|(id, _)| id.as_str())
    }

    pub fn is_task_collapsed(&self, column_id: &str, task_id: &str) -> bool {
        self.tasks
            .get(column_id)
            .is_some_and(|t| t.collapsed.contains(task_id))
    }

    pub fn set_task_collapsed(&mut self, column_id: &str, task_id: &str, collapsed: bool) {
        let entry = self.tasks.entry(column_id.to_string()).or_default();
        if collapsed {
            entry.collapsed.insert(task_id.to_string());
        } else {
            entry.collapsed.shift_remove(task_id);
        }
    }

    pub fn task_fold_state(&self, column_id: &str) -> Option<TaskFoldState> {
        self.tasks.get(column_id).and_then(|t| t.manual)
    }

    pub fn set_task_fold_state(&mut self, column_id: &str, state: TaskFoldState) {
        self.tasks.entry(column_id.to_string()).or_default().manual = Some(state);
    }

    pub fn global(&self) -> GlobalFoldState {
        self.global
    }

    pub fn set_global(&mut self, state: GlobalFoldState) {
        self.global = state;
    }

    /// Serializable copy for the persistence layer
    pub fn snapshot(&self) -> FoldSnapshot {
        let mut snapshot = FoldSnapshot {
            global: self.global,
            ..Default::default()
        };
        for (id, fold) in &self.columns {
            if fold.collapsed {
                snapshot.collapsed_columns.insert(id.clone());
            }
            if let Some(o) = fold.orientation {
                snapshot.orientations.insert(id.clone(), o);
            }
        }
        for (id, folds) in &self.tasks {
            if !folds.collapsed.is_empty() {
                snapshot
                    .collapsed_tasks
                    .insert(id.clone(), folds.collapsed.clone());
            }
            if let Some(state) = folds.manual {
                snapshot.task_fold_states.insert(id.clone(), state);
            }
        }
        snapshot
    }

    /// Rebuild a store from a persisted snapshot, verbatim
    pub fn from_snapshot(snapshot: &FoldSnapshot) -> Self {
        let mut store = FoldStateStore {
            global: snapshot.global,
            ..Default::default()
        };
        for id in &snapshot.collapsed_columns {
            store.columns.insert(
                id.clone(),
                ColumnFold {
                    collapsed: true,
                    orientation: None,
                },
            );
        }
        for (id, o) in &snapshot.orientations {
            store.columns.entry(id.clone()).or_default().orientation = Some(*o);
        }
        for (id, tasks) in &snapshot.collapsed_tasks {
            store.tasks.entry(id.clone()).or_default().collapsed = tasks.clone();
        }
        for (id, state) in &snapshot.task_fold_states {
            store.tasks.entry(id.clone()).or_default().manual = Some(*state);
        }
        store
    }
}

/// Persisted fold state, restored verbatim before the first layout pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSnapshot {
    #[serde(default)]
    pub collapsed_columns: IndexSet<String>,
    /// Unknown orientation strings are dropped on load
    #[serde(default, deserialize_with = "lenient_orientations")]
    pub orientations: IndexMap<String, FoldOrientation>,
    #[serde(default)]
    pub collapsed_tasks: IndexMap<String, IndexSet<String>>,
    #[serde(default)]
    pub task_fold_states: IndexMap<String, TaskFoldState>,
    #[serde(default)]
    pub global: GlobalFoldState,
}

fn lenient_orientations<'de, D>(deserializer: D) -> Result<IndexMap<String, FoldOrientation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, value)| FoldOrientation::parse(&value).map(|o| (id, o)))
        .collect())
}
