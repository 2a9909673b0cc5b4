use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::board_io::atomic_write;
use crate::model::config::StickyMode;
use crate::model::fold::FoldSnapshot;

/// Persisted fold state (written to .<board-stem>.state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BoardState {
    /// Sticky mode in effect when the state was saved
    #[serde(default)]
    pub sticky_mode: Option<StickyMode>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub folds: FoldSnapshot,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

/// State file that belongs to a board file
pub fn state_path(board_path: &Path) -> PathBuf {
    let stem = board_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("board");
    let name = format!(".{}.state.json", stem);
    match board_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Read the state file. Missing or malformed files mean fresh state.
pub fn read_state(board_path: &Path) -> Option<BoardState> {
    let path = state_path(board_path);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed state file");
            None
        }
    }
}

/// Stamp and write the state file atomically
pub fn write_state(board_path: &Path, state: &BoardState) -> Result<(), StateError> {
    let path = state_path(board_path);
    let stamped = BoardState {
        saved_at: Some(Utc::now()),
        ..state.clone()
    };
    let content = serde_json::to_string_pretty(&stamped)?;
    atomic_write(&path, content.as_bytes()).map_err(|e| StateError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "fold state saved");
    Ok(())
}

/// Delete the state file. Returns whether there was one.
pub fn clear_state(board_path: &Path) -> Result<bool, StateError> {
    let path = state_path(board_path);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StateError::WriteError { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fold::{FoldOrientation, FoldStateStore, GlobalFoldState, TaskFoldState};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn board_path(dir: &TempDir) -> PathBuf {
        dir.path().join("sprint.md")
    }

    #[test]
    fn state_file_sits_beside_the_board() {
        assert_eq!(
            state_path(Path::new("/work/sprint.md")),
            PathBuf::from("/work/.sprint.state.json")
        );
        assert_eq!(state_path(Path::new("board.md")), PathBuf::from(".board.state.json"));
    }

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FoldStateStore::new();
        store.collapse("todo", FoldOrientation::Horizontal);
        store.set_task_collapsed("doing", "doing/0", true);
        store.set_task_fold_state("doing", TaskFoldState::Collapsed);
        store.set_global(GlobalFoldState::Mixed);

        let state = BoardState {
            sticky_mode: Some(StickyMode::TitleOnly),
            saved_at: None,
            folds: store.snapshot(),
        };
        write_state(&board_path(&dir), &state).unwrap();
        let loaded = read_state(&board_path(&dir)).unwrap();

        assert!(loaded.saved_at.is_some());
        assert_eq!(loaded.sticky_mode, Some(StickyMode::TitleOnly));
        assert_eq!(loaded.folds, state.folds);
        let restored = FoldStateStore::from_snapshot(&loaded.folds);
        assert!(restored.is_collapsed("todo"));
        assert!(restored.is_task_collapsed("doing", "doing/0"));
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_state(&board_path(&dir)).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(state_path(&board_path(&dir)), "not json {{{").unwrap();
        assert!(read_state(&board_path(&dir)).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let state: BoardState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, BoardState::default());
    }

    #[test]
    fn clear_reports_whether_a_file_existed() {
        let dir = TempDir::new().unwrap();
        let path = board_path(&dir);
        assert!(!clear_state(&path).unwrap());
        write_state(&path, &BoardState::default()).unwrap();
        assert!(clear_state(&path).unwrap());
        assert!(read_state(&path).is_none());
    }
}
