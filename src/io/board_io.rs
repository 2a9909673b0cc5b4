use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::board::Board;
use crate::parse::{parse_board, serialize_board};

/// Error type for board file I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

/// Read and parse a markdown board
pub fn load_board(path: &Path) -> Result<Board, BoardError> {
    if !path.exists() {
        return Err(BoardError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| BoardError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let board = parse_board(&text);
    tracing::debug!(path = %path.display(), columns = board.columns.len(), "board loaded");
    Ok(board)
}

/// Serialize the board and write it back atomically
pub fn save_board(path: &Path, board: &Board) -> Result<(), BoardError> {
    atomic_write(path, serialize_board(board).as_bytes()).map_err(|e| BoardError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "board saved");
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
