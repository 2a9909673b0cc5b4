use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

pub const CONFIG_FILE: &str = "stackboard.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Config file looked up next to the board
pub fn default_config_path(board_path: &Path) -> PathBuf {
    match board_path.parent() {
        Some(dir) => dir.join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

/// Load configuration. An explicit path must exist; the default location
/// falls back to built-in defaults when absent.
pub fn load_config(board_path: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path(board_path);
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };

    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::StickyMode;
    use tempfile::TempDir;

    #[test]
    fn missing_default_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("board.md"), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_beside_board_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[layout]\nsticky_mode = \"titleonly\"\ndebounce_ms = 50\n",
        )
        .unwrap();
        let config = load_config(&dir.path().join("board.md"), None).unwrap();
        assert_eq!(config.layout.sticky_mode, StickyMode::TitleOnly);
        assert_eq!(config.layout.debounce_ms, 50);
        assert_eq!(config.layout.z_base, 1000);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load_config(&dir.path().join("board.md"), Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn bad_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[layout\n").unwrap();
        let err = load_config(&dir.path().join("board.md"), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
