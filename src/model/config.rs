use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which column regions take part in sticky offsetting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickyMode {
    None,
    TitleOnly,
    #[default]
    Full,
}

impl StickyMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Some(StickyMode::None),
            "titleonly" | "title-only" => Some(StickyMode::TitleOnly),
            "full" => Some(StickyMode::Full),
            _ => None,
        }
    }

    /// Per-column resolution of the global mode and eligibility
    pub fn effective(self, sticky_eligible: bool) -> StickyMode {
        if sticky_eligible { self } else { StickyMode::None }
    }
}

impl fmt::Display for StickyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StickyMode::None => write!(f, "none"),
            StickyMode::TitleOnly => write!(f, "titleonly"),
            StickyMode::Full => write!(f, "full"),
        }
    }
}

/// Configuration from stackboard.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub estimate: EstimateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub sticky_mode: StickyMode,
    /// Quiet period before a debounced layout fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Base z-layer; a stack of n columns uses base+1 ..= base+n+1
    #[serde(default = "default_z_base")]
    pub z_base: i32,
    /// Frame boundaries to wait before restoring scroll offsets
    #[serde(default = "default_settle_frames")]
    pub settle_frames: u8,
}

impl LayoutConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            sticky_mode: StickyMode::Full,
            debounce_ms: default_debounce_ms(),
            z_base: default_z_base(),
            settle_frames: default_settle_frames(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_z_base() -> i32 {
    1000
}

fn default_settle_frames() -> u8 {
    2
}

/// Region heights used when no renderer supplies measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub margin: f64,
    pub header_bar: f64,
    pub title: f64,
    pub footer: f64,
    /// Height of one expanded task
    pub task: f64,
    /// Content height of a collapsed task
    pub collapsed_task: f64,
    /// Total height of a vertically collapsed column
    pub collapsed: f64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        EstimateConfig {
            margin: 4.0,
            header_bar: 0.0,
            title: 28.0,
            footer: 0.0,
            task: 36.0,
            collapsed_task: 20.0,
            collapsed: 28.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.layout.sticky_mode, StickyMode::Full);
        assert_eq!(config.layout.debounce_ms, 150);
        assert_eq!(config.layout.z_base, 1000);
        assert_eq!(config.layout.settle_frames, 2);
        assert_eq!(config.estimate, EstimateConfig::default());
    }

    #[test]
    fn partial_sections() {
        let config: Config = toml::from_str(
            r#"
[layout]
sticky_mode = "titleonly"

[estimate]
task = 50.0
"#,
        )
        .unwrap();
        assert_eq!(config.layout.sticky_mode, StickyMode::TitleOnly);
        assert_eq!(config.layout.debounce(), Duration::from_millis(150));
        assert_eq!(config.estimate.task, 50.0);
        assert_eq!(config.estimate.title, 28.0);
    }

    #[test]
    fn effective_mode() {
        assert_eq!(StickyMode::Full.effective(true), StickyMode::Full);
        assert_eq!(StickyMode::TitleOnly.effective(false), StickyMode::None);
        assert_eq!(StickyMode::None.effective(true), StickyMode::None);
    }

    #[test]
    fn parse_mode() {
        assert_eq!(StickyMode::parse("Title-Only"), Some(StickyMode::TitleOnly));
        assert_eq!(StickyMode::parse("sideways"), None);
    }
}
