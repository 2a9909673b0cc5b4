use indexmap::IndexMap;
use serde::Serialize;

use super::host::RenderHost;
use super::position::StackLayout;
use crate::model::config::StickyMode;

/// Where a sticky column's header and footer are pinned. A bottom-anchored
/// rule stops working once the column's content is entirely above the
/// viewport, so such columns switch to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    #[default]
    StickyBottom,
    FixedTop,
}

impl AnchorMode {
    /// Mode for a column whose content boundary sits at `boundary`
    pub fn for_boundary(boundary: f64, scroll_top: f64) -> Self {
        if boundary < scroll_top {
            AnchorMode::FixedTop
        } else {
            AnchorMode::StickyBottom
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorTransition {
    pub column: String,
    pub from: AnchorMode,
    pub to: AnchorMode,
}

/// Per-column anchor state machines plus the frame throttle
#[derive(Debug, Clone, Default)]
pub struct ScrollAnchors {
    boundaries: IndexMap<String, f64>,
    modes: IndexMap<String, AnchorMode>,
    pending_scroll: Option<f64>,
}

impl ScrollAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record content boundaries for the sticky columns of a settled layout
    pub fn capture<H: RenderHost + ?Sized>(&mut self, layout: &StackLayout, host: &H) {
        for position in &layout.positions {
            if position.mode == StickyMode::None {
                self.boundaries.shift_remove(&position.column);
                continue;
            }
            match host.content_boundary(&position.column) {
                Some(boundary) if boundary.is_finite() => {
                    self.boundaries.insert(position.column.clone(), boundary);
                }
                _ => {
                    self.boundaries.shift_remove(&position.column);
                }
            }
        }
    }

    /// Forget boundaries for columns whose measurements are stale
    pub fn invalidate<'a>(&mut self, columns: impl IntoIterator<Item = &'a String>) {
        for column in columns {
            self.boundaries.shift_remove(column);
        }
    }

    pub fn boundary(&self, column_id: &str) -> Option<f64> {
        self.boundaries.get(column_id).copied()
    }

    pub fn mode(&self, column_id: &str) -> AnchorMode {
        self.modes.get(column_id).copied().unwrap_or_default()
    }

    /// Remember the latest scroll position; processed at the next frame
    pub fn note_scroll(&mut self, scroll_top: f64) {
        self.pending_scroll = Some(scroll_top);
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll.is_some()
    }

    /// Process at most one scroll tick per frame, writing changed modes to
    /// the host
    pub fn on_frame<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> Vec<AnchorTransition> {
        let Some(scroll_top) = self.pending_scroll.take() else {
            return Vec::new();
        };
        let transitions = self.update(scroll_top);
        for t in &transitions {
            host.apply_anchor(&t.column, t.to);
        }
        transitions
    }

    /// Recompute every column's mode against `scroll_top`
    pub fn update(&mut self, scroll_top: f64) -> Vec<AnchorTransition> {
        let mut transitions = Vec::new();

        for (column, boundary) in &self.boundaries {
            let to = AnchorMode::for_boundary(*boundary, scroll_top);
            let from = self.modes.insert(column.clone(), to).unwrap_or_default();
            if from != to {
                transitions.push(AnchorTransition {
                    column: column.clone(),
                    from,
                    to,
                });
            }
        }

        // Columns that lost their boundary fall back to sticky positioning
        let boundaries = &self.boundaries;
        self.modes.retain(|column, mode| {
            if boundaries.contains_key(column) {
                return true;
            }
            if *mode != AnchorMode::StickyBottom {
                transitions.push(AnchorTransition {
                    column: column.clone(),
                    from: *mode,
                    to: AnchorMode::StickyBottom,
                });
            }
            false
        });

        transitions
    }
}
