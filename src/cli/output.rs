use serde::Serialize;

use crate::layout::engine::LayoutReport;
use crate::layout::position::{Arrangement, RegionOffsets, StackLayout};
use crate::layout::scroll::{AnchorMode, AnchorTransition};
use crate::model::board::Board;
use crate::model::config::StickyMode;
use crate::model::fold::{ColumnFold, FoldOrientation, FoldStateStore};
use crate::model::stack::{Stack, StackId};
use crate::util::unicode::{display_width, fit_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ColumnJson {
    pub id: String,
    pub title: String,
    pub sticky: bool,
    pub tasks: usize,
    #[serde(flatten)]
    pub fold: FoldJson,
}

#[derive(Serialize)]
pub struct StackJson {
    pub id: StackId,
    pub row: usize,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct FoldJson {
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<FoldOrientation>,
}

#[derive(Serialize)]
pub struct LayoutJson<'a> {
    pub sticky_mode: StickyMode,
    #[serde(flatten)]
    pub report: &'a LayoutReport,
}

#[derive(Serialize)]
pub struct AnchorJson {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<f64>,
    pub mode: AnchorMode,
}

#[derive(Serialize)]
pub struct ScrollJson {
    pub scroll_top: f64,
    pub anchors: Vec<AnchorJson>,
    pub transitions: Vec<AnchorTransition>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn fold_to_json(fold: ColumnFold) -> FoldJson {
    FoldJson {
        collapsed: fold.collapsed,
        orientation: fold.orientation,
    }
}

pub fn stack_to_json(stack: &Stack, board: &Board, store: &FoldStateStore) -> StackJson {
    let columns = stack
        .columns
        .iter()
        .filter_map(|id| board.column(id))
        .map(|c| ColumnJson {
            id: c.id.clone(),
            title: c.title.clone(),
            sticky: c.is_sticky(),
            tasks: c.tasks.len(),
            fold: fold_to_json(store.column(&c.id)),
        })
        .collect();
    StackJson {
        id: stack.id(),
        row: stack.row,
        columns,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Short description of a column's fold state
pub fn format_fold(fold: ColumnFold) -> String {
    match (fold.collapsed, fold.orientation) {
        (false, _) => "expanded".to_string(),
        (true, Some(o)) => format!("folded {}", o),
        (true, None) => "folded".to_string(),
    }
}

/// Format a stack and its member columns
pub fn format_stack(stack: &Stack, board: &Board, store: &FoldStateStore) -> Vec<String> {
    let mut lines = vec![format!("== {} (row {}) ==", stack.id(), stack.row)];
    let columns: Vec<_> = stack.columns.iter().filter_map(|id| board.column(id)).collect();
    let id_w = columns.iter().map(|c| display_width(&c.id)).max().unwrap_or(0);
    let title_w = columns
        .iter()
        .map(|c| display_width(&c.title))
        .max()
        .unwrap_or(0)
        .min(32);

    for c in columns {
        let sticky = if c.is_sticky() { "sticky" } else { "" };
        lines.push(format!(
            "  {}  {}  {}  {}",
            fit_to_width(&c.id, id_w),
            fit_to_width(&c.title, title_w),
            fit_to_width(sticky, 6),
            format_fold(store.column(&c.id)),
        ));
    }
    lines
}

fn offset_cell(offsets: Option<RegionOffsets>, pick: fn(RegionOffsets) -> f64) -> String {
    offsets.map_or_else(|| "-".to_string(), |o| pick(o).to_string())
}

/// Format the computed positions of one stack as a table. Offsets shown
/// are the title's, the region every sticky mode pins.
pub fn format_layout(layout: &StackLayout) -> Vec<String> {
    if layout.arrangement == Arrangement::HorizontalStrip {
        return vec![format!("== {} (horizontal strip) ==", layout.stack)];
    }

    let mut lines = vec![format!("== {} (stacked) ==", layout.stack)];
    let id_w = layout
        .positions
        .iter()
        .map(|p| display_width(&p.column))
        .chain(std::iter::once(display_width("column")))
        .max()
        .unwrap_or(0);

    lines.push(format!(
        "  {}  {}  {:>6}  {:>6}  {:>5}  {:>6}",
        fit_to_width("column", id_w),
        fit_to_width("mode", 9),
        "top",
        "bottom",
        "z",
        "pad"
    ));
    for p in &layout.positions {
        lines.push(format!(
            "  {}  {}  {:>6}  {:>6}  {:>5}  {:>6}",
            fit_to_width(&p.column, id_w),
            fit_to_width(&p.mode.to_string(), 9),
            offset_cell(p.title, |o| o.top),
            offset_cell(p.title, |o| o.bottom),
            p.z_index,
            p.content_padding
        ));
    }
    lines
}

pub fn format_anchor(column: &str, boundary: Option<f64>, mode: AnchorMode) -> String {
    let mode = match mode {
        AnchorMode::StickyBottom => "sticky-bottom",
        AnchorMode::FixedTop => "fixed-top",
    };
    match boundary {
        Some(b) => format!("  {}  {} (content ends at {})", column, mode, b),
        None => format!("  {}  {}", column, mode),
    }
}
