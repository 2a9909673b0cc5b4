use serde::Serialize;

use super::host::{RegionMeasurement, RenderHost};
use super::policy;
use super::warning::LayoutWarning;
use crate::model::board::Board;
use crate::model::config::StickyMode;
use crate::model::fold::{FoldOrientation, FoldStateStore};
use crate::model::stack::{Stack, StackId};

/// One column of a stack, ready for the calculator
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInput {
    pub id: String,
    pub measurement: RegionMeasurement,
    pub sticky_eligible: bool,
    pub collapsed: bool,
    pub orientation: FoldOrientation,
}

/// Sticky offsets of one region from the stack's top and bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RegionOffsets {
    pub top: f64,
    pub bottom: f64,
}

/// Computed placement of one column. Regions that do not take part in
/// stickiness under the column's effective mode are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub column: String,
    pub mode: StickyMode,
    pub margin: Option<RegionOffsets>,
    pub header_bar: Option<RegionOffsets>,
    pub title: Option<RegionOffsets>,
    pub footer: Option<RegionOffsets>,
    pub z_index: i32,
    /// One above `z_index` so the bar paints over earlier titles
    pub header_bar_z_index: i32,
    /// Space reserved above this column by the columns before it
    pub content_padding: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    /// Columns stacked vertically with sticky offsets
    Stacked,
    /// Every column is vertically folded; render one horizontal strip
    HorizontalStrip,
}

/// Result of one successful pass over a stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackLayout {
    pub stack: StackId,
    pub arrangement: Arrangement,
    /// Empty for a horizontal strip
    pub positions: Vec<Position>,
}

impl StackLayout {
    pub fn position(&self, column_id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.column == column_id)
    }
}

#[derive(Clone, Copy)]
enum Region {
    Margin,
    HeaderBar,
    Title,
    Footer,
}

impl Region {
    fn height(self, m: &RegionMeasurement) -> f64 {
        match self {
            Region::Margin => m.margin,
            Region::HeaderBar => m.header_bar,
            Region::Title => m.title,
            Region::Footer => m.footer,
        }
    }

    fn participates(self, mode: StickyMode) -> bool {
        match mode {
            StickyMode::None => false,
            StickyMode::TitleOnly => matches!(self, Region::Title),
            StickyMode::Full => true,
        }
    }

    fn slot(self, p: &mut Position) -> &mut Option<RegionOffsets> {
        match self {
            Region::Margin => &mut p.margin,
            Region::HeaderBar => &mut p.header_bar,
            Region::Title => &mut p.title,
            Region::Footer => &mut p.footer,
        }
    }
}

/// Visual order, top to bottom; content sits between title and footer
const TOP_ORDER: [Region; 4] = [Region::Margin, Region::HeaderBar, Region::Title, Region::Footer];
const BOTTOM_ORDER: [Region; 4] = [Region::Footer, Region::Title, Region::HeaderBar, Region::Margin];

/// True when every column is collapsed in vertical orientation
pub fn is_horizontal_strip(columns: &[ColumnInput]) -> bool {
    !columns.is_empty()
        && columns
            .iter()
            .all(|c| c.collapsed && c.orientation == FoldOrientation::Vertical)
}

/// Compute offsets, z-layers and padding for the columns of one stack.
///
/// Top-anchored offsets run top to bottom, bottom-anchored offsets bottom
/// to top, then content padding. Each column's effective sticky mode picks
/// which regions advance the running offset.
pub fn compute_stack(
    stack: StackId,
    columns: &[ColumnInput],
    sticky_mode: StickyMode,
    z_base: i32,
) -> StackLayout {
    if is_horizontal_strip(columns) {
        return StackLayout {
            stack,
            arrangement: Arrangement::HorizontalStrip,
            positions: Vec::new(),
        };
    }

    let len = columns.len() as i32;
    let mut positions: Vec<Position> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let z_index = z_base + (len - i as i32);
            Position {
                column: c.id.clone(),
                mode: sticky_mode.effective(c.sticky_eligible),
                margin: None,
                header_bar: None,
                title: None,
                footer: None,
                z_index,
                header_bar_z_index: z_index + 1,
                content_padding: 0.0,
            }
        })
        .collect();

    let mut running = 0.0;
    for (c, p) in columns.iter().zip(positions.iter_mut()) {
        let mode = p.mode;
        for region in TOP_ORDER {
            if region.participates(mode) {
                region.slot(p).get_or_insert_default().top = running;
                running += region.height(&c.measurement);
            }
        }
    }

    let mut running = 0.0;
    for (c, p) in columns.iter().zip(positions.iter_mut()).rev() {
        let mode = p.mode;
        for region in BOTTOM_ORDER {
            if region.participates(mode) {
                region.slot(p).get_or_insert_default().bottom = running;
                running += region.height(&c.measurement);
            }
        }
    }

    for i in 1..positions.len() {
        let prev = &columns[i - 1].measurement;
        positions[i].content_padding =
            positions[i - 1].content_padding + prev.total + prev.margin;
    }

    StackLayout {
        stack,
        arrangement: Arrangement::Stacked,
        positions,
    }
}

/// Successful input gathering: the inputs plus non-fatal warnings
pub type GatheredInputs = (Vec<ColumnInput>, Vec<LayoutWarning>);

/// Read fresh measurements and fold state for every column in a stack.
///
/// Columns the host no longer has are skipped with a warning. An invalid
/// measurement, or a stack with nothing left to measure, fails the whole
/// stack so no offsets are partially applied.
pub fn gather_inputs<H: RenderHost + ?Sized>(
    stack: &Stack,
    board: &Board,
    store: &FoldStateStore,
    host: &H,
) -> Result<GatheredInputs, Vec<LayoutWarning>> {
    let mut inputs = Vec::with_capacity(stack.len());
    let mut warnings = Vec::new();

    for column_id in &stack.columns {
        let (Some(column), Some(measurement)) = (board.column(column_id), host.measure(column_id))
        else {
            warnings.push(
                LayoutWarning::MissingColumn {
                    column: column_id.clone(),
                }
                .logged(),
            );
            continue;
        };
        if let Some((region, value)) = measurement.invalid_region() {
            warnings.push(
                LayoutWarning::InvalidMeasurement {
                    column: column_id.clone(),
                    region,
                    value,
                }
                .logged(),
            );
            return Err(warnings);
        }

        let (orientation, defaulted) = policy::resolve_orientation(store, column_id, stack.len());
        warnings.extend(defaulted.map(LayoutWarning::logged));
        inputs.push(ColumnInput {
            id: column_id.clone(),
            measurement,
            sticky_eligible: column.is_sticky(),
            collapsed: store.is_collapsed(column_id),
            orientation,
        });
    }

    if inputs.is_empty() {
        warnings.push(LayoutWarning::EmptyStack { stack: stack.id() }.logged());
        return Err(warnings);
    }
    Ok((inputs, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(id: &str, m: RegionMeasurement) -> ColumnInput {
        ColumnInput {
            id: id.to_string(),
            measurement: m,
            sticky_eligible: true,
            collapsed: false,
            orientation: FoldOrientation::Vertical,
        }
    }

    fn titled(id: &str, title: f64) -> ColumnInput {
        input(id, RegionMeasurement::from_regions(0.0, 0.0, title, 100.0, 0.0))
    }

    #[test]
    fn title_only_offsets_and_layers() {
        let columns = vec![titled("a", 20.0), titled("b", 25.0), titled("c", 30.0)];
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::TitleOnly, 1000);

        let tops: Vec<f64> = layout.positions.iter().map(|p| p.title.unwrap().top).collect();
        assert_eq!(tops, vec![0.0, 20.0, 45.0]);
        let bottoms: Vec<f64> = layout.positions.iter().map(|p| p.title.unwrap().bottom).collect();
        assert_eq!(bottoms, vec![55.0, 30.0, 0.0]);

        let z: Vec<i32> = layout.positions.iter().map(|p| p.z_index).collect();
        assert_eq!(z, vec![1003, 1002, 1001]);
        assert_eq!(layout.positions[0].header_bar_z_index, 1004);

        for p in &layout.positions {
            assert!(p.margin.is_none());
            assert!(p.header_bar.is_none());
            assert!(p.footer.is_none());
        }
    }

    #[test]
    fn full_mode_follows_visual_order() {
        let m = RegionMeasurement::from_regions(2.0, 3.0, 10.0, 50.0, 5.0);
        let columns = vec![input("a", m), input("b", m)];
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::Full, 0);
        let a = &layout.positions[0];
        let b = &layout.positions[1];

        assert_eq!(a.margin.unwrap().top, 0.0);
        assert_eq!(a.header_bar.unwrap().top, 2.0);
        assert_eq!(a.title.unwrap().top, 5.0);
        assert_eq!(a.footer.unwrap().top, 15.0);
        assert_eq!(b.margin.unwrap().top, 20.0);
        assert_eq!(b.footer.unwrap().top, 35.0);

        // Bottom pass runs footer, title, header-bar, margin from the last column up
        assert_eq!(b.footer.unwrap().bottom, 0.0);
        assert_eq!(b.title.unwrap().bottom, 5.0);
        assert_eq!(b.header_bar.unwrap().bottom, 15.0);
        assert_eq!(b.margin.unwrap().bottom, 18.0);
        assert_eq!(a.footer.unwrap().bottom, 20.0);
        assert_eq!(a.margin.unwrap().bottom, 38.0);
    }

    #[test]
    fn ineligible_columns_get_no_offsets_and_do_not_advance() {
        let mut columns = vec![titled("a", 20.0), titled("b", 25.0), titled("c", 30.0)];
        columns[1].sticky_eligible = false;
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::Full, 1000);
        assert_eq!(layout.positions[1].mode, StickyMode::None);
        assert_eq!(layout.positions[1].title, None);
        assert_eq!(layout.positions[2].title.unwrap().top, 20.0);
        // Layers are still assigned
        assert_eq!(layout.positions[1].z_index, 1002);
    }

    #[test]
    fn global_none_assigns_nothing() {
        let columns = vec![titled("a", 20.0), titled("b", 25.0)];
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::None, 1000);
        assert!(layout.positions.iter().all(|p| p.title.is_none()));
    }

    #[test]
    fn content_padding_accumulates_total_and_margin() {
        let columns = vec![
            input("a", RegionMeasurement::from_regions(4.0, 0.0, 20.0, 100.0, 0.0)),
            input("b", RegionMeasurement::from_regions(6.0, 0.0, 20.0, 50.0, 0.0)),
            input("c", RegionMeasurement::from_regions(0.0, 0.0, 20.0, 10.0, 0.0)),
        ];
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::Full, 1000);
        let padding: Vec<f64> = layout.positions.iter().map(|p| p.content_padding).collect();
        // a: total 124 + margin 4; b: total 76 + margin 6
        assert_eq!(padding, vec![0.0, 128.0, 210.0]);
    }

    #[test]
    fn all_vertically_folded_becomes_strip() {
        let mut columns = vec![titled("a", 20.0)];
        columns[0].collapsed = true;
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::Full, 1000);
        assert_eq!(layout.arrangement, Arrangement::HorizontalStrip);
        assert!(layout.positions.is_empty());

        columns[0].orientation = FoldOrientation::Horizontal;
        let layout = compute_stack(StackId::from("a"), &columns, StickyMode::Full, 1000);
        assert_eq!(layout.arrangement, Arrangement::Stacked);
        assert!(!is_horizontal_strip(&[]));
    }
}
