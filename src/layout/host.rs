use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::position::StackLayout;
use super::scheduler::LayoutScope;
use super::scroll::AnchorMode;
use crate::model::stack::StackId;

/// Heights of the logical regions of one column, read fresh every pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionMeasurement {
    pub margin: f64,
    pub header_bar: f64,
    pub title: f64,
    pub footer: f64,
    pub content: f64,
    pub total: f64,
}

impl RegionMeasurement {
    /// Build a measurement whose total is the sum of its regions
    pub fn from_regions(margin: f64, header_bar: f64, title: f64, content: f64, footer: f64) -> Self {
        RegionMeasurement {
            margin,
            header_bar,
            title,
            footer,
            content,
            total: margin + header_bar + title + content + footer,
        }
    }

    /// First region that is negative or not finite
    pub fn invalid_region(&self) -> Option<(&'static str, f64)> {
        [
            ("margin", self.margin),
            ("header-bar", self.header_bar),
            ("title", self.title),
            ("footer", self.footer),
            ("content", self.content),
            ("total", self.total),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// Box dimensions pinned on a scroll region during a mutation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

/// The render layer the engine measures and writes styles into.
///
/// Queries are synchronous. Every method but `measure` has a no-op default
/// so headless hosts only implement what they have.
pub trait RenderHost {
    /// Region heights for a live column element; `None` if it is gone
    fn measure(&self, column_id: &str) -> Option<RegionMeasurement>;

    /// Absolute position of the bottom edge of a column's content area
    fn content_boundary(&self, _column_id: &str) -> Option<f64> {
        None
    }

    /// Scrollable ancestors that could shift while `scope` is re-laid out
    fn scroll_regions(&self, _scope: &LayoutScope) -> Vec<String> {
        Vec::new()
    }

    fn scroll_offset(&self, _region: &str) -> Option<ScrollOffset> {
        None
    }

    fn set_scroll_offset(&mut self, _region: &str, _offset: ScrollOffset) {}

    fn box_size(&self, _region: &str) -> Option<BoxSize> {
        None
    }

    fn freeze_box(&mut self, _region: &str, _size: BoxSize) {}

    /// Drop a frozen size override, returning to natural sizing
    fn release_box(&mut self, _region: &str) {}

    fn apply_stack_layout(&mut self, _layout: &StackLayout) {}

    fn apply_anchor(&mut self, _column_id: &str, _mode: AnchorMode) {}
}

/// Something a [`MemoryHost`] was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Frozen(String),
    Released(String),
    Scrolled(String, ScrollOffset),
    Applied(StackId),
    Anchored(String, AnchorMode),
}

/// In-memory render host: measurements and scroll state held in maps.
///
/// Backs the CLI (measurements from a JSON file or from estimates) and the
/// tests, which assert on `events`.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub measurements: IndexMap<String, RegionMeasurement>,
    pub boundaries: IndexMap<String, f64>,
    pub scroll: IndexMap<String, ScrollOffset>,
    pub boxes: IndexMap<String, BoxSize>,
    pub frozen: IndexMap<String, BoxSize>,
    pub applied: IndexMap<StackId, StackLayout>,
    pub anchors: IndexMap<String, AnchorMode>,
    pub events: Vec<HostEvent>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_measurement(mut self, column_id: &str, m: RegionMeasurement) -> Self {
        self.measurements.insert(column_id.to_string(), m);
        self
    }

    pub fn with_scroll_region(mut self, region: &str, offset: ScrollOffset, size: BoxSize) -> Self {
        self.scroll.insert(region.to_string(), offset);
        self.boxes.insert(region.to_string(), size);
        self
    }
}

impl RenderHost for MemoryHost {
    fn measure(&self, column_id: &str) -> Option<RegionMeasurement> {
        self.measurements.get(column_id).copied()
    }

    fn content_boundary(&self, column_id: &str) -> Option<f64> {
        self.boundaries.get(column_id).copied()
    }

    fn scroll_regions(&self, _scope: &LayoutScope) -> Vec<String> {
        self.scroll.keys().cloned().collect()
    }

    fn scroll_offset(&self, region: &str) -> Option<ScrollOffset> {
        self.scroll.get(region).copied()
    }

    fn set_scroll_offset(&mut self, region: &str, offset: ScrollOffset) {
        self.scroll.insert(region.to_string(), offset);
        self.events.push(HostEvent::Scrolled(region.to_string(), offset));
    }

    fn box_size(&self, region: &str) -> Option<BoxSize> {
        self.boxes.get(region).copied()
    }

    fn freeze_box(&mut self, region: &str, size: BoxSize) {
        self.frozen.insert(region.to_string(), size);
        self.events.push(HostEvent::Frozen(region.to_string()));
    }

    fn release_box(&mut self, region: &str) {
        self.frozen.shift_remove(region);
        self.events.push(HostEvent::Released(region.to_string()));
    }

    fn apply_stack_layout(&mut self, layout: &StackLayout) {
        self.applied.insert(layout.stack.clone(), layout.clone());
        self.events.push(HostEvent::Applied(layout.stack.clone()));
    }

    fn apply_anchor(&mut self, column_id: &str, mode: AnchorMode) {
        self.anchors.insert(column_id.to_string(), mode);
        self.events
            .push(HostEvent::Anchored(column_id.to_string(), mode));
    }
}
