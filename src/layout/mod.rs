pub mod engine;
pub mod estimate;
pub mod host;
pub mod policy;
pub mod position;
pub mod reorganize;
pub mod scheduler;
pub mod scroll;
pub mod transaction;
pub mod warning;

pub use engine::{FrameReport, LayoutEngine, LayoutReport};
pub use host::{BoxSize, HostEvent, MemoryHost, RegionMeasurement, RenderHost, ScrollOffset};
pub use position::{Arrangement, Position, RegionOffsets, StackLayout};
pub use scheduler::{Clock, LayoutScope, ManualClock, SystemClock, UpdateScheduler};
pub use scroll::AnchorMode;
pub use warning::LayoutWarning;
