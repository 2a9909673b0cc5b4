use serde::Serialize;

use crate::model::fold::FoldOrientation;
use crate::model::stack::StackId;

/// A non-fatal inconsistency found during a layout pass.
///
/// Nothing here is an error for the host application: missing elements are
/// skipped, bad values fall back to defaults, and a stack whose pass fails
/// keeps its previous layout.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutWarning {
    #[error("column {column} is not on the board")]
    MissingColumn { column: String },
    #[error("task {task} is not in column {column}")]
    MissingTask { column: String, task: String },
    #[error("stack {stack} does not exist")]
    UnknownStack { stack: StackId },
    #[error("stack {stack} has no columns")]
    EmptyStack { stack: StackId },
    #[error("column {column} reported an invalid {region} height ({value})")]
    InvalidMeasurement {
        column: String,
        region: &'static str,
        value: f64,
    },
    #[error("column {column} has no fold orientation, using {fallback}")]
    OrientationDefaulted {
        column: String,
        fallback: FoldOrientation,
    },
}

impl LayoutWarning {
    /// Send the warning to the log and hand it back
    pub fn logged(self) -> Self {
        tracing::warn!(warning = %self, "layout warning");
        self
    }
}
