//! Result rows and diagnostics produced by the analysis pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::records::Metric;

/// Recoverable failure of one analysis for the current selection.
///
/// Callers report it against the affected view only; the record store and
/// every other view remain usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Correlation undefined: {0} has zero variance")]
    ZeroVariance(Metric),

    #[error("No rows for year {0}")]
    NoRowsForYear(i32),

    #[error("Snapshot years must differ, got {0} twice")]
    SameYear(i32),

    #[error("No rows for state '{0}'")]
    NoRowsForState(String),

    #[error("Dataset has no rows with a year")]
    EmptyDataset,

    #[error("Duplicate observation for {state} in {year}")]
    DuplicateObservation { state: String, year: i32 },
}

/// Percent change of one metric for a state between two snapshot years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRecord {
    pub state: String,
    pub value_at_start: f64,
    pub value_at_end: f64,
    pub growth_percent: f64,
}

/// A state and its value of the metric it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedState {
    pub state: String,
    pub value: f64,
}
