use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::analyzers::types::{AnalysisError, GrowthRecord};
use crate::analyzers::utility::percent_change;
use crate::records::{Metric, RecordStore};

/// Computes the percent change of `metric` for every state between two
/// snapshot years.
///
/// A state is included only when it has a present value in both years and a
/// non-zero starting value; everything else is dropped silently. Output is
/// ordered by state name.
///
/// # Errors
///
/// - [`AnalysisError::SameYear`] if `start == end`.
/// - [`AnalysisError::NoRowsForYear`] if either year has no rows at all.
/// - [`AnalysisError::DuplicateObservation`] if a state appears twice in one
///   snapshot year, since the two values cannot be told apart.
pub fn compute(
    store: &RecordStore,
    start: i32,
    end: i32,
    metric: Metric,
) -> Result<Vec<GrowthRecord>, AnalysisError> {
    if start == end {
        return Err(AnalysisError::SameYear(start));
    }

    let mut snapshots: BTreeMap<&str, (Option<f64>, Option<f64>)> = BTreeMap::new();
    let mut seen: HashSet<(&str, i32)> = HashSet::new();
    let mut start_rows = 0usize;
    let mut end_rows = 0usize;

    for record in store.records() {
        let Some(year) = record.year else {
            continue;
        };
        if year != start && year != end {
            continue;
        }

        if !seen.insert((record.state.as_str(), year)) {
            return Err(AnalysisError::DuplicateObservation {
                state: record.state.clone(),
                year,
            });
        }

        let entry = snapshots.entry(record.state.as_str()).or_default();
        if year == start {
            start_rows += 1;
            entry.0 = record.value(metric);
        } else {
            end_rows += 1;
            entry.1 = record.value(metric);
        }
    }

    if start_rows == 0 {
        return Err(AnalysisError::NoRowsForYear(start));
    }
    if end_rows == 0 {
        return Err(AnalysisError::NoRowsForYear(end));
    }

    let candidates = snapshots.len();
    let rows: Vec<GrowthRecord> = snapshots
        .into_iter()
        .filter_map(|(state, (at_start, at_end))| {
            let (at_start, at_end) = (at_start?, at_end?);
            let growth_percent = percent_change(at_start, at_end)?;
            Some(GrowthRecord {
                state: state.to_string(),
                value_at_start: at_start,
                value_at_end: at_end,
                growth_percent,
            })
        })
        .collect();

    debug!(
        %metric,
        start,
        end,
        candidates,
        kept = rows.len(),
        "Growth rates computed"
    );

    Ok(rows)
}
