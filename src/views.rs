//! Flat tables for each dashboard mode.
//!
//! Every view is computed fresh from the immutable [`RecordStore`]. A view
//! that cannot be computed for the current selection comes back empty with a
//! diagnostic instead of failing, so the other views stay available.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::analyzers::correlation::{correlate, top_k};
use crate::analyzers::growth;
use crate::analyzers::types::{AnalysisError, RankedState};
use crate::config::{DashboardConfig, StateExclusion};
use crate::records::{Metric, Record, RecordStore};
use crate::resolver;

/// Rows of one view plus an optional diagnostic explaining why it is empty.
#[derive(Debug, Clone, Serialize)]
pub struct Table<T> {
    pub title: String,
    pub rows: Vec<T>,
    pub diagnostic: Option<String>,
}

impl<T> Table<T> {
    fn new(title: String, rows: Vec<T>) -> Self {
        Self {
            title,
            rows,
            diagnostic: None,
        }
    }

    fn unavailable(title: String, error: AnalysisError) -> Self {
        warn!(view = %title, error = %error, "View unavailable");
        Self {
            title,
            rows: Vec::new(),
            diagnostic: Some(error.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.diagnostic.is_none()
    }
}

/// One state's observations keyed for a map join by name, code or region id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRow {
    pub state: String,
    pub state_code: Option<&'static str>,
    pub region_id: Option<u32>,
    pub ev_count: Option<f64>,
    pub phev_count: Option<f64>,
    pub hev_count: Option<f64>,
    pub gasoline_price: Option<f64>,
}

impl From<&Record> for MapRow {
    fn from(r: &Record) -> Self {
        MapRow {
            state: r.state.clone(),
            state_code: r.state_code,
            region_id: r.region_id,
            ev_count: r.ev_count,
            phev_count: r.phev_count,
            hev_count: r.hev_count,
            gasoline_price: r.gasoline_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthMapRow {
    pub state: String,
    pub state_code: Option<&'static str>,
    pub region_id: Option<u32>,
    pub value_at_start: f64,
    pub value_at_end: f64,
    pub growth_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub state: String,
    pub year: i32,
    pub gasoline_price: Option<f64>,
    pub ev_count: Option<f64>,
}

/// Correlation and ranking summary for one year.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub year: Option<i32>,
    pub field_a: Metric,
    pub field_b: Metric,
    pub correlation: Option<f64>,
    pub diagnostic: Option<String>,
    pub ranked_by: Metric,
    pub top_states: Vec<RankedState>,
}

/// Sales for `year`, minus the states in `exclusion`.
pub fn sales_map(store: &RecordStore, year: i32, exclusion: &StateExclusion) -> Table<MapRow> {
    let title = format!("Electric Vehicle Sales ({year})");

    let rows: Vec<MapRow> = store
        .exclude_states(exclusion)
        .into_iter()
        .filter(|r| r.year == Some(year))
        .map(MapRow::from)
        .collect();

    if rows.is_empty() {
        return Table::unavailable(title, AnalysisError::NoRowsForYear(year));
    }
    Table::new(title, rows)
}

/// Growth between the configured snapshot years, over the full dataset.
pub fn growth_map(store: &RecordStore, config: &DashboardConfig) -> Table<GrowthMapRow> {
    let (start, end, metric) = (
        config.growth_start_year,
        config.growth_end_year,
        config.growth_metric,
    );
    let title = format!("{} Growth Rate (%) ({start}-{end})", metric.label());

    match growth::compute(store, start, end, metric) {
        Ok(records) => {
            let rows = records
                .into_iter()
                .map(|g| GrowthMapRow {
                    state_code: resolver::abbreviation(&g.state),
                    region_id: resolver::region_id(&g.state),
                    state: g.state,
                    value_at_start: g.value_at_start,
                    value_at_end: g.value_at_end,
                    growth_percent: g.growth_percent,
                })
                .collect();
            Table::new(title, rows)
        }
        Err(e) => Table::unavailable(title, e),
    }
}

/// Latest-year gas price and EV sales for every state with a region id.
///
/// Rows missing the region id, gas price or EV count are dropped, then rows
/// are deduplicated by region id keeping the first in source order.
pub fn gas_price_dashboard(store: &RecordStore) -> Table<MapRow> {
    let Some(year) = store.latest_year() else {
        return Table::unavailable(
            "Gas Prices by State".to_string(),
            AnalysisError::EmptyDataset,
        );
    };
    let title = format!("{year} Gas Prices by State");

    let mut seen = HashSet::new();
    let rows: Vec<MapRow> = store
        .filter_by_year(year)
        .into_iter()
        .filter(|r| r.gasoline_price.is_some() && r.ev_count.is_some())
        .filter(|r| r.region_id.is_some_and(|id| seen.insert(id)))
        .map(MapRow::from)
        .collect();

    if rows.is_empty() {
        return Table::unavailable(
            title,
            AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            },
        );
    }
    Table::new(title, rows)
}

/// Gas price and EV sales of one state across all years.
pub fn trend(store: &RecordStore, state: &str) -> Table<TrendPoint> {
    let state = state.trim();
    let title = format!("Gas Price and EV Sales Trend Over Time ({state})");

    let rows: Vec<TrendPoint> = store
        .for_state(state)
        .into_iter()
        .filter_map(|r| {
            Some(TrendPoint {
                state: r.state.clone(),
                year: r.year?,
                gasoline_price: r.gasoline_price,
                ev_count: r.ev_count,
            })
        })
        .collect();

    if rows.is_empty() {
        return Table::unavailable(title, AnalysisError::NoRowsForState(state.to_string()));
    }
    Table::new(title, rows)
}

/// Correlation between two fields and the top `k` states by `rank_by`.
///
/// `year` defaults to the latest year in the store.
pub fn data_analysis(
    store: &RecordStore,
    year: Option<i32>,
    field_a: Metric,
    field_b: Metric,
    rank_by: Metric,
    k: usize,
) -> AnalysisReport {
    let year = year.or_else(|| store.latest_year());

    let (correlation, diagnostic, top_states) = match year {
        Some(y) => {
            let top_states = top_k(store, y, rank_by, k);
            match correlate(store, y, field_a, field_b) {
                Ok(r) => (Some(r), None, top_states),
                Err(e) => {
                    warn!(year = y, error = %e, "Correlation unavailable");
                    (None, Some(e.to_string()), top_states)
                }
            }
        }
        None => {
            warn!("Correlation unavailable: dataset has no years");
            (None, Some(AnalysisError::EmptyDataset.to_string()), Vec::new())
        }
    };

    AnalysisReport {
        generated_at: Utc::now(),
        year,
        field_a,
        field_b,
        correlation,
        diagnostic,
        ranked_by: rank_by,
        top_states,
    }
}
