//! Typed, immutable record store built from raw CSV rows.
//!
//! Every numeric cell is coerced independently: a cell that does not parse
//! becomes `None` rather than failing the row, so one bad value never hides
//! the rest of a state's observations.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::StateExclusion;
use crate::parser::{RawRecord, parse_dataset};
use crate::resolver;

/// One state's observations for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub state: String,
    pub year: Option<i32>,
    pub gasoline_price: Option<f64>,
    pub ev_count: Option<f64>,
    pub phev_count: Option<f64>,
    pub hev_count: Option<f64>,
    pub state_code: Option<&'static str>,
    pub region_id: Option<u32>,
}

impl Record {
    /// Builds a typed record from a raw row, resolving the state's code and id.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let state = raw.state.trim().to_string();
        let state_code = resolver::abbreviation(&state);
        let region_id = resolver::region_id(&state);

        Record {
            year: parse_year(raw.year.as_deref()),
            gasoline_price: parse_number(raw.gasoline_price.as_deref()),
            ev_count: parse_number(raw.ev.as_deref()),
            phev_count: parse_number(raw.phev.as_deref()),
            hev_count: parse_number(raw.hev.as_deref()),
            state_code,
            region_id,
            state,
        }
    }

    /// Returns the value of `metric` for this record.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::GasolinePrice => self.gasoline_price,
            Metric::Ev => self.ev_count,
            Metric::Phev => self.phev_count,
            Metric::Hev => self.hev_count,
        }
    }
}

/// Parses a numeric cell; empty, unparseable and non-finite text is absent.
fn parse_number(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a year cell. Accepts `2018` and `2018.0`, rejects fractional years.
fn parse_year(text: Option<&str>) -> Option<i32> {
    let v = parse_number(text)?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

/// A numeric field of [`Record`] that can be analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    GasolinePrice,
    Ev,
    Phev,
    Hev,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::GasolinePrice, Metric::Ev, Metric::Phev, Metric::Hev];

    /// The column header this metric is read from.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::GasolinePrice => "Gasoline_Price",
            Metric::Ev => "Electric (EV)",
            Metric::Phev => "Plug-In Hybrid Electric (PHEV)",
            Metric::Hev => "Hybrid Electric (HEV)",
        }
    }

    /// Human-readable name used in view titles.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::GasolinePrice => "Gas Price",
            Metric::Ev => "EV",
            Metric::Phev => "PHEV",
            Metric::Hev => "HEV",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Metric::GasolinePrice => "gasoline-price",
            Metric::Ev => "ev",
            Metric::Phev => "phev",
            Metric::Hev => "hev",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(wanted) || m.column() == wanted)
            .ok_or_else(|| {
                anyhow!(
                    "unknown metric '{s}', expected one of: gasoline-price, ev, phev, hev"
                )
            })
    }
}

/// Read-only table of [`Record`]s, built once per session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Builds the store from raw rows. Never fails: bad cells become absent.
    pub fn build<I>(raw_rows: I) -> Self
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let records: Vec<Record> = raw_rows.into_iter().map(|r| Record::from_raw(&r)).collect();

        let unresolved: BTreeSet<&str> = records
            .iter()
            .filter(|r| r.region_id.is_none())
            .map(|r| r.state.as_str())
            .collect();
        if !unresolved.is_empty() {
            debug!(states = ?unresolved, "States without a region id");
        }

        let missing_year = records.iter().filter(|r| r.year.is_none()).count();
        info!(rows = records.len(), missing_year, "Record store built");

        RecordStore { records }
    }

    /// Decodes CSV bytes and builds the store.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = parse_dataset(bytes)?;
        Ok(Self::build(raw))
    }

    /// Reads and decodes a local CSV file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not decodable CSV.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read dataset '{}'", path.display()))?;
        Self::from_csv_bytes(&bytes)
            .with_context(|| format!("Failed to parse dataset '{}'", path.display()))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows observed in `year`, in source order.
    pub fn filter_by_year(&self, year: i32) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.year == Some(year))
            .collect()
    }

    /// Rows whose state is not part of `exclusion`, in source order.
    pub fn exclude_states(&self, exclusion: &StateExclusion) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| !exclusion.contains(&r.state))
            .collect()
    }

    /// Distinct years present in the store, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().filter_map(|r| r.year).collect();
        years.into_iter().collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().filter_map(|r| r.year).max()
    }

    /// Rows for one state ordered by year; rows without a year are dropped.
    pub fn for_state(&self, state: &str) -> Vec<&Record> {
        let state = state.trim();
        let mut rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| r.state == state && r.year.is_some())
            .collect();
        rows.sort_by_key(|r| r.year);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(state: &str, year: &str, ev: &str) -> RawRecord {
        RawRecord {
            state: state.to_string(),
            year: Some(year.to_string()),
            ev: Some(ev.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_number_coercion() {
        assert_eq!(parse_number(Some("3.25")), Some(3.25));
        assert_eq!(parse_number(Some(" 42 ")), Some(42.0));
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_year_coercion() {
        assert_eq!(parse_year(Some("2018")), Some(2018));
        assert_eq!(parse_year(Some("2018.0")), Some(2018));
        assert_eq!(parse_year(Some("2018.5")), None);
        assert_eq!(parse_year(Some("year")), None);
    }

    #[test]
    fn test_from_raw_trims_and_resolves() {
        let r = Record::from_raw(&raw("  California ", "2020", "10"));
        assert_eq!(r.state, "California");
        assert_eq!(r.state_code, Some("CA"));
        assert_eq!(r.region_id, Some(6));
        assert_eq!(r.ev_count, Some(10.0));
        assert_eq!(r.gasoline_price, None);
    }

    #[test]
    fn test_from_raw_unknown_state() {
        let r = Record::from_raw(&raw("Puerto Rico", "2020", "bad"));
        assert_eq!(r.state_code, None);
        assert_eq!(r.region_id, None);
        assert_eq!(r.ev_count, None);
    }

    #[test]
    fn test_filter_by_year_keeps_order() {
        let store = RecordStore::build(vec![
            raw("Texas", "2018", "1"),
            raw("Ohio", "2019", "2"),
            raw("Iowa", "2018", "3"),
        ]);
        let rows = store.filter_by_year(2018);
        let states: Vec<_> = rows.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["Texas", "Iowa"]);
        assert!(store.filter_by_year(2030).is_empty());
    }

    #[test]
    fn test_exclude_states() {
        let store = RecordStore::build(vec![
            raw("Alaska", "2018", "1"),
            raw("Ohio", "2018", "2"),
            raw("Puerto Rico", "2018", "3"),
        ]);
        let rows = store.exclude_states(&StateExclusion::non_contiguous());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "Ohio");
    }

    #[test]
    fn test_years_and_latest() {
        let store = RecordStore::build(vec![
            raw("Ohio", "2020", "1"),
            raw("Ohio", "2018", "1"),
            raw("Iowa", "2020", "1"),
            raw("Iowa", "", "1"),
        ]);
        assert_eq!(store.years(), vec![2018, 2020]);
        assert_eq!(store.latest_year(), Some(2020));
        assert_eq!(RecordStore::default().latest_year(), None);
    }

    #[test]
    fn test_for_state_orders_by_year() {
        let store = RecordStore::build(vec![
            raw("Ohio", "2021", "3"),
            raw("Iowa", "2019", "9"),
            raw("Ohio", "2019", "1"),
            raw("Ohio", "2020", "2"),
        ]);
        let years: Vec<_> = store.for_state("Ohio").iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2019), Some(2020), Some(2021)]);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("ev".parse::<Metric>().unwrap(), Metric::Ev);
        assert_eq!("EV".parse::<Metric>().unwrap(), Metric::Ev);
        assert_eq!("gasoline-price".parse::<Metric>().unwrap(), Metric::GasolinePrice);
        assert_eq!("Hybrid Electric (HEV)".parse::<Metric>().unwrap(), Metric::Hev);
        assert!("diesel".parse::<Metric>().is_err());
        assert_eq!(Metric::Phev.to_string(), "phev");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = RecordStore::open("/definitely/not/here.csv").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read dataset"));
    }
}
