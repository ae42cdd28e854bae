//! CSV decoder for the state/year sales dataset.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One untyped row of the source CSV, exactly as it appears on disk.
///
/// Only `STATE` is a required column; any other missing column is read as
/// absent for every row. Extra columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "STATE")]
    pub state: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Gasoline_Price", default)]
    pub gasoline_price: Option<String>,
    #[serde(rename = "Electric (EV)", default)]
    pub ev: Option<String>,
    #[serde(rename = "Plug-In Hybrid Electric (PHEV)", default)]
    pub phev: Option<String>,
    #[serde(rename = "Hybrid Electric (HEV)", default)]
    pub hev: Option<String>,
}

/// Decodes CSV bytes into [`RawRecord`]s in source order.
///
/// # Errors
///
/// Returns an error if the header has no `STATE` column or a row
/// cannot be decoded (for example a row with the wrong number of fields).
/// Unparseable numbers are *not* errors here; they are coerced later.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();

    for (i, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let record = result.with_context(|| format!("Failed to decode CSV row {}", i + 1))?;
        rows.push(record);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "STATE,Year,Gasoline_Price,Electric (EV),Plug-In Hybrid Electric (PHEV),Hybrid Electric (HEV)\n";

    #[test]
    fn test_parse_header_only() {
        let rows = parse_dataset(HEADER.as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_empty_bytes() {
        let rows = parse_dataset(&[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_rows_keep_raw_text() {
        let csv = format!("{HEADER} California ,2018,3.5,100,20,300\nTexas,2019,n/a,,5,7\n");
        let rows = parse_dataset(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].state, " California ");
        assert_eq!(rows[0].year.as_deref(), Some("2018"));
        assert_eq!(rows[0].ev.as_deref(), Some("100"));
        assert_eq!(rows[1].gasoline_price.as_deref(), Some("n/a"));
        assert_eq!(rows[1].ev, None);
    }

    #[test]
    fn test_parse_ignores_extra_and_missing_numeric_columns() {
        let csv = "Year,STATE,Region,Electric (EV)\n2020,Ohio,Midwest,42\n";
        let rows = parse_dataset(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "Ohio");
        assert_eq!(rows[0].ev.as_deref(), Some("42"));
        assert_eq!(rows[0].hev, None);
    }

    #[test]
    fn test_parse_missing_state_column_fails() {
        let csv = "Year,Electric (EV)\n2020,42\n";
        assert!(parse_dataset(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_ragged_row_fails() {
        let csv = format!("{HEADER}Ohio,2020\n");
        assert!(parse_dataset(csv.as_bytes()).is_err());
    }
}
