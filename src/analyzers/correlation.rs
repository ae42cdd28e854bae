use tracing::debug;

use crate::analyzers::types::{AnalysisError, RankedState};
use crate::analyzers::utility::{is_constant, pearson};
use crate::records::{Metric, RecordStore};

/// Pearson correlation between `a` and `b` across all states in `year`.
///
/// Rows missing either value are dropped before computing.
///
/// # Errors
///
/// - [`AnalysisError::InsufficientData`] with fewer than two qualifying rows.
/// - [`AnalysisError::ZeroVariance`] when one of the fields is constant, in
///   which case the coefficient is undefined.
pub fn correlate(
    store: &RecordStore,
    year: i32,
    a: Metric,
    b: Metric,
) -> Result<f64, AnalysisError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = store
        .filter_by_year(year)
        .into_iter()
        .filter_map(|r| Some((r.value(a)?, r.value(b)?)))
        .unzip();

    debug!(year, %a, %b, rows = xs.len(), "Correlating");

    if xs.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: xs.len(),
        });
    }

    pearson(&xs, &ys).ok_or_else(|| {
        let flat = if is_constant(&xs) { a } else { b };
        AnalysisError::ZeroVariance(flat)
    })
}

/// The `k` states with the highest `metric` in `year`, highest first.
///
/// Ties keep source order. Rows with an absent value are skipped, so fewer
/// than `k` entries may be returned.
pub fn top_k(store: &RecordStore, year: i32, metric: Metric, k: usize) -> Vec<RankedState> {
    let mut ranked: Vec<RankedState> = store
        .filter_by_year(year)
        .into_iter()
        .filter_map(|r| {
            Some(RankedState {
                state: r.state.clone(),
                value: r.value(metric)?,
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|x, y| y.value.total_cmp(&x.value));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RawRecord;

    fn raw(state: &str, year: i32, ev: Option<f64>, gas: Option<f64>) -> RawRecord {
        RawRecord {
            state: state.to_string(),
            year: Some(year.to_string()),
            ev: ev.map(|v| v.to_string()),
            gasoline_price: gas.map(|v| v.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_correlate_perfect_negative() {
        let store = RecordStore::build(vec![
            raw("A", 2020, Some(10.0), Some(3.0)),
            raw("B", 2020, Some(20.0), Some(2.0)),
            raw("C", 2020, Some(30.0), Some(1.0)),
        ]);

        let r = correlate(&store, 2020, Metric::Ev, Metric::GasolinePrice).unwrap();
        assert_eq!(r, -1.0);
    }

    #[test]
    fn test_correlate_skips_incomplete_rows_and_other_years() {
        let store = RecordStore::build(vec![
            raw("A", 2020, Some(1.0), Some(1.0)),
            raw("B", 2020, None, Some(50.0)),
            raw("C", 2020, Some(2.0), Some(2.0)),
            raw("D", 2019, Some(9.0), Some(-9.0)),
            raw("E", 2020, Some(3.0), Some(3.0)),
        ]);

        let r = correlate(&store, 2020, Metric::Ev, Metric::GasolinePrice).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlate_insufficient_data() {
        let store = RecordStore::build(vec![
            raw("A", 2020, Some(1.0), Some(1.0)),
            raw("B", 2020, Some(2.0), None),
        ]);

        assert_eq!(
            correlate(&store, 2020, Metric::Ev, Metric::GasolinePrice),
            Err(AnalysisError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
        assert_eq!(
            correlate(&store, 1999, Metric::Ev, Metric::GasolinePrice),
            Err(AnalysisError::InsufficientData {
                required: 2,
                actual: 0
            })
        );
    }

    #[test]
    fn test_correlate_zero_variance() {
        let store = RecordStore::build(vec![
            raw("A", 2020, Some(1.0), Some(3.0)),
            raw("B", 2020, Some(2.0), Some(3.0)),
        ]);

        assert_eq!(
            correlate(&store, 2020, Metric::Ev, Metric::GasolinePrice),
            Err(AnalysisError::ZeroVariance(Metric::GasolinePrice))
        );
    }

    #[test]
    fn test_correlate_constant_price_that_drifts_in_mean() {
        let store = RecordStore::build(
            (0..10)
                .map(|i| raw(&format!("S{i}"), 2020, Some(f64::from(i * 7 + 1)), Some(0.1)))
                .collect::<Vec<_>>(),
        );

        assert_eq!(
            correlate(&store, 2020, Metric::GasolinePrice, Metric::Ev),
            Err(AnalysisError::ZeroVariance(Metric::GasolinePrice))
        );
        assert_eq!(
            correlate(&store, 2020, Metric::GasolinePrice, Metric::GasolinePrice),
            Err(AnalysisError::ZeroVariance(Metric::GasolinePrice))
        );
    }

    #[test]
    fn test_top_k_descending_with_stable_ties() {
        let store = RecordStore::build(vec![
            raw("A", 2020, Some(5.0), None),
            raw("B", 2020, Some(9.0), None),
            raw("C", 2020, None, None),
            raw("D", 2020, Some(5.0), None),
            raw("E", 2021, Some(100.0), None),
            raw("F", 2020, Some(1.0), None),
        ]);

        let top = top_k(&store, 2020, Metric::Ev, 3);
        let states: Vec<_> = top.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["B", "A", "D"]);
        assert_eq!(top[0].value, 9.0);
    }

    #[test]
    fn test_top_k_fewer_than_k() {
        let store = RecordStore::build(vec![raw("A", 2020, Some(5.0), None)]);
        assert_eq!(top_k(&store, 2020, Metric::Ev, 5).len(), 1);
        assert!(top_k(&store, 2020, Metric::Ev, 0).is_empty());
        assert!(top_k(&store, 2020, Metric::Hev, 5).is_empty());
    }
}
