//! Cleaning and feature derivation.
//!
//! `preprocess` runs four steps in order, each on the output of the last:
//!
//! 1. drop records with missing (non-finite) prices or a non-positive close
//! 2. derive `daily_return` from the prior close and drop the first row
//! 3. derive the 5- and 30-day trailing averages of `close` and drop rows
//!    without a full 30-day window
//! 4. optionally min-max scale every numeric column over this batch
//!
//! Because the first row is already gone when the windows start, an input
//! of `n >= 30` complete records yields exactly `n - 30` rows.

use tracing::debug;
use types::{FeatureRow, OhlcvRecord, ScalerBounds};

use crate::PipelineError;
use crate::rolling::TrailingMean;
use crate::scaler::MinMaxScaler;

/// Short moving-average window (trading days).
pub const SHORT_WINDOW: usize = 5;
/// Long moving-average window (trading days).
pub const LONG_WINDOW: usize = 30;

/// Output of [`preprocess`].
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Feature rows, date-ordered.
    pub rows: Vec<FeatureRow>,
    /// Bounds used for scaling, when scaling was requested and rows exist.
    pub bounds: Option<ScalerBounds>,
}

/// Derive feature rows from date-ordered records (steps 1-3).
pub fn engineer_features(records: &[OhlcvRecord]) -> Vec<FeatureRow> {
    let complete: Vec<&OhlcvRecord> = records.iter().filter(|r| r.is_complete()).collect();
    let dropped = records.len() - complete.len();
    if dropped > 0 {
        debug!(dropped, "dropped records with missing values");
    }

    // Step 2: returns. The first record has no prior close.
    let with_returns: Vec<(&OhlcvRecord, f64)> = complete
        .windows(2)
        .map(|pair| (pair[1], pair[1].close / pair[0].close - 1.0))
        .collect();

    // Step 3: trailing averages over the remaining closes.
    let mut short = TrailingMean::new(SHORT_WINDOW);
    let mut long = TrailingMean::new(LONG_WINDOW);
    let mut rows = Vec::with_capacity(with_returns.len().saturating_sub(LONG_WINDOW - 1));

    for (record, daily_return) in with_returns {
        short.push(record.close);
        long.push(record.close);

        let (Some(moving_avg_5), Some(moving_avg_30)) = (short.value(), long.value())
        else {
            continue;
        };

        rows.push(FeatureRow {
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume as f64,
            daily_return,
            moving_avg_5,
            moving_avg_30,
        });
    }

    rows
}

/// Clean, derive and optionally scale a batch of records.
///
/// Scaling fits fresh bounds on this batch; rerunning on a different subset
/// gives different ranges. An empty result is not an error and carries no
/// bounds.
pub fn preprocess(records: &[OhlcvRecord], scale: bool) -> Result<Preprocessed, PipelineError> {
    let mut rows = engineer_features(records);

    let bounds = if scale && !rows.is_empty() {
        let scaler = MinMaxScaler::fit(&rows)?;
        scaler.transform(&mut rows);
        Some(scaler.into_bounds())
    } else {
        None
    };

    debug!(input = records.len(), output = rows.len(), scaled = bounds.is_some(), "preprocessed");
    Ok(Preprocessed { rows, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use types::FeatureColumn;

    fn series(n: usize, close: impl Fn(usize) -> f64) -> Vec<OhlcvRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let c = close(i);
                OhlcvRecord::new(
                    start.checked_add_days(Days::new(i as u64)).unwrap(),
                    c - 0.5,
                    c + 1.0,
                    c - 1.0,
                    c,
                    1_000 + i as u64 * 10,
                )
            })
            .collect()
    }

    #[test]
    fn test_row_count_boundaries() {
        for (n, expected) in [(0, 0), (1, 0), (29, 0), (30, 0), (31, 1), (45, 15), (100, 70)] {
            let rows = engineer_features(&series(n, |i| 100.0 + i as f64));
            assert_eq!(rows.len(), expected, "n = {n}");
        }
    }

    #[test]
    fn test_first_retained_row() {
        let records = series(31, |i| 100.0 + i as f64);
        let rows = engineer_features(&records);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.date, records[30].date);
        // Window covers records 1..=30 (closes 101..=130).
        assert!((row.moving_avg_30 - 115.5).abs() < 1e-9);
        assert!((row.moving_avg_5 - 128.0).abs() < 1e-9);
        assert!((row.daily_return - (130.0 / 129.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_dropped_first() {
        let mut records = series(32, |i| 50.0 + i as f64);
        records[10].close = f64::NAN;
        let rows = engineer_features(&records);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_zero_close_dropped_with_contiguous_windows() {
        let mut records = series(40, |i| 50.0 + i as f64);
        records[10].close = 0.0;
        let rows = engineer_features(&records);
        // 39 complete records leave 39 - 30 rows.
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.daily_return.is_finite()));

        let closes: Vec<f64> = records.iter().filter(|r| r.is_complete()).map(|r| r.close).collect();
        let tail = &closes[closes.len() - LONG_WINDOW..];
        let expected = tail.iter().sum::<f64>() / LONG_WINDOW as f64;
        let last = rows.last().unwrap();
        assert_eq!(last.date, records[39].date);
        assert!((last.moving_avg_30 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constant_growth_return() {
        let rows = engineer_features(&series(60, |i| 100.0 * 1.01_f64.powi(i as i32)));
        assert_eq!(rows.len(), 30);
        for row in &rows {
            assert!((row.daily_return - 0.01).abs() < 1e-9);
        }
    }

    #[test]
    fn test_preprocess_scales_to_unit_range() {
        let out = preprocess(&series(80, |i| 100.0 + (i as f64 * 0.7).sin() * 10.0), true).unwrap();
        assert!(out.bounds.is_some());
        for column in FeatureColumn::ALL {
            let values: Vec<f64> = out.rows.iter().map(|r| r.get(column)).collect();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(min.abs() < 1e-12, "{column} min = {min}");
            assert!((max - 1.0).abs() < 1e-12, "{column} max = {max}");
        }
    }

    #[test]
    fn test_preprocess_unscaled_keeps_raw_values() {
        let out = preprocess(&series(40, |i| 100.0 + i as f64), false).unwrap();
        assert!(out.bounds.is_none());
        assert_eq!(out.rows[0].close, 130.0);
    }

    #[test]
    fn test_preprocess_empty_batch() {
        let out = preprocess(&series(30, |i| 1.0 + i as f64), true).unwrap();
        assert!(out.rows.is_empty());
        assert!(out.bounds.is_none());
    }
}
