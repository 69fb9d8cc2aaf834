//! Raw daily market data as returned by the data provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// OHLCV Record
// =============================================================================

/// One trading day of price and volume data.
///
/// Records are keyed by `date` and never modified after being fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRecord {
    /// Trading day.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price of the day.
    pub high: f64,
    /// Lowest price of the day.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded.
    pub volume: u64,
}

impl OhlcvRecord {
    /// Create a new record.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when every price field is a finite number and the close is positive.
    ///
    /// A non-positive close cannot anchor a daily return.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.close > 0.0
    }
}

/// Sort records ascending by date.
pub fn sort_by_date(records: &mut [OhlcvRecord]) {
    records.sort_by_key(|r| r.date);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_sort_by_date() {
        let mut records = vec![
            OhlcvRecord::new(day(3), 1.0, 1.0, 1.0, 1.0, 10),
            OhlcvRecord::new(day(1), 1.0, 1.0, 1.0, 1.0, 10),
            OhlcvRecord::new(day(2), 1.0, 1.0, 1.0, 1.0, 10),
        ];
        sort_by_date(&mut records);
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn test_is_complete() {
        let mut record = OhlcvRecord::new(day(1), 1.0, 2.0, 0.5, 1.5, 100);
        assert!(record.is_complete());
        record.close = f64::NAN;
        assert!(!record.is_complete());
    }

    #[test]
    fn test_non_positive_close_is_incomplete() {
        let mut record = OhlcvRecord::new(day(1), 1.0, 2.0, 0.5, 0.0, 100);
        assert!(!record.is_complete());
        record.close = -1.0;
        assert!(!record.is_complete());
    }
}
