//! Trailing mean over a fixed number of observations.
//!
//! Backed by a ring buffer: each push overwrites the oldest slot and
//! adjusts a running sum. The sum is recomputed exactly every time the
//! cursor wraps, so drift from repeated add/subtract stays bounded on long
//! price histories.

/// Mean of the last `period` values pushed.
///
/// # Example
/// ```
/// use quant::rolling::TrailingMean;
///
/// let mut ma = TrailingMean::new(3);
/// ma.push(1.0);
/// ma.push(2.0);
/// assert_eq!(ma.value(), None);
/// ma.push(3.0);
/// assert_eq!(ma.value(), Some(2.0));
/// ma.push(4.0);
/// assert_eq!(ma.value(), Some(3.0));
/// ```
#[derive(Debug, Clone)]
pub struct TrailingMean {
    slots: Box<[f64]>,
    cursor: usize,
    filled: usize,
    sum: f64,
}

impl TrailingMean {
    /// # Panics
    /// Panics if `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "trailing mean period must be > 0");
        Self {
            slots: vec![0.0; period].into_boxed_slice(),
            cursor: 0,
            filled: 0,
            sum: 0.0,
        }
    }

    /// Record `value`; returns the observation that fell out of the window.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = self.is_full().then(|| self.slots[self.cursor]);
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.filled = (self.filled + 1).min(self.slots.len());

        match evicted {
            Some(_) if self.cursor == 0 => self.sum = self.slots.iter().sum(),
            Some(old) => self.sum += value - old,
            None => self.sum += value,
        }
        evicted
    }

    pub fn period(&self) -> usize {
        self.slots.len()
    }

    /// Observations currently held (at most `period`).
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// The trailing mean, once `period` values have been seen.
    pub fn value(&self) -> Option<f64> {
        self.is_full().then(|| self.sum / self.slots.len() as f64)
    }

    /// Mean of whatever has been seen so far.
    pub fn partial(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum / self.filled as f64)
    }
}
