//! Training sample preparation.
//!
//! Shuffles the feature rows with a fixed seed, keeps the first
//! `num_samples`, then shuffles again and holds out a test fraction.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use types::{FEATURE_COUNT, FeatureRow};

use crate::PipelineError;

/// How to draw and split the training sample.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Rows kept after shuffling.
    pub num_samples: usize,
    /// Fraction held out for testing.
    pub test_fraction: f64,
    /// Seed for both shuffles.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            num_samples: 100,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Feature matrix and target vectors for training and testing.
#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    pub train_x: Vec<[f64; FEATURE_COUNT]>,
    pub train_y: Vec<f64>,
    pub test_x: Vec<[f64; FEATURE_COUNT]>,
    pub test_y: Vec<f64>,
}

/// Draw a sample from `rows` and split it into train and test sets.
///
/// The test set gets `ceil(test_fraction * n)` rows; both sets are
/// guaranteed non-empty.
pub fn prepare_data(rows: &[FeatureRow], config: &SplitConfig) -> Result<DatasetSplit, PipelineError> {
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(PipelineError::InvalidTestFraction(config.test_fraction));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    indices.shuffle(&mut rng);
    indices.truncate(config.num_samples);

    let n = indices.len();
    if n < 2 {
        return Err(PipelineError::NotEnoughRows { needed: 2, got: n });
    }

    indices.shuffle(&mut rng);
    let n_test = ((config.test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);
    let (test_idx, train_idx) = indices.split_at(n_test);

    let pick = |idx: &[usize]| -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
        idx.iter()
            .map(|&i| (rows[i].to_features(), rows[i].target()))
            .unzip()
    };
    let (train_x, train_y) = pick(train_idx);
    let (test_x, test_y) = pick(test_idx);

    Ok(DatasetSplit {
        train_x,
        train_y,
        test_x,
        test_y,
    })
}
