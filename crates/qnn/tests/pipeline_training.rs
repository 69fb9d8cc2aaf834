//! End-to-end: synthetic OHLCV -> feature pipeline -> training -> artifact.

use chrono::{Days, NaiveDate};
use qnn::{ModelArtifact, QnnConfig, TrainConfig, mse, train};
use quant::{SplitConfig, prepare_data, preprocess};
use rand::SeedableRng;
use rand::rngs::StdRng;
use types::{FeatureColumn, OhlcvRecord};

const DAILY_CHANGE: f64 = 0.002;

/// 100 trading days where close grows by a constant fraction each day.
fn synthetic_history() -> Vec<OhlcvRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..100)
        .map(|i| {
            let close = 150.0 * (1.0 + DAILY_CHANGE).powi(i as i32);
            OhlcvRecord::new(
                start.checked_add_days(Days::new(i as u64)).unwrap(),
                close * 0.995,
                close * 1.01,
                close * 0.99,
                close,
                2_000_000 + (i as u64 % 7) * 50_000,
            )
        })
        .collect()
}

#[test]
fn test_constant_change_survives_pipeline() {
    let unscaled = preprocess(&synthetic_history(), false).unwrap();
    assert_eq!(unscaled.rows.len(), 70);
    for row in &unscaled.rows {
        assert!((row.daily_return - DAILY_CHANGE).abs() < 1e-9);
    }
}

#[test]
fn test_one_epoch_gives_finite_loss() {
    let prepared = preprocess(&synthetic_history(), true).unwrap();
    let split = prepare_data(&prepared.rows, &SplitConfig::default()).unwrap();
    assert_eq!(split.train_x.len() + split.test_x.len(), 70);

    let config = TrainConfig {
        epochs: 1,
        learning_rate: 0.01,
    };
    let (model, run) = train(
        &split.train_x,
        &split.train_y,
        &QnnConfig::default(),
        &config,
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();

    assert_eq!(run.losses.len(), 1);
    assert!(run.losses[0].is_finite());
    assert!(mse(&model, &split.test_x, &split.test_y).unwrap().is_finite());
}

#[test]
fn test_artifact_reproduces_predictions() {
    let prepared = preprocess(&synthetic_history(), true).unwrap();
    let bounds = prepared.bounds.clone().unwrap();
    let split = prepare_data(&prepared.rows, &SplitConfig::default()).unwrap();

    let (model, run) = train(
        &split.train_x,
        &split.train_y,
        &QnnConfig::default(),
        &TrainConfig {
            epochs: 3,
            learning_rate: 0.01,
        },
        &mut StdRng::seed_from_u64(7),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model/quantum_nn_model.json");
    ModelArtifact::new(&model, bounds.clone(), run.losses.clone())
        .save(&path)
        .unwrap();

    let (restored, scaler) = ModelArtifact::load(&path)
        .unwrap()
        .into_model(&QnnConfig::default())
        .unwrap();
    assert_eq!(scaler, bounds);
    assert!(scaler.get(FeatureColumn::Close).is_some());
    assert_eq!(
        restored.predict_batch(&split.test_x).unwrap(),
        model.predict_batch(&split.test_x).unwrap()
    );
}
