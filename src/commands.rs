//! Subcommand implementations.

use anyhow::{Context, bail};
use market_data::{
    AlphaVantageClient, DailySeriesSource, csv_path_for, load_api_key, load_feature_csv,
    read_scaler, save_feature_csv, scaler_path_for, write_scaler,
};
use qnn::{ModelArtifact, mse, train};
use quant::{prepare_data, preprocess};
use rand::SeedableRng;
use rand::rngs::StdRng;
use server::{AppState, Series, render_line_chart};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{FetchArgs, ServeArgs, TrainArgs};

/// Rows echoed to the log after `fetch`.
const PREVIEW_ROWS: usize = 5;

/// Fetch a ticker, derive and scale features, and write the CSV plus the
/// scaler sidecar.
pub async fn fetch(args: &FetchArgs) -> anyhow::Result<()> {
    let api_key = load_api_key(&args.api_key)?;
    let ticker = args.ticker.to_uppercase();
    let client = AlphaVantageClient::with_base_url(api_key, args.base_url.clone());

    let records = client.fetch_daily(&ticker).await?;
    let out = preprocess(&records, true)?;
    info!("Data preprocessing complete.");

    let Some(bounds) = out.bounds else {
        bail!(
            "{} daily records for {} leave no rows after the 30-day window",
            records.len(),
            ticker
        );
    };

    let csv_path = csv_path_for(&args.out_dir, &ticker);
    save_feature_csv(&csv_path, &out.rows)
        .with_context(|| format!("writing {}", csv_path.display()))?;
    let scaler_path = scaler_path_for(&args.out_dir, &ticker);
    write_scaler(&scaler_path, &bounds)
        .with_context(|| format!("writing {}", scaler_path.display()))?;

    for row in out.rows.iter().take(PREVIEW_ROWS) {
        info!(
            "{} close={:.4} return={:.4} ma5={:.4} ma30={:.4}",
            row.date, row.close, row.daily_return, row.moving_avg_5, row.moving_avg_30
        );
    }
    info!(
        rows = out.rows.len(),
        "Preprocessed data saved to {}",
        csv_path.display()
    );
    Ok(())
}

/// Train on a preprocessed CSV, save the artifact and plot the loss curve.
pub fn train_model(args: &TrainArgs) -> anyhow::Result<()> {
    let rows = load_feature_csv(&args.data)
        .with_context(|| format!("reading {}", args.data.display()))?;
    let scaler_path = args
        .scaler_path()
        .context("cannot derive the scaler sidecar path; pass --scaler")?;
    let bounds = read_scaler(&scaler_path)
        .with_context(|| format!("reading scaler bounds from {}", scaler_path.display()))?;

    let split = prepare_data(&rows, &args.split_config())?;
    info!(
        train = split.train_x.len(),
        test = split.test_x.len(),
        "Prepared {} of {} rows",
        split.train_x.len() + split.test_x.len(),
        rows.len()
    );

    let mut rng = match args.init_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let qnn = args.circuit.qnn_config();
    let (model, run) = train(
        &split.train_x,
        &split.train_y,
        &qnn,
        &args.train_config(),
        &mut rng,
    )?;

    match mse(&model, &split.test_x, &split.test_y) {
        Ok(test_mse) => info!("Held-out MSE: {:.6}", test_mse),
        Err(e) => warn!("could not evaluate held-out set: {}", e),
    }

    ModelArtifact::new(&model, bounds, run.losses.clone())
        .save(&args.model_path)
        .with_context(|| format!("saving model to {}", args.model_path.display()))?;
    info!("Model saved to {}", args.model_path.display());

    let png = render_line_chart(
        "Quantum Neural Network Training Loss",
        "Epochs",
        "Loss (MSE)",
        &[Series::new("loss", &run.losses)],
    )?;
    std::fs::write(&args.loss_plot, png)
        .with_context(|| format!("writing {}", args.loss_plot.display()))?;
    info!("Loss curve saved to {}", args.loss_plot.display());
    Ok(())
}

/// Build the service context and serve until interrupted.
pub async fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let config = args.server_config();
    let api_key = load_api_key(&config.api_key_path)?;
    let source: Arc<dyn DailySeriesSource> =
        Arc::new(AlphaVantageClient::with_base_url(api_key, args.base_url.clone()));

    let state = AppState::load(&config, &args.circuit.qnn_config(), source)?;
    server::serve(&config, state).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitArgs;
    use chrono::{Days, NaiveDate};
    use types::OhlcvRecord;

    fn history(n: u64) -> Vec<OhlcvRecord> {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = 50.0 + (i as f64 * 0.2).cos() * 3.0 + i as f64 * 0.05;
                OhlcvRecord::new(
                    start.checked_add_days(Days::new(i)).unwrap(),
                    close - 0.3,
                    close + 0.8,
                    close - 0.9,
                    close,
                    500_000 + i * 250,
                )
            })
            .collect()
    }

    fn train_args(dir: &std::path::Path, data: std::path::PathBuf) -> TrainArgs {
        TrainArgs {
            data,
            scaler: None,
            model_path: dir.join("model").join("quantum_nn_model.json"),
            loss_plot: dir.join("training_loss.png"),
            epochs: 2,
            learning_rate: 0.01,
            samples: 20,
            test_fraction: 0.2,
            shuffle_seed: 42,
            init_seed: Some(1),
            circuit: CircuitArgs { qubits: 4, reps: 1 },
        }
    }

    #[test]
    fn test_train_writes_artifact_and_plot() {
        let dir = tempfile::tempdir().unwrap();
        let out = preprocess(&history(80), true).unwrap();
        let csv = csv_path_for(dir.path(), "TEST");
        save_feature_csv(&csv, &out.rows).unwrap();
        write_scaler(&scaler_path_for(dir.path(), "TEST"), &out.bounds.unwrap()).unwrap();

        let args = train_args(dir.path(), csv);
        train_model(&args).unwrap();

        let artifact = ModelArtifact::load(&args.model_path).unwrap();
        assert_eq!(artifact.losses.len(), 2);
        assert!(artifact.losses.iter().all(|l| l.is_finite()));

        let png = std::fs::read(&args.loss_plot).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_train_requires_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let out = preprocess(&history(80), true).unwrap();
        let csv = csv_path_for(dir.path(), "TEST");
        save_feature_csv(&csv, &out.rows).unwrap();

        let err = train_model(&train_args(dir.path(), csv)).unwrap_err();
        assert!(format!("{err:#}").contains("scaler"));
    }
}
