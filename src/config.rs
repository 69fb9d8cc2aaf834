//! Command-line configuration.
//!
//! Every option can also be set through a `QS_*` environment variable.

use clap::{Args, Parser, Subcommand};
use qnn::{QnnConfig, TrainConfig};
use quant::SplitConfig;
use server::ServerConfig;
use std::path::{Path, PathBuf};

/// Hybrid quantum/classical stock price regressor
#[derive(Parser, Debug)]
#[command(name = "quantum-stock")]
#[command(about = "Fetch stock history, train a quantum neural network and serve its predictions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and preprocess a ticker's daily history into a CSV
    Fetch(FetchArgs),
    /// Train the model on a preprocessed CSV and save the artifact
    Train(TrainArgs),
    /// Serve predictions over HTTP
    Serve(ServeArgs),
}

/// Circuit shape; must match between `train` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct CircuitArgs {
    /// Number of qubits (the feature map takes 2x this many inputs)
    #[arg(long, env = "QS_QUBITS", default_value_t = 4)]
    pub qubits: usize,

    /// Repetition depth of both circuits
    #[arg(long, env = "QS_REPS", default_value_t = 1)]
    pub reps: usize,
}

impl CircuitArgs {
    pub fn qnn_config(&self) -> QnnConfig {
        QnnConfig {
            num_qubits: self.qubits,
            reps: self.reps,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Ticker symbol
    #[arg(long, env = "QS_TICKER", default_value = "AAPL")]
    pub ticker: String,

    /// JSON file holding {"API_KEY": "..."}
    #[arg(long, env = "QS_API_KEY_FILE", default_value = "API_KEY.json")]
    pub api_key: PathBuf,

    /// Directory for the CSV and scaler sidecar
    #[arg(long, env = "QS_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Provider endpoint
    #[arg(long, env = "QS_BASE_URL", default_value = market_data::DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Preprocessed CSV written by `fetch`
    #[arg(long, env = "QS_DATA", default_value = "AAPL_preprocessed_data.csv")]
    pub data: PathBuf,

    /// Scaler sidecar (defaults to `<SYMBOL>_scaler.json` next to the CSV)
    #[arg(long, env = "QS_SCALER")]
    pub scaler: Option<PathBuf>,

    /// Where to write the model artifact
    #[arg(long, env = "QS_MODEL_PATH", default_value = "model/quantum_nn_model.json")]
    pub model_path: PathBuf,

    /// Where to write the loss curve
    #[arg(long, env = "QS_LOSS_PLOT", default_value = "training_loss.png")]
    pub loss_plot: PathBuf,

    #[arg(long, env = "QS_EPOCHS", default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, env = "QS_LEARNING_RATE", default_value_t = 0.01)]
    pub learning_rate: f64,

    /// Rows sampled for training and testing
    #[arg(long, env = "QS_SAMPLES", default_value_t = 100)]
    pub samples: usize,

    /// Fraction of the sample held out
    #[arg(long, env = "QS_TEST_FRACTION", default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Seed for shuffling and splitting
    #[arg(long, env = "QS_SHUFFLE_SEED", default_value_t = 42)]
    pub shuffle_seed: u64,

    /// Seed for weight initialisation (random when unset)
    #[arg(long, env = "QS_INIT_SEED")]
    pub init_seed: Option<u64>,

    #[command(flatten)]
    pub circuit: CircuitArgs,
}

impl TrainArgs {
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            epochs: self.epochs,
            learning_rate: self.learning_rate,
        }
    }

    pub fn split_config(&self) -> SplitConfig {
        SplitConfig {
            num_samples: self.samples,
            test_fraction: self.test_fraction,
            seed: self.shuffle_seed,
        }
    }

    /// Explicit sidecar path, or the one `fetch` writes beside the CSV.
    pub fn scaler_path(&self) -> Option<PathBuf> {
        self.scaler
            .clone()
            .or_else(|| sidecar_for_csv(&self.data))
    }
}

/// `<dir>/<SYM>_preprocessed_data.csv` -> `<dir>/<SYM>_scaler.json`
fn sidecar_for_csv(csv: &Path) -> Option<PathBuf> {
    let name = csv.file_name()?.to_str()?;
    let symbol = name.strip_suffix("_preprocessed_data.csv")?;
    let dir = csv.parent().unwrap_or_else(|| Path::new(""));
    Some(market_data::scaler_path_for(dir, symbol))
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "QS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "QS_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Model artifact to serve
    #[arg(long, env = "QS_MODEL_PATH", default_value = "model/quantum_nn_model.json")]
    pub model_path: PathBuf,

    /// JSON file holding {"API_KEY": "..."}
    #[arg(long, env = "QS_API_KEY_FILE", default_value = "API_KEY.json")]
    pub api_key: PathBuf,

    /// Ticker charted by /default_stock_image
    #[arg(long, env = "QS_DEFAULT_TICKER", default_value = "AAPL")]
    pub default_ticker: String,

    /// Serve randomly initialised weights if the model file is missing
    #[arg(long, env = "QS_ALLOW_UNTRAINED")]
    pub allow_untrained: bool,

    /// Provider endpoint
    #[arg(long, env = "QS_BASE_URL", default_value = market_data::DEFAULT_BASE_URL)]
    pub base_url: String,

    #[command(flatten)]
    pub circuit: CircuitArgs,
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model_path.clone(),
            api_key_path: self.api_key.clone(),
            default_ticker: self.default_ticker.to_uppercase(),
            allow_untrained: self.allow_untrained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["quantum-stock", "train"]).unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.epochs, 10);
        assert_eq!(args.train_config().learning_rate, 0.01);
        assert_eq!(args.split_config().num_samples, 100);
        assert_eq!(args.split_config().seed, 42);
        assert_eq!(args.circuit.qnn_config(), QnnConfig::default());
        assert_eq!(args.model_path, PathBuf::from("model/quantum_nn_model.json"));
        assert_eq!(args.scaler_path(), Some(PathBuf::from("AAPL_scaler.json")));
    }

    #[test]
    fn test_scaler_sidecar_derivation() {
        assert_eq!(
            sidecar_for_csv(Path::new("data/MSFT_preprocessed_data.csv")),
            Some(PathBuf::from("data/MSFT_scaler.json"))
        );
        assert_eq!(sidecar_for_csv(Path::new("prices.csv")), None);
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::try_parse_from([
            "quantum-stock",
            "serve",
            "--port",
            "8080",
            "--allow-untrained",
            "--default-ticker",
            "msft",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.server_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(config.allow_untrained);
        assert_eq!(config.default_ticker, "MSFT");
    }
}
