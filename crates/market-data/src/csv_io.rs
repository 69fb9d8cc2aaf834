//! Feature tables on disk.
//!
//! `fetch` writes `<SYMBOL>_preprocessed_data.csv` (a `date` column followed
//! by the eight feature columns) and, when the table was scaled, a
//! `<SYMBOL>_scaler.json` sidecar holding the bounds used.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::{FeatureRow, ScalerBounds};

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("scaler file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scaler bounds: {0}")]
    Bounds(#[from] types::BoundsError),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CsvError + '_ {
    move |source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File name for a symbol's preprocessed table.
pub fn csv_path_for(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}_preprocessed_data.csv"))
}

/// File name for a symbol's scaler sidecar.
pub fn scaler_path_for(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}_scaler.json"))
}

/// Write rows as CSV with a header line.
pub fn write_feature_csv<W: Write>(writer: W, rows: &[FeatureRow]) -> Result<(), CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read rows previously written by [`write_feature_csv`].
pub fn read_feature_csv<R: Read>(reader: R) -> Result<Vec<FeatureRow>, CsvError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<FeatureRow>, _>>()?;
    Ok(rows)
}

/// Write the feature table to `path`, creating parent directories.
pub fn save_feature_csv(path: &Path, rows: &[FeatureRow]) -> Result<(), CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let file = File::create(path).map_err(io_err(path))?;
    write_feature_csv(file, rows)
}

/// Load a feature table from `path`.
pub fn load_feature_csv(path: &Path) -> Result<Vec<FeatureRow>, CsvError> {
    let file = File::open(path).map_err(io_err(path))?;
    read_feature_csv(file)
}

/// Persist scaler bounds as pretty JSON.
pub fn write_scaler(path: &Path, bounds: &ScalerBounds) -> Result<(), CsvError> {
    let json = serde_json::to_string_pretty(bounds)?;
    std::fs::write(path, json).map_err(io_err(path))
}

/// Load and validate scaler bounds.
pub fn read_scaler(path: &Path) -> Result<ScalerBounds, CsvError> {
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    let bounds: ScalerBounds = serde_json::from_str(&text)?;
    bounds.validate()?;
    Ok(bounds)
}
