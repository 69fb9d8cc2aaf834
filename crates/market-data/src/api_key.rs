//! Provider API key loaded from a small JSON file: `{"API_KEY": "..."}`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("failed to read API key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid API key file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("API key file {0} contains an empty key")]
    Empty(PathBuf),
}

#[derive(Deserialize)]
struct ApiKeyFile {
    #[serde(rename = "API_KEY")]
    api_key: String,
}

/// Read the `API_KEY` field from `path`.
pub fn load_api_key(path: impl AsRef<Path>) -> Result<String, ApiKeyError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ApiKeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ApiKeyFile = serde_json::from_str(&text).map_err(|source| ApiKeyError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let key = file.api_key.trim();
    if key.is_empty() {
        return Err(ApiKeyError::Empty(path.to_path_buf()));
    }
    Ok(key.to_string())
}
