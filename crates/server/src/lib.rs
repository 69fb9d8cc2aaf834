//! Server crate: axum-based inference service for the hybrid quantum model.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   Arc<AppState>   ┌──────────────────────────┐
//! │  startup (main)    │──────────────────>│  axum handlers           │
//! │  load artifact     │                   │  /predict    (upload)    │
//! │  or fail closed    │                   │  /fetch_stock (provider) │
//! └────────────────────┘                   │  *_image     (PNG)       │
//!                                          └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Router, middleware and server configuration
//! - [`state`]: Service context built once at startup
//! - [`error`]: HTTP error mapping and startup errors
//! - [`routes`]: Route handlers (health, predict, stock)
//! - [`chart`]: Line charts rendered to PNG

pub mod app;
pub mod chart;
pub mod error;
pub mod routes;
pub mod state;

pub use app::{ServerConfig, create_app, serve};
pub use chart::{ChartError, Series, render_line_chart};
pub use error::{AppError, AppResult, StartupError};
pub use state::{AppState, ModelStatus};
