//! ReviewSense Server
//!
//! HTTP API over the sentiment pipeline: single-text prediction, movie
//! review search, health and Prometheus metrics.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use cli::{Cli, Commands};
pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;
