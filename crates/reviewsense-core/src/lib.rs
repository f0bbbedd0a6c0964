//! ReviewSense Core
//!
//! Types and error handling shared across ReviewSense components.
//!
//! This crate provides:
//! - The workspace-wide error type and result alias
//! - Sentiment labels, per-classifier predictions and evaluation metrics

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ClassifierKind, ClassifierMetrics, PairPrediction, Prediction, Sentiment};
