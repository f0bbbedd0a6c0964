use metrics_exporter_prometheus::PrometheusHandle;
use reviewsense_classifiers::{ReviewCatalog, SentimentPipeline};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline chosen at startup; immutable for the life of the process
    pub pipeline: Arc<dyn SentimentPipeline>,

    /// Demo reviews behind the search endpoint
    pub catalog: Arc<ReviewCatalog>,

    /// Prometheus exporter, when one is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(pipeline: Arc<dyn SentimentPipeline>, catalog: Arc<ReviewCatalog>) -> Self {
        Self {
            pipeline,
            catalog,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn models_loaded(&self) -> bool {
        self.pipeline.mode().is_trained()
    }
}
