//! HTTP routes and handlers

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use reviewsense_classifiers::SentimentPipeline;
use reviewsense_core::{ClassifierKind, ClassifierMetrics, PairPrediction, Prediction, Sentiment};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

pub const MOCK_NOTE: &str =
    "Using mock predictions - models not loaded. Train models for accurate predictions.";

/// Number of per-review results echoed by the search endpoint
pub const SAMPLE_REVIEWS: usize = 3;

/// One classifier's verdict on a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdict {
    pub prediction: Sentiment,
    pub probability: f64,
    pub metrics: ClassifierMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdicts {
    pub logistic_regression: ModelVerdict,
    pub naive_bayes: ModelVerdict,
}

impl ModelVerdicts {
    fn new(pair: &PairPrediction, pipeline: &dyn SentimentPipeline) -> Self {
        let verdict = |kind: ClassifierKind| {
            let prediction = pair.get(kind);
            ModelVerdict {
                prediction: prediction.sentiment,
                probability: prediction.probability,
                metrics: pipeline.metrics(kind),
            }
        };
        Self {
            logistic_regression: verdict(ClassifierKind::LogisticRegression),
            naive_bayes: verdict(ClassifierKind::NaiveBayes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub input_text: String,
    pub models: ModelVerdicts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    GoodToWatch,
    NotRecommended,
}

/// One classifier's verdict over all reviews of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSentiment {
    pub prediction: Recommendation,
    pub positive_reviews: usize,
    pub negative_reviews: usize,
    pub average_confidence: f64,
    pub metrics: ClassifierMetrics,
}

impl OverallSentiment {
    /// Majority vote, with a tie counting as `good_to_watch`
    pub fn aggregate(predictions: &[Prediction], metrics: ClassifierMetrics) -> Self {
        let total = predictions.len();
        let positive = predictions
            .iter()
            .filter(|p| p.sentiment.is_positive())
            .count();
        let average = if total == 0 {
            0.0
        } else {
            predictions.iter().map(|p| p.probability).sum::<f64>() / total as f64
        };

        Self {
            prediction: if 2 * positive >= total {
                Recommendation::GoodToWatch
            } else {
                Recommendation::NotRecommended
            },
            positive_reviews: positive,
            negative_reviews: total - positive,
            average_confidence: round3(average),
            metrics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallVerdicts {
    pub logistic_regression: OverallSentiment,
    pub naive_bayes: OverallSentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReview {
    pub review: String,
    pub lr_sentiment: Sentiment,
    pub lr_prob: f64,
    pub nb_sentiment: Sentiment,
    pub nb_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub movie_name: String,
    pub reviews_analyzed: usize,
    pub overall_sentiment: OverallVerdicts,
    pub sample_reviews: Vec<SampleReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: bool,
}

pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "ReviewSense movie review sentiment API",
        "endpoints": {
            "/api/predict": "POST - Predict sentiment of a review",
            "/api/search": "POST - Analyze the reviews of a movie",
            "/api/health": "GET - Health check",
            "/metrics": "GET - Prometheus metrics",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("reviewsense_requests_total", "endpoint" => "health").increment(1);
    let models_loaded = state.models_loaded();
    Json(HealthResponse {
        status: if models_loaded {
            "healthy"
        } else {
            "models_not_loaded"
        }
        .to_string(),
        models_loaded,
    })
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    metrics::counter!("reviewsense_requests_total", "endpoint" => "predict").increment(1);

    let body = json_body(body)?;
    let text = required_string(&body, "text")?;
    if text.is_empty() {
        return Err(ApiError::InvalidRequest("Text cannot be empty".to_string()));
    }

    let start = Instant::now();
    let pair = state
        .pipeline
        .classify(text)
        .map_err(|e| ApiError::Internal(format!("Prediction error: {e}")))?;
    record_latency("predict", start);
    debug!(
        lr = %pair.logistic_regression.sentiment,
        nb = %pair.naive_bayes.sentiment,
        "Classified {} chars",
        text.len()
    );

    Ok(Json(PredictResponse {
        input_text: text.to_string(),
        models: ModelVerdicts::new(&pair, state.pipeline.as_ref()),
        note: mock_note(&state),
    }))
}

pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    metrics::counter!("reviewsense_requests_total", "endpoint" => "search").increment(1);

    let body = json_body(body)?;
    let movie_name = required_string(&body, "movie_name")?;
    if movie_name.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Movie name cannot be empty".to_string(),
        ));
    }

    let entry = state.catalog.find(movie_name).ok_or_else(|| {
        ApiError::NotFound(format!("No reviews found for movie \"{movie_name}\""))
    })?;

    let start = Instant::now();
    let pairs = entry
        .reviews
        .iter()
        .map(|review| state.pipeline.classify(review))
        .collect::<reviewsense_core::Result<Vec<_>>>()
        .map_err(|e| ApiError::Internal(format!("Search error: {e}")))?;
    record_latency("search", start);
    debug!(title = %entry.title, reviews = pairs.len(), "Analyzed movie reviews");

    let overall = |kind: ClassifierKind| {
        let predictions: Vec<Prediction> = pairs.iter().map(|p| *p.get(kind)).collect();
        OverallSentiment::aggregate(&predictions, state.pipeline.metrics(kind))
    };

    let sample_reviews = entry
        .reviews
        .iter()
        .zip(&pairs)
        .take(SAMPLE_REVIEWS)
        .map(|(review, pair)| SampleReview {
            review: review.clone(),
            lr_sentiment: pair.logistic_regression.sentiment,
            lr_prob: pair.logistic_regression.probability,
            nb_sentiment: pair.naive_bayes.sentiment,
            nb_prob: pair.naive_bayes.probability,
        })
        .collect();

    Ok(Json(SearchResponse {
        movie_name: movie_name.to_string(),
        reviews_analyzed: pairs.len(),
        overall_sentiment: OverallVerdicts {
            logistic_regression: overall(ClassifierKind::LogisticRegression),
            naive_bayes: overall(ClassifierKind::NaiveBayes),
        },
        sample_reviews,
        note: mock_note(&state),
    }))
}

/// Prometheus text exposition
pub async fn render_metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| ApiError::NotFound("Metrics exporter is not enabled".to_string()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(ApiError::InvalidRequest(
            "Content-Type must be application/json".to_string(),
        )),
        Err(rejection) => Err(ApiError::InvalidRequest(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        ))),
    }
}

/// The trimmed string value of a required field
fn required_string<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ApiError::InvalidRequest(format!(
            "Missing \"{field}\" field in request"
        ))),
        Some(Value::String(value)) => Ok(value.trim()),
        Some(_) => Err(ApiError::InvalidRequest(format!(
            "\"{field}\" must be a string"
        ))),
    }
}

fn mock_note(state: &AppState) -> Option<String> {
    (!state.models_loaded()).then(|| MOCK_NOTE.to_string())
}

fn record_latency(endpoint: &'static str, start: Instant) {
    metrics::histogram!("reviewsense_inference_latency_us", "endpoint" => endpoint)
        .record(start.elapsed().as_micros() as f64);
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
