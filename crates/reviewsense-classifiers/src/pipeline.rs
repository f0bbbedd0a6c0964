//! Serving pipelines and the startup decision between them
//!
//! The process decides exactly once, at startup, whether it serves trained
//! predictions or the keyword heuristic:
//!
//! ```text
//! bootstrap ──► all four artifacts load ─────────────► Trained (Loaded)
//!           └─► incomplete ─► dataset trains + saves ─► Trained (TrainedAtStartup)
//!                          └─► otherwise ──────────────► Heuristic
//! ```
//!
//! There is no transition afterwards; newly written artifacts are picked up
//! on the next restart.

use crate::classifier::LinearClassifier;
use crate::features::FeaturePipeline;
use crate::heuristic::HeuristicPipeline;
use crate::logistic::LogisticRegression;
use crate::naive_bayes::MultinomialNaiveBayes;
use crate::normalize::normalize;
use crate::store::{ArtifactSet, ModelStore};
use crate::training::{load_dataset, Trainer, TrainingConfig};
use reviewsense_core::{ClassifierKind, ClassifierMetrics, PairPrediction, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Which kind of predictions a pipeline produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingMode {
    Trained,
    Heuristic,
}

impl ServingMode {
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained)
    }
}

/// Classifies raw documents with both classifiers of the pair
pub trait SentimentPipeline: Send + Sync {
    /// Normalize `document` and run both classifiers on it
    fn classify(&self, document: &str) -> Result<PairPrediction>;

    /// Metrics reported alongside predictions of `kind`
    fn metrics(&self, kind: ClassifierKind) -> ClassifierMetrics;

    fn mode(&self) -> ServingMode;
}

/// How the trained artifacts came to be in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Loaded,
    TrainedAtStartup,
}

/// Normalizer, TF-IDF features and the fitted classifier pair
#[derive(Debug, Clone)]
pub struct TrainedPipeline {
    features: FeaturePipeline,
    logistic_regression: LogisticRegression,
    naive_bayes: MultinomialNaiveBayes,
}

impl TrainedPipeline {
    pub fn from_artifacts(artifacts: ArtifactSet) -> Result<Self> {
        artifacts.validate()?;
        Ok(Self {
            features: FeaturePipeline::new(artifacts.vectorizer, artifacts.tfidf)?,
            logistic_regression: artifacts.logistic_regression,
            naive_bayes: artifacts.naive_bayes,
        })
    }

    pub fn n_features(&self) -> usize {
        self.features.n_features()
    }
}

impl SentimentPipeline for TrainedPipeline {
    fn classify(&self, document: &str) -> Result<PairPrediction> {
        let x = self.features.features(&normalize(document))?;
        Ok(PairPrediction {
            logistic_regression: self.logistic_regression.predict(&x)?,
            naive_bayes: self.naive_bayes.predict(&x)?,
        })
    }

    fn metrics(&self, kind: ClassifierKind) -> ClassifierMetrics {
        let recorded = match kind {
            ClassifierKind::LogisticRegression => self.logistic_regression.metrics(),
            ClassifierKind::NaiveBayes => self.naive_bayes.metrics(),
        };
        recorded.unwrap_or_else(|| ClassifierMetrics::reference(kind))
    }

    fn mode(&self) -> ServingMode {
        ServingMode::Trained
    }
}

/// The pipeline chosen at startup
pub enum ServingPipeline {
    Trained {
        pipeline: TrainedPipeline,
        origin: ArtifactOrigin,
    },
    Heuristic(HeuristicPipeline),
}

impl ServingPipeline {
    pub fn origin(&self) -> Option<ArtifactOrigin> {
        match self {
            Self::Trained { origin, .. } => Some(*origin),
            Self::Heuristic(_) => None,
        }
    }

    fn inner(&self) -> &dyn SentimentPipeline {
        match self {
            Self::Trained { pipeline, .. } => pipeline,
            Self::Heuristic(heuristic) => heuristic,
        }
    }
}

impl SentimentPipeline for ServingPipeline {
    fn classify(&self, document: &str) -> Result<PairPrediction> {
        self.inner().classify(document)
    }

    fn metrics(&self, kind: ClassifierKind) -> ClassifierMetrics {
        self.inner().metrics(kind)
    }

    fn mode(&self) -> ServingMode {
        self.inner().mode()
    }
}

/// Inputs to the startup decision
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub model_dir: PathBuf,
    pub dataset_path: Option<PathBuf>,
    pub train_on_startup: bool,
    pub training: TrainingConfig,
    pub heuristic_max_jitter: f64,
    pub heuristic_seed: Option<u64>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            dataset_path: Some(PathBuf::from("data/IMDB Dataset.csv")),
            train_on_startup: true,
            training: TrainingConfig::default(),
            heuristic_max_jitter: 0.15,
            heuristic_seed: None,
        }
    }
}

/// Decide the serving pipeline for the life of the process.
///
/// Missing artifacts or a missing dataset are not errors; they select the
/// heuristic. This only fails if the heuristic itself cannot be built.
/// Training is CPU-bound, so async callers should run this on a blocking
/// thread.
pub fn bootstrap(options: &BootstrapOptions) -> Result<ServingPipeline> {
    let store = ModelStore::new(&options.model_dir);
    let loaded = store.load();
    let missing = loaded.missing();

    if let Some(artifacts) = loaded.complete() {
        match TrainedPipeline::from_artifacts(artifacts) {
            Ok(pipeline) => {
                info!(
                    vocabulary = pipeline.n_features(),
                    "All model artifacts loaded from {}",
                    store.dir().display()
                );
                return Ok(ServingPipeline::Trained {
                    pipeline,
                    origin: ArtifactOrigin::Loaded,
                });
            }
            Err(e) => warn!("Loaded artifacts are unusable: {}", e),
        }
    } else {
        warn!(
            "Model artifacts incomplete in {} (missing: {})",
            store.dir().display(),
            if missing.is_empty() {
                "none, but they disagree".to_string()
            } else {
                missing.join(", ")
            }
        );
    }

    if options.train_on_startup {
        if let Some(pipeline) = train_from_dataset(options, &store) {
            return Ok(ServingPipeline::Trained {
                pipeline,
                origin: ArtifactOrigin::TrainedAtStartup,
            });
        }
    }

    warn!("Serving mock predictions from the keyword heuristic");
    warn!(
        "To enable real predictions, place the four artifacts in {} or provide a labeled dataset",
        store.dir().display()
    );

    let heuristic = match options.heuristic_seed {
        Some(seed) => HeuristicPipeline::seeded(seed, options.heuristic_max_jitter)?,
        None => HeuristicPipeline::from_entropy(options.heuristic_max_jitter)?,
    };
    Ok(ServingPipeline::Heuristic(heuristic))
}

fn train_from_dataset(options: &BootstrapOptions, store: &ModelStore) -> Option<TrainedPipeline> {
    let Some(path) = options.dataset_path.as_deref() else {
        warn!("No dataset configured; skipping startup training");
        return None;
    };
    if !path.exists() {
        warn!("Dataset not found at {}", path.display());
        return None;
    }

    let outcome = load_dataset(path).and_then(|corpus| Trainer::new(options.training).train(&corpus));
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Startup training failed: {}", e);
            return None;
        }
    };

    if let Err(e) = store.save(&outcome.artifacts) {
        warn!("Trained models could not be saved: {}", e);
    }

    match TrainedPipeline::from_artifacts(outcome.artifacts) {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            warn!("Freshly trained artifacts are unusable: {}", e);
            None
        }
    }
}
