//! ReviewSense Classifiers
//!
//! Sentiment classification for movie reviews.
//!
//! The trained path runs every document through the same chain that was
//! fitted offline:
//! - [`normalize`]: lowercase, strip `<br />` markers, digits and punctuation
//! - [`CountVectorizer`] and [`TfidfTransformer`]: sparse TF-IDF features
//! - [`LogisticRegression`] and [`MultinomialNaiveBayes`]: the classifier pair
//!
//! When the four fitted artifacts are not available the service falls back
//! to [`HeuristicPipeline`], a keyword counter that keeps the API usable for
//! demos. [`bootstrap`] makes that decision once at startup.

pub mod catalog;
pub mod classifier;
pub mod features;
pub mod heuristic;
pub mod logistic;
pub mod naive_bayes;
pub mod normalize;
pub mod pipeline;
pub mod stopwords;
pub mod store;
pub mod tfidf;
pub mod training;
pub mod vectorizer;

pub use catalog::{CatalogEntry, ReviewCatalog};
pub use classifier::LinearClassifier;
pub use features::{FeaturePipeline, SparseVector};
pub use heuristic::HeuristicPipeline;
pub use logistic::{LogisticRegression, LogisticRegressionParams};
pub use naive_bayes::MultinomialNaiveBayes;
pub use normalize::normalize;
pub use pipeline::{
    bootstrap, ArtifactOrigin, BootstrapOptions, SentimentPipeline, ServingMode, ServingPipeline,
    TrainedPipeline,
};
pub use store::{ArtifactSet, LoadedArtifacts, ModelStore};
pub use tfidf::TfidfTransformer;
pub use training::{load_dataset, LabeledReview, Trainer, TrainingConfig, TrainingOutcome, TrainingReport};
pub use vectorizer::CountVectorizer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::LinearClassifier;
    pub use crate::heuristic::HeuristicPipeline;
    pub use crate::normalize::normalize;
    pub use crate::pipeline::{SentimentPipeline, ServingMode, TrainedPipeline};
    pub use crate::store::ModelStore;
    pub use crate::training::Trainer;
}
