//! End-to-end tests for training, persistence and the startup decision

use reviewsense_classifiers::prelude::*;
use reviewsense_classifiers::store::{NAIVE_BAYES_FILE, TFIDF_FILE, VECTORIZER_FILE};
use reviewsense_classifiers::{
    bootstrap, ArtifactOrigin, BootstrapOptions, LabeledReview, ServingPipeline,
};
use reviewsense_core::{ClassifierKind, Sentiment};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const POSITIVE: &[&str] = &["amazing", "wonderful", "brilliant", "great", "fantastic", "loved"];
const NEGATIVE: &[&str] = &["terrible", "awful", "boring", "horrible", "waste", "dull"];
const FILLER: &[&str] = &["movie", "film", "plot", "acting", "story", "cast"];

fn review(words: &[&str], i: usize) -> String {
    format!(
        "The {} was {} and {}, a truly {} {}. Rated {}/10<br />",
        FILLER[i % FILLER.len()],
        words[i % words.len()],
        words[(i + 1) % words.len()],
        words[(i + 3) % words.len()],
        FILLER[(i + 2) % FILLER.len()],
        i % 10
    )
}

fn corpus() -> Vec<LabeledReview> {
    (0..60)
        .flat_map(|i| {
            [
                LabeledReview::new(review(POSITIVE, i), Sentiment::Positive),
                LabeledReview::new(review(NEGATIVE, i), Sentiment::Negative),
            ]
        })
        .collect()
}

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("reviews.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["review", "sentiment"]).unwrap();
    for row in corpus() {
        writer.write_record([row.review.as_str(), row.sentiment.as_str()]).unwrap();
    }
    writer.flush().unwrap();
    path
}

#[test]
fn test_trained_pipeline_classifies_both_ways() {
    let outcome = Trainer::default().train(&corpus()).unwrap();
    let pipeline = TrainedPipeline::from_artifacts(outcome.artifacts).unwrap();

    let positive = pipeline.classify("absolutely amazing and wonderful").unwrap();
    assert_eq!(positive.logistic_regression.sentiment, Sentiment::Positive);
    assert_eq!(positive.naive_bayes.sentiment, Sentiment::Positive);
    assert!(positive.logistic_regression.probability > 0.5);

    let negative = pipeline.classify("What a boring, awful waste!").unwrap();
    assert_eq!(negative.logistic_regression.sentiment, Sentiment::Negative);
    assert_eq!(negative.naive_bayes.sentiment, Sentiment::Negative);
}

#[test]
fn test_training_report() {
    let outcome = Trainer::default().train(&corpus()).unwrap();
    let report = &outcome.report;

    assert_eq!(report.train_samples + report.test_samples, 120);
    assert_eq!(report.test_samples, 24);
    assert!(report.vocabulary_size >= POSITIVE.len() + NEGATIVE.len());
    assert!(report.logistic_regression.accuracy >= 0.9);
    assert!(report.naive_bayes.accuracy >= 0.9);
}

#[test]
fn test_recorded_metrics_are_served() {
    let outcome = Trainer::default().train(&corpus()).unwrap();
    let report = outcome.report.clone();
    let pipeline = TrainedPipeline::from_artifacts(outcome.artifacts).unwrap();

    assert_eq!(
        pipeline.metrics(ClassifierKind::LogisticRegression),
        report.logistic_regression
    );
    assert_eq!(pipeline.metrics(ClassifierKind::NaiveBayes), report.naive_bayes);
}

#[test]
fn test_training_is_reproducible() {
    let a = Trainer::default().train(&corpus()).unwrap();
    let b = Trainer::default().train(&corpus()).unwrap();

    assert_eq!(a.report.logistic_regression, b.report.logistic_regression);
    assert_eq!(a.report.naive_bayes, b.report.naive_bayes);
    assert_eq!(a.artifacts.vectorizer, b.artifacts.vectorizer);
    assert_eq!(a.artifacts.logistic_regression, b.artifacts.logistic_regression);
}

#[test]
fn test_prediction_is_deterministic() {
    let outcome = Trainer::default().train(&corpus()).unwrap();
    let pipeline = TrainedPipeline::from_artifacts(outcome.artifacts).unwrap();

    let text = "a great cast but a dull story";
    assert_eq!(pipeline.classify(text).unwrap(), pipeline.classify(text).unwrap());
}

#[test]
fn test_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("models"));
    let outcome = Trainer::default().train(&corpus()).unwrap();

    store.save(&outcome.artifacts).unwrap();
    let loaded = store.load();
    assert!(loaded.is_complete());

    let fresh = TrainedPipeline::from_artifacts(outcome.artifacts).unwrap();
    let restored = TrainedPipeline::from_artifacts(loaded.complete().unwrap()).unwrap();
    for text in ["brilliant film", "horrible acting", "the plot"] {
        assert_eq!(fresh.classify(text).unwrap(), restored.classify(text).unwrap());
    }
}

#[test]
fn test_partial_store_is_incomplete() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path());
    let outcome = Trainer::default().train(&corpus()).unwrap();
    store.save(&outcome.artifacts).unwrap();

    std::fs::remove_file(store.path(TFIDF_FILE)).unwrap();
    let loaded = store.load();
    assert_eq!(loaded.loaded_count(), 3);
    assert_eq!(loaded.missing(), vec![TFIDF_FILE]);
    assert!(loaded.complete().is_none());
}

#[test]
fn test_corrupt_artifact_is_treated_as_missing() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path());
    let outcome = Trainer::default().train(&corpus()).unwrap();
    store.save(&outcome.artifacts).unwrap();

    let mut file = std::fs::File::create(store.path(NAIVE_BAYES_FILE)).unwrap();
    file.write_all(b"{ not json").unwrap();

    let loaded = store.load();
    assert!(loaded.naive_bayes.is_none());
    assert!(!loaded.is_complete());
}

/// Same reviews plus extra vocabulary, so the fitted vectorizer is wider
fn wider_corpus() -> Vec<LabeledReview> {
    let mut wider = corpus();
    for _ in 0..20 {
        wider.push(LabeledReview::new("spectacular scenery", Sentiment::Positive));
        wider.push(LabeledReview::new("dreadful pacing", Sentiment::Negative));
    }
    wider
}

#[test]
fn test_mismatched_artifacts_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path());
    let full = Trainer::default().train(&corpus()).unwrap();
    store.save(&full.artifacts).unwrap();

    let other = Trainer::default().train(&wider_corpus()).unwrap();
    assert_ne!(
        other.artifacts.vectorizer.n_features(),
        full.artifacts.vectorizer.n_features()
    );

    let mut mixed = full.artifacts.clone();
    mixed.vectorizer = other.artifacts.vectorizer;
    assert!(mixed.validate().is_err());
    assert!(store.save(&mixed).is_err());
}

fn options(dir: &Path) -> BootstrapOptions {
    BootstrapOptions {
        model_dir: dir.join("models"),
        dataset_path: None,
        train_on_startup: true,
        heuristic_max_jitter: 0.0,
        heuristic_seed: Some(7),
        ..Default::default()
    }
}

#[test]
fn test_bootstrap_falls_back_without_artifacts_or_dataset() {
    let dir = TempDir::new().unwrap();
    let pipeline = bootstrap(&options(dir.path())).unwrap();

    assert_eq!(pipeline.mode(), ServingMode::Heuristic);
    assert!(pipeline.origin().is_none());
    assert!(matches!(pipeline, ServingPipeline::Heuristic(_)));

    let result = pipeline.classify("absolutely amazing and wonderful").unwrap();
    assert_eq!(result.logistic_regression.sentiment, Sentiment::Positive);
    assert_eq!(result.naive_bayes.sentiment, Sentiment::Positive);
}

#[test]
fn test_bootstrap_trains_from_dataset_and_saves() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(dir.path());
    opts.dataset_path = Some(write_dataset(dir.path()));

    let pipeline = bootstrap(&opts).unwrap();
    assert_eq!(pipeline.mode(), ServingMode::Trained);
    assert_eq!(pipeline.origin(), Some(ArtifactOrigin::TrainedAtStartup));
    assert!(ModelStore::new(&opts.model_dir).load().is_complete());

    // second start loads what the first one saved
    let restarted = bootstrap(&opts).unwrap();
    assert_eq!(restarted.origin(), Some(ArtifactOrigin::Loaded));
}

#[test]
fn test_bootstrap_respects_training_switch() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(dir.path());
    opts.dataset_path = Some(write_dataset(dir.path()));
    opts.train_on_startup = false;

    let pipeline = bootstrap(&opts).unwrap();
    assert_eq!(pipeline.mode(), ServingMode::Heuristic);
    assert!(!ModelStore::new(&opts.model_dir).load().is_complete());
}

#[test]
fn test_ragged_naive_bayes_on_disk_is_rejected() {
    let dir = TempDir::new().unwrap();
    let opts = options(dir.path());
    let store = ModelStore::new(&opts.model_dir);
    let outcome = Trainer::default().train(&corpus()).unwrap();
    store.save(&outcome.artifacts).unwrap();

    // class 1 keeps a single feature while class 0 keeps the full vocabulary
    let path = store.path(NAIVE_BAYES_FILE);
    let mut model: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    model["feature_log_prob"][1] = serde_json::json!([-1.0]);
    std::fs::write(&path, model.to_string()).unwrap();

    let loaded = store.load();
    assert!(loaded.naive_bayes.is_none());
    assert!(loaded.complete().is_none());

    let pipeline = bootstrap(&opts).unwrap();
    assert!(matches!(pipeline, ServingPipeline::Heuristic(_)));
    assert!(pipeline.classify("great film").is_ok());
}

#[test]
fn test_inconsistent_store_on_disk_falls_back() {
    let dir = TempDir::new().unwrap();
    let mut opts = options(dir.path());
    let store = ModelStore::new(&opts.model_dir);
    let full = Trainer::default().train(&corpus()).unwrap();
    store.save(&full.artifacts).unwrap();

    let other = Trainer::default().train(&wider_corpus()).unwrap();
    let file = std::fs::File::create(store.path(VECTORIZER_FILE)).unwrap();
    serde_json::to_writer(file, &other.artifacts.vectorizer).unwrap();

    let loaded = store.load();
    assert!(loaded.is_complete());
    assert!(loaded.complete().is_none());

    let pipeline = bootstrap(&opts).unwrap();
    assert!(matches!(pipeline, ServingPipeline::Heuristic(_)));

    // with a dataset the set is retrained and overwritten
    opts.dataset_path = Some(write_dataset(dir.path()));
    let retrained = bootstrap(&opts).unwrap();
    assert_eq!(retrained.origin(), Some(ArtifactOrigin::TrainedAtStartup));
    assert!(store.load().complete().is_some());
}
