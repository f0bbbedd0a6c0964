//! Offline training of the feature pipeline and classifier pair

use crate::classifier::LinearClassifier;
use crate::features::SparseVector;
use crate::logistic::{LogisticRegression, LogisticRegressionParams};
use crate::naive_bayes::MultinomialNaiveBayes;
use crate::normalize::normalize;
use crate::store::ArtifactSet;
use crate::tfidf::TfidfTransformer;
use crate::vectorizer::CountVectorizer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reviewsense_core::{ClassifierMetrics, Error, Result, Sentiment};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// One row of the labeled dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub review: String,
    pub sentiment: Sentiment,
}

impl LabeledReview {
    pub fn new(review: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            review: review.into(),
            sentiment,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    review: String,
    sentiment: String,
}

/// Read a `review,sentiment` CSV file with a header row
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<LabeledReview>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::dataset(format!("cannot open {}: {e}", path.display())))?;

    let mut reviews = Vec::new();
    for (line, row) in reader.deserialize::<DatasetRow>().enumerate() {
        // header is line 1
        let row = row.map_err(|e| Error::dataset(format!("row {}: {e}", line + 2)))?;
        let sentiment = row
            .sentiment
            .parse::<Sentiment>()
            .map_err(|e| Error::dataset(format!("row {}: {e}", line + 2)))?;
        reviews.push(LabeledReview::new(row.review, sentiment));
    }

    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Training settings. The seed and split ratio are fixed by default so that
/// repeated runs on the same dataset partition it identically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub logistic_regression: LogisticRegressionParams,
    pub naive_bayes_alpha: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            logistic_regression: LogisticRegressionParams::default(),
            naive_bayes_alpha: MultinomialNaiveBayes::DEFAULT_ALPHA,
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub vocabulary_size: usize,
    pub logistic_regression_iterations: usize,
    pub logistic_regression: ClassifierMetrics,
    pub naive_bayes: ClassifierMetrics,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ArtifactSet,
    pub report: TrainingReport,
}

/// Fits the feature pipeline and both classifiers on a labeled corpus
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Split the corpus into `(train, test)` rows.
    ///
    /// The corpus is shuffled once, then permuted again by the split, both
    /// with the configured seed. The test split takes the first
    /// `ceil(n * test_fraction)` rows of the permutation.
    pub fn split<'a>(
        &self,
        corpus: &'a [LabeledReview],
    ) -> Result<(Vec<&'a LabeledReview>, Vec<&'a LabeledReview>)> {
        if !(0.0..1.0).contains(&self.config.test_fraction) || self.config.test_fraction == 0.0 {
            return Err(Error::config("test_fraction must be in (0, 1)"));
        }

        let n = corpus.len();
        let n_test = (n as f64 * self.config.test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(Error::dataset(format!(
                "{n} reviews is too few to hold out a test split"
            )));
        }

        let mut rows: Vec<&LabeledReview> = corpus.iter().collect();
        rows.shuffle(&mut StdRng::seed_from_u64(self.config.seed));
        rows.shuffle(&mut StdRng::seed_from_u64(self.config.seed));

        let train = rows.split_off(n_test);
        Ok((train, rows))
    }

    pub fn train(&self, corpus: &[LabeledReview]) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let (train, test) = self.split(corpus)?;
        info!(
            train = train.len(),
            test = test.len(),
            "Training sentiment models"
        );

        let clean = |rows: &[&LabeledReview]| -> Vec<String> {
            rows.iter().map(|r| normalize(&r.review)).collect()
        };
        let train_docs = clean(&train);
        let test_docs = clean(&test);
        let train_labels: Vec<Sentiment> = train.iter().map(|r| r.sentiment).collect();
        let test_labels: Vec<Sentiment> = test.iter().map(|r| r.sentiment).collect();

        let vectorizer = CountVectorizer::fit(&train_docs)?;
        let n_features = vectorizer.n_features();
        info!(vocabulary = n_features, "Vectorizer fitted");

        let train_counts: Vec<SparseVector> =
            train_docs.iter().map(|d| vectorizer.transform(d)).collect();
        let tfidf = TfidfTransformer::fit(&train_counts, n_features)?;

        let train_x = train_counts
            .iter()
            .map(|c| tfidf.transform(c))
            .collect::<Result<Vec<_>>>()?;
        let test_x = test_docs
            .iter()
            .map(|d| tfidf.transform(&vectorizer.transform(d)))
            .collect::<Result<Vec<_>>>()?;

        let logistic_regression = LogisticRegression::fit(
            &train_x,
            &train_labels,
            n_features,
            &self.config.logistic_regression,
        )?;
        let lr_metrics = evaluate(&logistic_regression, &test_x, &test_labels)?;
        info!(
            accuracy = lr_metrics.accuracy,
            precision = lr_metrics.precision,
            recall = lr_metrics.recall,
            f1 = lr_metrics.f1_score,
            "Trained logistic regression"
        );

        let naive_bayes = MultinomialNaiveBayes::fit(
            &train_x,
            &train_labels,
            n_features,
            self.config.naive_bayes_alpha,
        )?;
        let nb_metrics = evaluate(&naive_bayes, &test_x, &test_labels)?;
        info!(
            accuracy = nb_metrics.accuracy,
            precision = nb_metrics.precision,
            recall = nb_metrics.recall,
            f1 = nb_metrics.f1_score,
            "Trained naive Bayes"
        );

        let report = TrainingReport {
            train_samples: train.len(),
            test_samples: test.len(),
            vocabulary_size: n_features,
            logistic_regression_iterations: logistic_regression.iterations(),
            logistic_regression: lr_metrics,
            naive_bayes: nb_metrics,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        Ok(TrainingOutcome {
            artifacts: ArtifactSet {
                logistic_regression: logistic_regression.with_metrics(lr_metrics),
                naive_bayes: naive_bayes.with_metrics(nb_metrics),
                vectorizer,
                tfidf,
            },
            report,
        })
    }
}

fn evaluate(
    classifier: &dyn LinearClassifier,
    x: &[SparseVector],
    truth: &[Sentiment],
) -> Result<ClassifierMetrics> {
    let predicted = x
        .iter()
        .map(|row| classifier.predict(row).map(|p| p.sentiment))
        .collect::<Result<Vec<_>>>()?;
    Ok(ClassifierMetrics::evaluate(truth, &predicted))
}
