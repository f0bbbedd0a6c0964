//! Multinomial naive Bayes over TF-IDF weights

use crate::classifier::{check_training_data, LinearClassifier};
use crate::features::SparseVector;
use reviewsense_core::{ClassifierKind, ClassifierMetrics, Error, Result, Sentiment};
use serde::{Deserialize, Serialize};

/// Fitted multinomial naive Bayes with additive smoothing.
///
/// Feature "counts" are the summed TF-IDF weights per class, and class
/// priors are the empirical class frequencies. Deserialization rejects
/// models whose per-class vectors disagree in width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NaiveBayesParts")]
pub struct MultinomialNaiveBayes {
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
    alpha: f64,
    #[serde(default)]
    metrics: Option<ClassifierMetrics>,
}

impl MultinomialNaiveBayes {
    pub const DEFAULT_ALPHA: f64 = 1.0;

    pub fn fit(x: &[SparseVector], y: &[Sentiment], n_features: usize, alpha: f64) -> Result<Self> {
        check_training_data(x, y, n_features)?;
        if alpha <= 0.0 {
            return Err(Error::classifier("smoothing alpha must be positive"));
        }

        let mut class_count = [0usize; 2];
        let mut feature_count = [vec![0.0; n_features], vec![0.0; n_features]];

        for (row, label) in x.iter().zip(y) {
            let class = label.class();
            class_count[class] += 1;
            for (j, value) in row.iter() {
                feature_count[class][j] += value;
            }
        }

        let total = x.len() as f64;
        let class_log_prior = class_count.map(|count| (count as f64 / total).ln());
        let feature_log_prob = feature_count.map(|counts| {
            let denominator = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
            counts
                .into_iter()
                .map(|c| (c + alpha).ln() - denominator)
                .collect()
        });

        Ok(Self {
            class_log_prior,
            feature_log_prob,
            alpha,
            metrics: None,
        })
    }

    /// Attach held-out evaluation metrics
    pub fn with_metrics(mut self, metrics: ClassifierMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Unnormalized joint log likelihood per class
    pub fn joint_log_likelihood(&self, x: &SparseVector) -> Result<[f64; 2]> {
        x.check_dimension(self.n_features())?;
        Ok([0, 1].map(|class| self.class_log_prior[class] + x.dot(&self.feature_log_prob[class])))
    }

    /// Fail unless both classes cover the same non-empty vocabulary
    pub fn check_shape(&self) -> Result<()> {
        let [negative, positive] = &self.feature_log_prob;
        if negative.is_empty() {
            return Err(Error::classifier("naive Bayes model has no features"));
        }
        if negative.len() != positive.len() {
            return Err(Error::DimensionMismatch {
                expected: negative.len(),
                got: positive.len(),
            });
        }
        if self.alpha.is_nan() || self.alpha <= 0.0 {
            return Err(Error::classifier("smoothing alpha must be positive"));
        }
        Ok(())
    }
}

/// Serialized form, checked before it becomes a model
#[derive(Deserialize)]
struct NaiveBayesParts {
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
    alpha: f64,
    #[serde(default)]
    metrics: Option<ClassifierMetrics>,
}

impl TryFrom<NaiveBayesParts> for MultinomialNaiveBayes {
    type Error = Error;

    fn try_from(parts: NaiveBayesParts) -> Result<Self> {
        let model = Self {
            class_log_prior: parts.class_log_prior,
            feature_log_prob: parts.feature_log_prob,
            alpha: parts.alpha,
            metrics: parts.metrics,
        };
        model.check_shape()?;
        Ok(model)
    }
}

impl LinearClassifier for MultinomialNaiveBayes {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::NaiveBayes
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2]> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll[0].max(jll[1]);
        let exp = jll.map(|v| (v - max).exp());
        let sum = exp[0] + exp[1];
        Ok(exp.map(|v| v / sum))
    }

    fn metrics(&self) -> Option<ClassifierMetrics> {
        self.metrics
    }
}
