//! Core types for ReviewSense

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary sentiment label. The numeric convention is 1 = positive, 0 = negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Map a class index (0 or 1) to a sentiment
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Class index used by the classifiers
    pub fn class(&self) -> usize {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Positive => "positive",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(format!("unknown sentiment label: {other:?}")),
        }
    }
}

/// Which member of the classifier pair produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    LogisticRegression,
    NaiveBayes,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogisticRegression => "logistic_regression",
            Self::NaiveBayes => "naive_bayes",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Held-out evaluation metrics recorded when a classifier is trained.
///
/// Precision, recall and F1 are reported for the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ClassifierMetrics {
    /// Reference figures published for the logistic regression model
    pub const LOGISTIC_REGRESSION_REFERENCE: Self = Self::uniform(0.90);

    /// Reference figures published for the naive Bayes model
    pub const NAIVE_BAYES_REFERENCE: Self = Self::uniform(0.86);

    const fn uniform(value: f64) -> Self {
        Self {
            accuracy: value,
            precision: value,
            recall: value,
            f1_score: value,
        }
    }

    /// Reference metrics reported when no trained model is available
    pub fn reference(kind: ClassifierKind) -> Self {
        match kind {
            ClassifierKind::LogisticRegression => Self::LOGISTIC_REGRESSION_REFERENCE,
            ClassifierKind::NaiveBayes => Self::NAIVE_BAYES_REFERENCE,
        }
    }

    /// Score predictions against ground truth.
    ///
    /// Undefined ratios (no positive predictions, no positive samples) are
    /// reported as 0.0.
    pub fn evaluate(truth: &[Sentiment], predicted: &[Sentiment]) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;

        for (t, p) in truth.iter().zip(predicted) {
            if t == p {
                correct += 1;
            }
            match (t, p) {
                (Sentiment::Positive, Sentiment::Positive) => tp += 1,
                (Sentiment::Negative, Sentiment::Positive) => fp += 1,
                (Sentiment::Positive, Sentiment::Negative) => fn_ += 1,
                _ => {}
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let total = truth.len().min(predicted.len());
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(correct, total),
            precision,
            recall,
            f1_score,
        }
    }
}

/// Output of a single classifier for one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sentiment: Sentiment,

    /// Probability of the predicted class (0.0-1.0)
    pub probability: f64,
}

impl Prediction {
    pub fn new(sentiment: Sentiment, probability: f64) -> Self {
        Self {
            sentiment,
            probability,
        }
    }
}

/// Side-by-side output of both classifiers for one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairPrediction {
    pub logistic_regression: Prediction,
    pub naive_bayes: Prediction,
}

impl PairPrediction {
    pub fn get(&self, kind: ClassifierKind) -> &Prediction {
        match kind {
            ClassifierKind::LogisticRegression => &self.logistic_regression,
            ClassifierKind::NaiveBayes => &self.naive_bayes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parsing() {
        assert_eq!("positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!(" Negative ".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("neutral".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_sentiment_class_roundtrip() {
        assert_eq!(Sentiment::from_class(1), Sentiment::Positive);
        assert_eq!(Sentiment::from_class(0), Sentiment::Negative);
        assert_eq!(Sentiment::Positive.class(), 1);
    }

    #[test]
    fn test_metrics_evaluate() {
        use Sentiment::*;
        let truth = [Positive, Positive, Negative, Negative];
        let predicted = [Positive, Negative, Positive, Negative];

        let m = ClassifierMetrics::evaluate(&truth, &predicted);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.f1_score, 0.5);
    }

    #[test]
    fn test_metrics_no_positive_predictions() {
        use Sentiment::*;
        let m = ClassifierMetrics::evaluate(&[Positive, Negative], &[Negative, Negative]);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.f1_score, 0.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ClassifierKind::NaiveBayes).unwrap();
        assert_eq!(json, "\"naive_bayes\"");
        let json = serde_json::to_string(&Sentiment::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
    }
}
