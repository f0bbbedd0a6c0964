//! Linear classifier trait shared by the classifier pair

use crate::features::SparseVector;
use reviewsense_core::{ClassifierKind, ClassifierMetrics, Prediction, Result, Sentiment};

/// A fitted binary classifier over TF-IDF feature vectors.
///
/// Class 1 is positive sentiment, class 0 negative.
pub trait LinearClassifier: Send + Sync {
    /// Which member of the pair this is
    fn kind(&self) -> ClassifierKind;

    /// Dimensionality of the feature space the classifier was fitted on
    fn n_features(&self) -> usize;

    /// Class probabilities as `[negative, positive]`
    fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2]>;

    /// Held-out metrics recorded at training time, if any
    fn metrics(&self) -> Option<ClassifierMetrics>;

    /// Most probable class and its probability. Ties go to negative.
    fn predict(&self, x: &SparseVector) -> Result<Prediction> {
        let proba = self.predict_proba(x)?;
        let class = usize::from(proba[1] > proba[0]);
        Ok(Prediction::new(Sentiment::from_class(class), proba[class]))
    }
}

/// Reject empty, ragged or single-class training data
pub(crate) fn check_training_data(
    x: &[SparseVector],
    y: &[Sentiment],
    n_features: usize,
) -> Result<()> {
    use reviewsense_core::Error;

    if x.is_empty() {
        return Err(Error::classifier("cannot fit on an empty training set"));
    }
    if x.len() != y.len() {
        return Err(Error::classifier(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        )));
    }
    if !y.iter().any(Sentiment::is_positive) || y.iter().all(Sentiment::is_positive) {
        return Err(Error::classifier(
            "training data must contain both positive and negative samples",
        ));
    }
    for row in x {
        row.check_dimension(n_features)?;
    }
    Ok(())
}
