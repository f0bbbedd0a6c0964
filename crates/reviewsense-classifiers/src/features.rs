//! Sparse feature vectors and the two-stage feature pipeline

use crate::tfidf::TfidfTransformer;
use crate::vectorizer::CountVectorizer;
use reviewsense_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse vector over the fitted vocabulary.
///
/// Indices are strictly increasing and every stored value is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from an index-ordered map, dropping zero entries
    pub fn from_map(entries: BTreeMap<usize, f64>) -> Self {
        let (indices, values) = entries.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    /// Build from unsorted pairs; duplicate indices are summed
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries = BTreeMap::new();
        for (index, value) in pairs {
            *entries.entry(index).or_insert(0.0) += value;
        }
        Self::from_map(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Fail unless every index fits in a space of `n_features` dimensions
    pub fn check_dimension(&self, n_features: usize) -> Result<()> {
        match self.max_index() {
            Some(index) if index >= n_features => Err(Error::DimensionMismatch {
                expected: n_features,
                got: index,
            }),
            _ => Ok(()),
        }
    }

    /// Dot product with a dense vector. Callers check the dimension first.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Apply `f(index, value)` to every stored entry
    pub fn map_values(&self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        let pairs = self.iter().map(|(i, v)| (i, f(i, v)));
        Self::from_map(pairs.collect())
    }
}

/// Count vectorizer followed by TF-IDF reweighting, fitted once and then
/// applied identically to every document.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    vectorizer: CountVectorizer,
    tfidf: TfidfTransformer,
}

impl FeaturePipeline {
    /// Pair a fitted vectorizer with a fitted transformer of the same width
    pub fn new(vectorizer: CountVectorizer, tfidf: TfidfTransformer) -> Result<Self> {
        if vectorizer.n_features() != tfidf.n_features() {
            return Err(Error::DimensionMismatch {
                expected: vectorizer.n_features(),
                got: tfidf.n_features(),
            });
        }
        Ok(Self { vectorizer, tfidf })
    }

    /// Feature vector for an already-normalized document
    pub fn features(&self, cleaned: &str) -> Result<SparseVector> {
        let counts = self.vectorizer.transform(cleaned);
        self.tfidf.transform(&counts)
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs([(3, 1.0), (1, 2.0), (3, 1.5), (2, 0.0)]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 2.5)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.max_index(), Some(3));
    }

    #[test]
    fn test_check_dimension() {
        let v = SparseVector::from_pairs([(0, 1.0), (4, 1.0)]);
        assert!(v.check_dimension(5).is_ok());
        assert!(matches!(
            v.check_dimension(4),
            Err(Error::DimensionMismatch { expected: 4, got: 4 })
        ));
        assert!(SparseVector::default().check_dimension(0).is_ok());
    }

    #[test]
    fn test_dot_and_norm() {
        let v = SparseVector::from_pairs([(0, 3.0), (2, 4.0)]);
        assert_eq!(v.dot(&[1.0, 10.0, 0.5]), 5.0);
        assert_eq!(v.l2_norm(), 5.0);
    }

    #[test]
    fn test_pipeline_rejects_mismatched_parts() {
        let docs = vec!["great movie".to_string(), "awful film".to_string()];
        let vectorizer = CountVectorizer::fit(&docs).unwrap();
        let counts: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let tfidf = TfidfTransformer::fit(&counts, vectorizer.n_features() + 1).unwrap();

        assert!(FeaturePipeline::new(vectorizer, tfidf).is_err());
    }

    #[test]
    fn test_pipeline_features_are_unit_length() {
        let docs = vec!["great great movie".to_string(), "awful film".to_string()];
        let vectorizer = CountVectorizer::fit(&docs).unwrap();
        let counts: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let tfidf = TfidfTransformer::fit(&counts, vectorizer.n_features()).unwrap();
        let pipeline = FeaturePipeline::new(vectorizer, tfidf).unwrap();

        let x = pipeline.features("great movie").unwrap();
        assert!((x.l2_norm() - 1.0).abs() < 1e-12);
        assert!(pipeline.features("unseen words only").unwrap().is_empty());
    }
}
