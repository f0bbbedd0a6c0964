//! Inverse-document-frequency reweighting of term counts

use crate::features::SparseVector;
use reviewsense_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// TF-IDF transform with smoothed IDF and L2 row normalization.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, where `n` is the number of
/// documents seen at fit time and `df(t)` the number containing `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfTransformer {
    idf: Vec<f64>,
}

impl TfidfTransformer {
    /// Capture document frequencies from the training count vectors
    pub fn fit(counts: &[SparseVector], n_features: usize) -> Result<Self> {
        if counts.is_empty() {
            return Err(Error::classifier("cannot fit TF-IDF on an empty corpus"));
        }

        let mut document_frequency = vec![0usize; n_features];
        for row in counts {
            row.check_dimension(n_features)?;
            for (index, _) in row.iter() {
                document_frequency[index] += 1;
            }
        }

        let n = counts.len() as f64;
        let idf = document_frequency
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Ok(Self { idf })
    }

    /// Reweight a count vector and scale it to unit length
    pub fn transform(&self, counts: &SparseVector) -> Result<SparseVector> {
        counts.check_dimension(self.idf.len())?;

        let weighted = counts.map_values(|index, count| count * self.idf[index]);
        let norm = weighted.l2_norm();
        if norm == 0.0 {
            return Ok(weighted);
        }
        Ok(weighted.map_values(|_, value| value / norm))
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> Vec<SparseVector> {
        vec![
            SparseVector::from_pairs([(0, 1.0), (1, 2.0)]),
            SparseVector::from_pairs([(0, 1.0)]),
            SparseVector::from_pairs([(0, 3.0), (2, 1.0)]),
        ]
    }

    #[test]
    fn test_smoothed_idf() {
        let tfidf = TfidfTransformer::fit(&counts(), 3).unwrap();
        let idf = tfidf.idf();

        // term 0 appears in every document
        assert!((idf[0] - 1.0).abs() < 1e-12);
        assert!((idf[1] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        assert!(idf[1] > idf[0]);
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let tfidf = TfidfTransformer::fit(&counts(), 3).unwrap();
        let row = tfidf.transform(&SparseVector::from_pairs([(0, 2.0), (1, 1.0)])).unwrap();

        assert!((row.l2_norm() - 1.0).abs() < 1e-12);
        let values: Vec<_> = row.iter().map(|(_, v)| v).collect();
        assert!(values[1] > values[0] / 2.0);
    }

    #[test]
    fn test_empty_row_stays_empty() {
        let tfidf = TfidfTransformer::fit(&counts(), 3).unwrap();
        assert!(tfidf.transform(&SparseVector::default()).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_foreign_vocabulary() {
        let tfidf = TfidfTransformer::fit(&counts(), 3).unwrap();
        let err = tfidf.transform(&SparseVector::from_pairs([(7, 1.0)])).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, got: 7 }));
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        assert!(TfidfTransformer::fit(&[], 3).is_err());
    }
}
