//! Term-count vectorizer over a vocabulary learned from training text

use crate::features::SparseVector;
use crate::stopwords::is_stop_word;
use regex::Regex;
use reviewsense_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Tokens are runs of two or more word characters
fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Split a normalized document into vocabulary candidates, dropping stop words
pub fn tokenize(document: &str) -> impl Iterator<Item = &str> {
    token_pattern()
        .find_iter(document)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
}

/// Maps documents to sparse term counts.
///
/// Terms are indexed in lexicographic order, so fitting the same corpus
/// always yields the same feature layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountVectorizer {
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    /// Learn the vocabulary of a corpus of normalized documents
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| tokenize(doc.as_ref()))
            .collect();

        if terms.is_empty() {
            return Err(Error::classifier(
                "empty vocabulary; the documents only contain stop words",
            ));
        }

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        Ok(Self { vocabulary })
    }

    /// Count in-vocabulary tokens of a normalized document
    pub fn transform(&self, document: &str) -> SparseVector {
        SparseVector::from_pairs(
            tokenize(document)
                .filter_map(|token| self.vocabulary.get(token))
                .map(|&index| (index, 1.0)),
        )
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "the movie was great and the cast was great".to_string(),
            "a dull movie with a weak plot".to_string(),
        ]
    }

    #[test]
    fn test_vocabulary_is_sorted_and_filtered() {
        let vectorizer = CountVectorizer::fit(&corpus()).unwrap();
        let terms: Vec<_> = vectorizer.vocabulary().keys().cloned().collect();

        assert_eq!(terms, vec!["cast", "dull", "great", "movie", "plot", "weak"]);
        assert_eq!(vectorizer.index_of("cast"), Some(0));
        assert_eq!(vectorizer.index_of("the"), None);
        assert_eq!(vectorizer.index_of("a"), None);
    }

    #[test]
    fn test_transform_counts_terms() {
        let vectorizer = CountVectorizer::fit(&corpus()).unwrap();
        let counts = vectorizer.transform("great great movie about nothing new");

        let great = vectorizer.index_of("great").unwrap();
        let movie = vectorizer.index_of("movie").unwrap();
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(great, 2.0), (movie, 1.0)]);
    }

    #[test]
    fn test_single_character_tokens_are_ignored() {
        let tokens: Vec<_> = tokenize("x marks a spot").collect();
        assert_eq!(tokens, vec!["marks", "spot"]);
    }

    #[test]
    fn test_fit_rejects_stop_word_corpus() {
        let err = CountVectorizer::fit(&["the and of", "a"]).unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = CountVectorizer::fit(&corpus()).unwrap();
        let b = CountVectorizer::fit(&corpus()).unwrap();
        assert_eq!(a, b);
    }
}
