//! Keyword-counting fallback used when no trained artifacts are available
//!
//! This is a lexicon heuristic, not a model. It exists so the API stays usable
//! in demo deployments, and every response it backs is flagged as such.

use crate::normalize::normalize;
use crate::pipeline::{SentimentPipeline, ServingMode};
use aho_corasick::AhoCorasick;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reviewsense_core::{
    ClassifierKind, ClassifierMetrics, Error, PairPrediction, Prediction, Result, Sentiment,
};

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "love",
    "best",
    "awesome",
    "brilliant",
    "outstanding",
    "incredible",
    "masterpiece",
    "phenomenal",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "worst",
    "hate",
    "boring",
    "disappointing",
    "poor",
    "waste",
    "weak",
];

pub const BASE_CONFIDENCE: f64 = 0.6;
pub const CONFIDENCE_STEP: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Counts how many distinct keywords of a lexicon occur in a text.
/// Matching is by substring, so "best" also counts inside "bestseller".
struct Lexicon {
    matcher: AhoCorasick,
    size: usize,
}

impl Lexicon {
    fn new(words: &[&str], name: &str) -> Result<Self> {
        let matcher = AhoCorasick::new(words).map_err(|e| {
            Error::classifier(format!("Failed to build {name} keyword matcher: {e}"))
        })?;
        Ok(Self {
            matcher,
            size: words.len(),
        })
    }

    fn distinct_hits(&self, text: &str) -> usize {
        let mut seen = vec![false; self.size];
        for m in self.matcher.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|&hit| hit).count()
    }
}

/// Heuristic stand-in for the classifier pair.
///
/// The label is whichever lexicon has more hits, with ties settled by a coin
/// flip. Confidence is `0.6 + 0.1 * |pos - neg|` plus a random jitter in
/// `[0, max_jitter)`, capped at 0.95. Randomness comes from the injected
/// generator so seeded instances are reproducible.
pub struct HeuristicPipeline {
    positive: Lexicon,
    negative: Lexicon,
    max_jitter: f64,
    rng: Mutex<StdRng>,
}

impl HeuristicPipeline {
    pub fn new(max_jitter: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..1.0).contains(&max_jitter) {
            return Err(Error::config("heuristic jitter must be in [0, 1)"));
        }
        Ok(Self {
            positive: Lexicon::new(POSITIVE_KEYWORDS, "positive")?,
            negative: Lexicon::new(NEGATIVE_KEYWORDS, "negative")?,
            max_jitter,
            rng: Mutex::new(rng),
        })
    }

    /// Reproducible instance for tests and demos
    pub fn seeded(seed: u64, max_jitter: f64) -> Result<Self> {
        Self::new(max_jitter, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(max_jitter: f64) -> Result<Self> {
        Self::new(max_jitter, StdRng::from_entropy())
    }

    /// `(positive, negative)` keyword hits in a normalized text
    pub fn keyword_counts(&self, cleaned: &str) -> (usize, usize) {
        (
            self.positive.distinct_hits(cleaned),
            self.negative.distinct_hits(cleaned),
        )
    }

    fn confidence(&self, difference: usize, rng: &mut StdRng) -> f64 {
        let jitter = if self.max_jitter > 0.0 {
            rng.gen_range(0.0..self.max_jitter)
        } else {
            0.0
        };
        let raw = BASE_CONFIDENCE + CONFIDENCE_STEP * difference as f64 + jitter;
        round3(raw.min(MAX_CONFIDENCE))
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl SentimentPipeline for HeuristicPipeline {
    fn classify(&self, document: &str) -> Result<PairPrediction> {
        let cleaned = normalize(document);
        let (positive, negative) = self.keyword_counts(&cleaned);

        let mut rng = self.rng.lock();
        let sentiment = match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::from_class(usize::from(rng.gen_bool(0.5))),
        };

        let difference = positive.abs_diff(negative);
        Ok(PairPrediction {
            logistic_regression: Prediction::new(sentiment, self.confidence(difference, &mut rng)),
            naive_bayes: Prediction::new(sentiment, self.confidence(difference, &mut rng)),
        })
    }

    fn metrics(&self, kind: ClassifierKind) -> ClassifierMetrics {
        ClassifierMetrics::reference(kind)
    }

    fn mode(&self) -> ServingMode {
        ServingMode::Heuristic
    }
}
