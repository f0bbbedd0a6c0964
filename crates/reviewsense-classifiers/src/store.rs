//! Flat-file persistence of the four fitted artifacts
//!
//! Each artifact lives in its own JSON file under the model directory.
//! Loading is best-effort: a missing or unreadable file only leaves that
//! artifact absent, and an incomplete set is reported rather than treated
//! as a failure.

use crate::classifier::LinearClassifier;
use crate::logistic::LogisticRegression;
use crate::naive_bayes::MultinomialNaiveBayes;
use crate::tfidf::TfidfTransformer;
use crate::vectorizer::CountVectorizer;
use reviewsense_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const LOGISTIC_REGRESSION_FILE: &str = "logreg_model.json";
pub const NAIVE_BAYES_FILE: &str = "naive_bayes_model.json";
pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const TFIDF_FILE: &str = "tfidf.json";

/// All four fitted artifacts, consistent with each other
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub logistic_regression: LogisticRegression,
    pub naive_bayes: MultinomialNaiveBayes,
    pub vectorizer: CountVectorizer,
    pub tfidf: TfidfTransformer,
}

impl ArtifactSet {
    /// Check that every artifact agrees on the vocabulary size
    pub fn validate(&self) -> Result<()> {
        self.naive_bayes.check_shape()?;
        let expected = self.vectorizer.n_features();
        let widths = [
            self.tfidf.n_features(),
            self.logistic_regression.n_features(),
            self.naive_bayes.n_features(),
        ];
        match widths.into_iter().find(|&w| w != expected) {
            Some(got) => Err(Error::DimensionMismatch { expected, got }),
            None => Ok(()),
        }
    }
}

/// Whatever subset of the artifacts could be read
#[derive(Debug, Clone, Default)]
pub struct LoadedArtifacts {
    pub logistic_regression: Option<LogisticRegression>,
    pub naive_bayes: Option<MultinomialNaiveBayes>,
    pub vectorizer: Option<CountVectorizer>,
    pub tfidf: Option<TfidfTransformer>,
}

impl LoadedArtifacts {
    pub fn loaded_count(&self) -> usize {
        [
            self.logistic_regression.is_some(),
            self.naive_bayes.is_some(),
            self.vectorizer.is_some(),
            self.tfidf.is_some(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }

    pub fn is_complete(&self) -> bool {
        self.loaded_count() == 4
    }

    /// File names of the artifacts that are absent
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.logistic_regression.is_none() {
            missing.push(LOGISTIC_REGRESSION_FILE);
        }
        if self.naive_bayes.is_none() {
            missing.push(NAIVE_BAYES_FILE);
        }
        if self.vectorizer.is_none() {
            missing.push(VECTORIZER_FILE);
        }
        if self.tfidf.is_none() {
            missing.push(TFIDF_FILE);
        }
        missing
    }

    /// The full set, if all four are present and consistent
    pub fn complete(self) -> Option<ArtifactSet> {
        let set = ArtifactSet {
            logistic_regression: self.logistic_regression?,
            naive_bayes: self.naive_bayes?,
            vectorizer: self.vectorizer?,
            tfidf: self.tfidf?,
        };
        match set.validate() {
            Ok(()) => Some(set),
            Err(e) => {
                warn!("Ignoring inconsistent model artifacts: {}", e);
                None
            }
        }
    }
}

/// Reads and writes artifacts under a fixed directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Load every artifact that exists and parses
    pub fn load(&self) -> LoadedArtifacts {
        let loaded = LoadedArtifacts {
            logistic_regression: self.read_artifact(LOGISTIC_REGRESSION_FILE),
            naive_bayes: self.read_artifact(NAIVE_BAYES_FILE),
            vectorizer: self.read_artifact(VECTORIZER_FILE),
            tfidf: self.read_artifact(TFIDF_FILE),
        };
        debug!(
            dir = %self.dir.display(),
            loaded = loaded.loaded_count(),
            "Model store scanned"
        );
        loaded
    }

    /// Persist all four artifacts, creating the directory if needed
    pub fn save(&self, artifacts: &ArtifactSet) -> Result<()> {
        artifacts.validate()?;
        fs::create_dir_all(&self.dir)?;

        self.write_artifact(LOGISTIC_REGRESSION_FILE, &artifacts.logistic_regression)?;
        self.write_artifact(NAIVE_BAYES_FILE, &artifacts.naive_bayes)?;
        self.write_artifact(VECTORIZER_FILE, &artifacts.vectorizer)?;
        self.write_artifact(TFIDF_FILE, &artifacts.tfidf)?;

        info!("Saved model artifacts to {}", self.dir.display());
        Ok(())
    }

    fn read_artifact<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.path(file);
        if !path.exists() {
            debug!("Artifact not found: {}", path.display());
            return None;
        }

        let parsed = File::open(&path)
            .map_err(Error::from)
            .and_then(|f| serde_json::from_reader(BufReader::new(f)).map_err(Error::from));

        match parsed {
            Ok(artifact) => {
                info!("Loaded {}", path.display());
                Some(artifact)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Written to a sibling temp file, then renamed into place
    fn write_artifact<T: Serialize>(&self, file: &str, artifact: &T) -> Result<()> {
        let path = self.path(file);
        let tmp = path.with_extension("json.tmp");

        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, artifact)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
