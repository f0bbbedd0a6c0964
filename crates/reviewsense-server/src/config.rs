//! Server configuration

use crate::cli::{ArtifactArgs, ServeArgs, TrainArgs};
use reviewsense_classifiers::{BootstrapOptions, TrainingConfig};
use reviewsense_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration, read from YAML with CLI overrides on top
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the four model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Labeled dataset used when artifacts are missing
    #[serde(default = "default_dataset_path")]
    pub dataset_path: Option<PathBuf>,

    /// Train from the dataset at startup when artifacts are incomplete
    #[serde(default = "default_true")]
    pub train_on_startup: bool,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub heuristic: HeuristicConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from a YAML file, or defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.heuristic.max_jitter) {
            return Err(Error::config("heuristic.max_jitter must be in [0, 1)"));
        }
        let fraction = self.training.test_fraction;
        if fraction <= 0.0 || fraction >= 1.0 {
            return Err(Error::config("training.test_fraction must be in (0, 1)"));
        }
        if self.training.logistic_regression.history == 0 {
            return Err(Error::config("training.logistic_regression.history must be at least 1"));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .map_err(|e| Error::config(format!("invalid listen address: {e}")))
    }

    fn apply_artifact_args(&mut self, args: &ArtifactArgs) {
        if let Some(dir) = &args.model_dir {
            self.model_dir = dir.clone();
        }
        if let Some(dataset) = &args.dataset {
            self.dataset_path = Some(dataset.clone());
        }
    }

    pub fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(listen) = &args.listen {
            self.listen = listen.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if args.no_train {
            self.train_on_startup = false;
        }
        self.apply_artifact_args(&args.artifacts);
    }

    pub fn apply_train_args(&mut self, args: &TrainArgs) {
        if let Some(seed) = args.seed {
            self.training.seed = seed;
        }
        self.apply_artifact_args(&args.artifacts);
    }

    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions {
            model_dir: self.model_dir.clone(),
            dataset_path: self.dataset_path.clone(),
            train_on_startup: self.train_on_startup,
            training: self.training,
            heuristic_max_jitter: self.heuristic.max_jitter,
            heuristic_seed: self.heuristic.seed,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_dir: default_model_dir(),
            dataset_path: default_dataset_path(),
            train_on_startup: true,
            training: TrainingConfig::default(),
            heuristic: HeuristicConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Mock prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Upper bound of the random confidence jitter; 0 disables it
    #[serde(default = "default_max_jitter")]
    pub max_jitter: f64,

    /// Fixed seed for reproducible mock predictions
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            max_jitter: default_max_jitter(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub allow_any_origin: bool,

    /// Origins allowed when `allow_any_origin` is off
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_dataset_path() -> Option<PathBuf> {
    Some(PathBuf::from("data/IMDB Dataset.csv"))
}

fn default_max_jitter() -> f64 {
    0.15
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/no/such/reviewsense.yaml").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 5000);
        assert!(config.cors.allow_any_origin);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = include_str!("../../../reviewsense.example.yaml");
        assert_eq!(ServerConfig::from_yaml(example).unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = ServerConfig::from_yaml(
            "port: 8080\nheuristic:\n  seed: 3\ntraining:\n  seed: 11\n",
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.heuristic.seed, Some(3));
        assert_eq!(config.heuristic.max_jitter, 0.15);
        assert_eq!(config.training.seed, 11);
        assert_eq!(config.training.test_fraction, 0.2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model_dir: /srv/models").unwrap();
        writeln!(file, "dataset_path: null").unwrap();
        writeln!(file, "cors:").unwrap();
        writeln!(file, "  allow_any_origin: false").unwrap();
        writeln!(file, "  allowed_origins: [\"http://localhost:3000\"]").unwrap();
        file.flush().unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.dataset_path, None);
        assert!(!config.cors.allow_any_origin);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ServerConfig::from_yaml("heuristic:\n  max_jitter: 1.5\n").is_err());
        assert!(ServerConfig::from_yaml("listen: not an address\n").is_err());
        assert!(ServerConfig::from_yaml("port: [1, 2]\n").is_err());
        assert!(ServerConfig::from_yaml(
            "training:\n  logistic_regression:\n    history: 0\n"
        )
        .is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let mut config = ServerConfig::default();
        config.apply_serve_args(&ServeArgs {
            listen: Some("127.0.0.1".into()),
            port: Some(9000),
            artifacts: ArtifactArgs {
                model_dir: Some("/tmp/m".into()),
                dataset: None,
            },
            no_train: true,
        });

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.model_dir, PathBuf::from("/tmp/m"));
        assert!(config.dataset_path.is_some());
        assert!(!config.train_on_startup);
    }

    #[test]
    fn test_bootstrap_options() {
        let mut config = ServerConfig::default();
        config.apply_train_args(&TrainArgs {
            artifacts: ArtifactArgs {
                model_dir: None,
                dataset: Some("reviews.csv".into()),
            },
            seed: Some(5),
        });
        config.heuristic.seed = Some(1);

        let options = config.bootstrap_options();
        assert_eq!(options.dataset_path, Some(PathBuf::from("reviews.csv")));
        assert_eq!(options.training.seed, 5);
        assert_eq!(options.heuristic_seed, Some(1));
        assert_eq!(options.heuristic_max_jitter, 0.15);
    }
}
