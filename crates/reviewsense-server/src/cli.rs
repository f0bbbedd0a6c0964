use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewsense")]
#[command(author, version, about = "Movie review sentiment analysis API")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "REVIEWSENSE_CONFIG",
        default_value = "reviewsense.yaml"
    )]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; `serve` when none was given
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP API
    Serve(ServeArgs),

    /// Train both classifiers from the labeled dataset and save the artifacts
    Train(TrainArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Self::Serve(ServeArgs::default())
    }
}

/// Locations of the model artifacts and the training data
#[derive(Args, Debug, Clone, Default)]
pub struct ArtifactArgs {
    /// Directory holding the four model artifacts
    #[arg(short, long, env = "REVIEWSENSE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Labeled `review,sentiment` CSV dataset
    #[arg(short, long, env = "REVIEWSENSE_DATASET")]
    pub dataset: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Never train at startup; serve mock predictions if artifacts are missing
    #[arg(long)]
    pub no_train: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TrainArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,
}
