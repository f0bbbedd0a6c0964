//! ReviewSense
//!
//! Movie review sentiment API backed by logistic regression and naive Bayes
//! classifiers, with a keyword fallback when no trained models are available.

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use reviewsense_classifiers::{
    bootstrap, load_dataset, ModelStore, ReviewCatalog, SentimentPipeline, Trainer,
};
use reviewsense_server::cli::{Cli, Commands, ServeArgs, TrainArgs};
use reviewsense_server::{build_router, AppState, ServerConfig};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = ServerConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    info!("Configuration loaded");

    match cli.command_or_default() {
        Commands::Serve(args) => serve(config, &args).await,
        Commands::Train(args) => train(config, &args).await,
    }
}

async fn serve(mut config: ServerConfig, args: &ServeArgs) -> Result<()> {
    config.apply_serve_args(args);
    config.validate()?;
    let addr = config.socket_addr()?;

    info!("Starting ReviewSense");
    info!("Model directory: {}", config.model_dir.display());

    let metrics_handle = init_metrics()?;

    // Startup training is CPU-bound
    let options = config.bootstrap_options();
    let pipeline = tokio::task::spawn_blocking(move || bootstrap(&options)).await??;

    match pipeline.origin() {
        Some(origin) => info!(?origin, "Serving trained models"),
        None => warn!("Models not loaded; serving mock predictions"),
    }

    let catalog = ReviewCatalog::demo();
    info!(titles = catalog.len(), "Demo review catalog ready");

    let pipeline: Arc<dyn SentimentPipeline> = Arc::new(pipeline);
    let state = AppState::new(pipeline, Arc::new(catalog)).with_metrics(metrics_handle);
    let app = build_router(state, &config.cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn train(mut config: ServerConfig, args: &TrainArgs) -> Result<()> {
    config.apply_train_args(args);
    config.validate()?;

    let dataset = config
        .dataset_path
        .clone()
        .context("No dataset configured; pass --dataset or set dataset_path")?;
    let training = config.training;

    info!("Training from {}", dataset.display());
    let outcome = tokio::task::spawn_blocking(move || {
        let corpus = load_dataset(&dataset)?;
        Trainer::new(training).train(&corpus)
    })
    .await??;

    ModelStore::new(&config.model_dir).save(&outcome.artifacts)?;

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("reviewsense=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reviewsense=info"))
    };

    let (plain, structured) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

/// Install the Prometheus recorder and describe the service metrics
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "reviewsense_requests_total",
        "Total number of API requests by endpoint"
    );
    metrics::describe_counter!(
        "reviewsense_errors_total",
        "Total number of error responses by kind"
    );
    metrics::describe_histogram!(
        "reviewsense_inference_latency_us",
        metrics::Unit::Microseconds,
        "Classification latency in microseconds by endpoint"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
