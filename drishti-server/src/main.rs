// Drishti object-detection service: upload media, get annotated results

use anyhow::Context;
use clap::Parser;
use drishti_server::http::{self, ApiState};
use drishti_vision::{ModelLoader, ModelRegistry, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "drishti-server", about = "Object-detection media service")]
struct Args {
    /// Interface to bind
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory holding the .onnx model files
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Directory for uploaded media
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory for annotated media
    #[arg(long, default_value = "processed")]
    processed_dir: PathBuf,

    /// Model key loaded at startup
    #[arg(long, default_value = "best")]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = ServiceConfig {
        host: args.host,
        port: args.port,
        model_dir: args.model_dir,
        upload_dir: args.upload_dir,
        processed_dir: args.processed_dir,
        default_model: args.model,
        ..ServiceConfig::default()
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    config
        .ensure_dirs()
        .context("creating media directories")?;
    info!("Upload folder: {}", config.upload_dir.display());
    info!("Processed folder: {}", config.processed_dir.display());

    let registry = Arc::new(ModelRegistry::builtin(&config.model_dir));
    let loader = Arc::new(ModelLoader::new(registry.clone(), &config.default_model));
    if let Err(e) = loader.load(&config.default_model) {
        // The server still starts; requests report the model as unavailable
        // until a switch succeeds.
        warn!("Failed to load default model {}: {}", config.default_model, e);
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = ApiState {
        config: Arc::new(config),
        registry,
        loader,
    };
    let app = http::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Starting server on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
