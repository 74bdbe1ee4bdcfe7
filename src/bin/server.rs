use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use salary_predictor::prediction::{ModelProvider, PredictionService};
use salary_predictor::server::config::ServerConfig;
use salary_predictor::VERSION;
use salary_predictor::web;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &Path) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("Server version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();
    dotenv().ok(); // Load .env file

    // Logging depends on the configured log directory, so config errors are
    // reported on stderr.
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting salary prediction server, version: {}", VERSION);

    // --- Model Setup ---
    let service = Arc::new(PredictionService::new(ModelProvider::from_artifact(
        server_config.model_path.clone(),
    )));
    if let Err(e) = service.ensure_model() {
        // Nothing can be served without the model.
        error!(path = %server_config.model_path.display(), error = %e, "Model artifact could not be loaded.");
        return Err(e.into());
    }

    let templates = match web::views::load_templates() {
        Ok(tera) => Arc::new(tera),
        Err(e) => {
            error!(error = %e, "Failed to load page templates.");
            return Err(e.into());
        }
    };

    // --- Axum HTTP Server Setup ---
    let app = web::create_axum_router(service, templates);

    let listener = tokio::net::TcpListener::bind(server_config.listen_address).await?;
    info!(address = %server_config.listen_address, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    Ok(())
}
