//! TwinTone application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//!    (`--init-config` writes it back out and exits)
//! 2. Open the SQLite history store
//! 3. Build the generation backend, client and tone orchestrator
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;

use twintone_api::state::AppState;
use twintone_api::{routes, RequestGateway};
use twintone_chat::ToneOrchestrator;
use twintone_core::config::{GenerationConfig, ProviderKind, TwinToneConfig};
use twintone_core::error::TwinToneError;
use twintone_generation::{GenerationBackend, GenerationClient, MockBackend, OpenAiBackend};
use twintone_storage::{Database, SqliteHistoryStore};

use cli::CliArgs;

/// Construct the configured generation backend.
///
/// The OpenAI backend reads its key from the environment variable named by
/// `generation.api_key_env`.
fn build_backend(config: &GenerationConfig) -> Result<Arc<dyn GenerationBackend>, TwinToneError> {
    match config.provider {
        ProviderKind::Mock => Ok(Arc::new(MockBackend::new())),
        ProviderKind::OpenAi => {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    TwinToneError::Config(format!(
                        "environment variable {} is not set; export it or run with --provider mock",
                        config.api_key_env
                    ))
                })?;
            Ok(Arc::new(OpenAiBackend::from_config(config, api_key)))
        }
    }
}

fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded under a bootstrap subscriber so load warnings are
    // visible before the configured log level takes over.
    let config_file = args.resolve_config_path();
    let mut config = tracing::subscriber::with_default(
        tracing_subscriber::fmt().with_env_filter(env_filter("info")).finish(),
        || TwinToneConfig::load_or_default(&config_file),
    );
    args.apply_overrides(&mut config);
    config.validate()?;

    if args.init_config {
        config.save(&config_file)?;
        println!("Wrote configuration to {}", config_file.display());
        return Ok(());
    }

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.general.log_level))
        .init();

    tracing::info!("Starting TwinTone v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration ready");

    // Storage.
    let db_path = config.general.database_path();
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    let store = Arc::new(SqliteHistoryStore::new(Arc::new(db)));

    // Generation.
    let backend = build_backend(&config.generation)?;
    tracing::info!(
        provider = config.generation.provider.as_str(),
        model = %config.generation.model,
        refine = config.chat.refine,
        "Generation backend ready"
    );
    let client = GenerationClient::from_config(backend, &config.generation);
    let orchestrator = ToneOrchestrator::from_config(client, &config.chat);

    let gateway = RequestGateway::new(orchestrator, store, config.gateway.clone());
    let state = AppState::new(config.clone(), gateway);

    // API server.
    if let Err(e) = routes::start_server(&config, state).await {
        tracing::error!(error = %e, "API server stopped");
        return Err(e.into());
    }

    Ok(())
}
