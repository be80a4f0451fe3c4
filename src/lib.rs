//! Patient Records Server
//!
//! Stores validated patient records (with derived bmi/verdict metrics)
//! in a JSON flat file and gates access behind bearer-token login.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod model;
pub mod router;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use auth::{CredentialStore, TokenService};
use config::{AppState, ServerConfig};
use store::JsonFileStore;

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = ServerConfig::from_env();

    info!("=== Patient Records Server ===");
    info!("Data file: {:?}", config.data_path);
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, signing tokens with the built-in development secret");
    }

    let store = JsonFileStore::new(&config.data_path);
    store.ensure_exists().await?;

    let credentials = CredentialStore::new().with_user(&config.username, &config.password)?;
    info!("Credential store initialized for user {}", config.username);

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::minutes(config.token_ttl_minutes),
    );
    info!("Token ttl: {} minutes", config.token_ttl_minutes);

    let state = AppState {
        store: Arc::new(store),
        credentials: Arc::new(credentials),
        tokens: Arc::new(tokens),
    };

    let app = router::app(state);

    info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
