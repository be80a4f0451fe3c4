//! Server configuration and shared application state.

use crate::auth::{CredentialStore, TokenService};
use crate::store::RecordStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Development-only fallback signing key; override with JWT_SECRET.
const DEV_JWT_SECRET: &str = "5c1ecb82e865e8aaed64d1c4c17e7ea43e127bed3d26a08b1f71d48de177d6e7";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Path of the JSON patient data file
    pub data_path: PathBuf,
    /// HS256 signing key for bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// The single static credential
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            data_path: PathBuf::from("patient.json"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 30,
            username: "admin".to_string(),
            password: "adminpass".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            if let Ok(addr) = addr.parse() {
                config.bind_addr = addr;
            }
        }
        if let Ok(path) = std::env::var("PATIENT_DATA") {
            config.data_path = PathBuf::from(path);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Ok(ttl) = std::env::var("TOKEN_TTL_MINUTES") {
            if let Ok(ttl) = ttl.parse() {
                config.token_ttl_minutes = ttl;
            }
        }
        if let Ok(username) = std::env::var("ADMIN_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            config.password = password;
        }
        config
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<TokenService>,
}
