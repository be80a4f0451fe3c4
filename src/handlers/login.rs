//! Login handler: exchange the static credential for a bearer token.

use crate::config::AppState;
use crate::error::{Error, Result};
use axum::{
    extract::{Form, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    if !state.credentials.verify(&form.username, &form.password) {
        warn!("POST /token - failed login attempt for {}", form.username);
        return Err(Error::LoginFail);
    }

    let token = state
        .tokens
        .issue(&form.username)
        .map_err(|e| Error::Internal(e.to_string()))?;

    info!("POST /token - issued token for {}", form.username);
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
    }))
}
