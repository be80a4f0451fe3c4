//! Route table.
//!
//! Everything except `GET /` and `POST /token` sits behind the bearer
//! auth middleware.

use crate::auth::middleware::mw_require_auth;
use crate::config::AppState;
use crate::handlers::{login, patients};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/view", get(patients::view))
        .route("/patient/{patient_id}", get(patients::view_patient))
        .route("/sort", get(patients::sort_patients))
        .route("/create", post(patients::create_patient))
        .route("/edit/{patient_id}", put(patients::update_patient))
        .route("/delete/{patient_id}", delete(patients::delete_patient))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .route("/", get(patients::about))
        .route("/token", post(login::login))
        .merge(protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
