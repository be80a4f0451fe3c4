//! Patient record handlers: CRUD plus sorting.
//!
//! Every mutation is a full read-modify-write cycle against the record
//! store: load the whole collection, change it in memory, write the
//! whole collection back. No locking; last write wins.

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::model::{Patient, PatientFields, PatientView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

fn to_json(view: PatientView<'_>) -> Result<Value> {
    serde_json::to_value(&view).map_err(|e| Error::Internal(e.to_string()))
}

/// GET /
pub async fn about() -> Json<Value> {
    Json(json!({
        "message": "Welcome to fully functional API to manage your patient records."
    }))
}

/// GET /view
pub async fn view(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Value>> {
    info!("GET /view - {}", ctx.subject());

    let records = state.store.load().await?;
    let mut out = Map::new();
    for (id, fields) in records.iter() {
        out.insert(id.to_string(), to_json(PatientView::new(id, fields))?);
    }
    Ok(Json(Value::Object(out)))
}

/// GET /patient/{patient_id}
pub async fn view_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>> {
    info!("GET /patient/{}", patient_id);

    let records = state.store.load().await?;
    let fields = records.get(&patient_id).ok_or(Error::PatientNotFound)?;
    Ok(Json(to_json(PatientView::new(&patient_id, fields))?))
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// GET /sort?sort_by=&order=
///
/// Stable sort: ties keep their original storage order.
pub async fn sort_patients(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Value>> {
    let sort_by = query.sort_by.as_deref().unwrap_or("");
    if !["height", "weight", "bmi"].contains(&sort_by) {
        return Err(Error::InvalidSortField);
    }
    let descending = match query.order.as_deref().unwrap_or("asc") {
        "asc" => false,
        "desc" => true,
        _ => return Err(Error::InvalidSortOrder),
    };

    info!("GET /sort - by {} {}", sort_by, if descending { "desc" } else { "asc" });

    let records = state.store.load().await?;
    let key = |fields: &PatientFields| match sort_by {
        "height" => fields.height,
        "weight" => fields.weight,
        _ => fields.bmi(),
    };

    let mut entries: Vec<(&str, &PatientFields)> = records.iter().collect();
    entries.sort_by(|&(_, a), &(_, b)| {
        let ord = key(a)
            .partial_cmp(&key(b))
            .unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let mut out = Vec::with_capacity(entries.len());
    for (id, fields) in entries {
        out.push(to_json(PatientView::new(id, fields))?);
    }
    Ok(Json(Value::Array(out)))
}

/// POST /create
pub async fn create_patient(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>)> {
    let Patient { id, fields } = Patient::from_value(&body)?;

    let mut records = state.store.load().await?;
    if records.contains(&id) {
        return Err(Error::PatientAlreadyExists);
    }
    records.insert(id.clone(), fields);
    state.store.save(&records).await?;

    info!("POST /create - patient {} created", id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "patient created successfully" })),
    ))
}

/// PUT /edit/{patient_id}
pub async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let mut records = state.store.load().await?;
    let merged = records
        .get(&patient_id)
        .ok_or(Error::PatientNotFound)?
        .merge_update(&body)?;

    records.insert(patient_id.clone(), merged);
    state.store.save(&records).await?;

    info!("PUT /edit/{} - patient updated", patient_id);
    Ok(Json(json!({ "message": "patient updated" })))
}

/// DELETE /delete/{patient_id}
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>> {
    let mut records = state.store.load().await?;
    if records.remove(&patient_id).is_none() {
        return Err(Error::PatientNotFound);
    }
    state.store.save(&records).await?;

    info!("DELETE /delete/{} - patient deleted", patient_id);
    Ok(Json(json!({ "message": "patient deleted" })))
}
