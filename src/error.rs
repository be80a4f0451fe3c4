use crate::model::ValidationError;
use crate::store::StoreError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

#[derive(Debug)]
pub enum Error {
    // Auth Errors
    LoginFail,
    AuthFailNoToken,
    AuthFailTokenWrongFormat,
    AuthFailTokenInvalid,
    AuthFailCtxNotInRequestExt,

    // Record Errors
    PatientNotFound,
    PatientAlreadyExists,
    Validation(ValidationError),
    InvalidSortField,
    InvalidSortOrder,

    // Storage
    Storage(StoreError),

    // Generic
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Error::LoginFail => (
                StatusCode::UNAUTHORIZED,
                json!("Invalid username or password"),
            ),
            Error::AuthFailNoToken
            | Error::AuthFailTokenWrongFormat
            | Error::AuthFailTokenInvalid => (
                StatusCode::UNAUTHORIZED,
                json!("Invalid authentication credentials"),
            ),
            Error::AuthFailCtxNotInRequestExt => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!("Auth context missing"),
            ),
            Error::PatientNotFound => (StatusCode::NOT_FOUND, json!("Patient not found")),
            Error::PatientAlreadyExists => {
                (StatusCode::BAD_REQUEST, json!("Patient already exists"))
            }
            Error::Validation(err) => {
                let violations: Vec<Value> = err
                    .violations
                    .iter()
                    .map(|v| json!({ "field": v.field, "message": v.message }))
                    .collect();
                (StatusCode::UNPROCESSABLE_ENTITY, Value::Array(violations))
            }
            Error::InvalidSortField => (
                StatusCode::BAD_REQUEST,
                json!("Invalid field, select from height, weight or bmi"),
            ),
            Error::InvalidSortOrder => (
                StatusCode::BAD_REQUEST,
                json!("Invalid order, choose from asc or desc"),
            ),
            Error::Storage(err) => (StatusCode::INTERNAL_SERVER_ERROR, json!(err.to_string())),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!(msg)),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Storage(err)
    }
}
