use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use super::json_body;
use crate::error::ApiError;
use crate::ops::{self, QrResponse, ValidateResponse, present_str};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ServiceQuery {
    pub service: Option<String>,
}

/// `GET /generate-qr`
pub async fn generate_qr(State(state): State<AppState>) -> Result<Json<QrResponse>, ApiError> {
    ops::generate_now(&state).map(Json)
}

/// `GET /generate-qr-for-service?service=N`
pub async fn generate_qr_for_service(
    State(state): State<AppState>,
    Query(query): Query<ServiceQuery>,
) -> Result<Json<QrResponse>, ApiError> {
    let raw = query
        .service
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("service query parameter is required".into()))?;
    let service = ops::parse_service(&Value::String(raw))?;
    ops::generate_for_service(&state, service).map(Json)
}

/// `POST /validate-qr`. Always 200: a bad token is an answer, not an error.
pub async fn validate_qr(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Json<ValidateResponse> {
    let body = json_body(body).unwrap_or(Value::Null);
    Json(ops::validate(&state, present_str(body.get("qrData"))))
}
