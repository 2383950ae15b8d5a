// ── Fetch-style handlers ──
//
// One handler per endpoint. Bodies are taken as raw JSON values so that
// missing fields produce the same `{success:false, error}` shape as every
// other failure, instead of axum's plain-text rejections.

pub mod callable;
pub mod info;
pub mod qr;
pub mod vault;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;

use crate::error::ApiError;

pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(format!("invalid JSON body: {}", rejection.body_text())))
}
