// ── RPC-callable adapter ──
//
// `POST /rpc/{function}` with `{"data": {...}}`. Success is
// `{"result": {...}}`; failure is `{"error": {"status", "message"}}`.
// Shares every operation with the fetch handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;
use crate::ops::{self, present, present_str};
use crate::state::AppState;

pub async fn dispatch(
    State(state): State<AppState>,
    Path(function): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match body {
        Ok(Json(mut body)) => body.get_mut("data").map(Value::take).unwrap_or(Value::Null),
        Err(rejection) => {
            return ApiError::BadRequest(format!("invalid JSON body: {}", rejection.body_text()))
                .into_callable_response();
        }
    };

    debug!(%function, "callable invoked");
    match call(&state, &function, &data).await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(err) => err.into_callable_response(),
    }
}

async fn call(state: &AppState, function: &str, data: &Value) -> Result<Value, ApiError> {
    match function {
        "generateServiceQR" => match present(data.get("service")) {
            Some(service) => {
                let service = ops::parse_service(service)?;
                to_value(&ops::generate_for_service(state, service)?)
            }
            None => to_value(&ops::generate_now(state)?),
        },
        "validateQRCode" => {
            let qr_data = present_str(data.get("qrData"))
                .ok_or_else(|| ApiError::BadRequest("qrData is required".into()))?;
            to_value(&ops::validate(state, Some(qr_data)))
        }
        "encryptUserData" => {
            let user_data = present(data.get("userData"))
                .ok_or_else(|| ApiError::BadRequest("userData is required".into()))?;
            to_value(&ops::encrypt_user_data(state, user_data)?)
        }
        "decryptUserData" => {
            let encrypted = present_str(data.get("encryptedData"))
                .ok_or_else(|| ApiError::BadRequest("encryptedData is required".into()))?;
            to_value(&ops::decrypt_user_data(state, encrypted)?)
        }
        "secureEncrypt" => {
            let (Some(uid), Some(user_data)) =
                (present_str(data.get("uid")), present(data.get("userData")))
            else {
                return Err(ApiError::BadRequest("uid and userData are required".into()));
            };
            to_value(&ops::secure_encrypt(state, uid, user_data).await?)
        }
        "secureDecrypt" => {
            let (Some(uid), Some(encrypted)) =
                (present_str(data.get("uid")), present_str(data.get("encryptedData")))
            else {
                return Err(ApiError::BadRequest("uid and encryptedData are required".into()));
            };
            to_value(&ops::secure_decrypt(state, uid, encrypted).await?)
        }
        _ => Err(ApiError::NotFound),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}
