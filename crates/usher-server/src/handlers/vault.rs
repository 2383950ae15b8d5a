use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;

use super::json_body;
use crate::error::ApiError;
use crate::ops::{self, DecryptedResponse, EncryptedResponse, present, present_str};
use crate::state::AppState;

/// `POST /secure-encrypt {uid, userData}`
pub async fn secure_encrypt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EncryptedResponse>, ApiError> {
    let body = json_body(body)?;
    let (Some(uid), Some(user_data)) = (present_str(body.get("uid")), present(body.get("userData")))
    else {
        return Err(ApiError::BadRequest("uid and userData are required".into()));
    };
    ops::secure_encrypt(&state, uid, user_data).await.map(Json)
}

/// `POST /secure-decrypt {uid, encryptedData}`
pub async fn secure_decrypt(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DecryptedResponse>, ApiError> {
    let body = json_body(body)?;
    let (Some(uid), Some(encrypted)) = (
        present_str(body.get("uid")),
        present_str(body.get("encryptedData")),
    ) else {
        return Err(ApiError::BadRequest("uid and encryptedData are required".into()));
    };
    ops::secure_decrypt(&state, uid, encrypted).await.map(Json)
}

/// `POST /encrypt-user-data {userData}`
pub async fn encrypt_user_data(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EncryptedResponse>, ApiError> {
    let body = json_body(body)?;
    let user_data = present(body.get("userData"))
        .ok_or_else(|| ApiError::BadRequest("userData is required".into()))?;
    ops::encrypt_user_data(&state, user_data).map(Json)
}

/// `POST /decrypt-user-data {encryptedData}`
pub async fn decrypt_user_data(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DecryptedResponse>, ApiError> {
    let body = json_body(body)?;
    let encrypted = present_str(body.get("encryptedData"))
        .ok_or_else(|| ApiError::BadRequest("encryptedData is required".into()))?;
    ops::decrypt_user_data(&state, encrypted).map(Json)
}
