use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// Every public route with a one-line description, in display order.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET /", "Service information"),
    ("GET /generate-qr", "Generate a QR token for the current service"),
    (
        "GET /generate-qr-for-service",
        "Generate a QR token for the next occurrence of ?service=N",
    ),
    ("POST /validate-qr", "Validate a QR token against the current time"),
    ("POST /secure-encrypt", "Encrypt data with a per-subject key"),
    ("POST /secure-decrypt", "Decrypt data with a per-subject key"),
    ("POST /encrypt-user-data", "Encrypt user data"),
    ("POST /decrypt-user-data", "Decrypt user data"),
    ("POST /rpc/{function}", "RPC-callable entry point"),
];

/// `GET /`
pub async fn root() -> Json<Value> {
    let endpoints: serde_json::Map<String, Value> = ROUTES
        .iter()
        .map(|(route, description)| ((*route).to_owned(), Value::from(*description)))
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": endpoints,
    }))
}

/// Fallback for unknown paths and unsupported methods.
pub async fn not_found() -> Response {
    let routes: Vec<&str> = ROUTES.iter().map(|(route, _)| *route).collect();
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not found",
            "availableRoutes": routes,
        })),
    )
        .into_response()
}
