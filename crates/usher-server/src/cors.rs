use std::time::Duration;

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Browser access policy for the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Exact origins, or a single `"*"` for any origin.
    pub allowed_origins: Vec<String>,
    pub max_age: Duration,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
            max_age: Duration::from_secs(86_400),
        }
    }
}

impl CorsPolicy {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

/// GET/POST/OPTIONS with a `Content-Type` header, scoped to the allow-list.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let allow_origin = if policy.allows_any() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(policy.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(%origin, "ignoring invalid CORS origin"))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(policy.max_age)
}
