//! HTTP boundary for usher check-in tokens.
//!
//! Stateless axum handlers over a shared [`usher_core::QrTokenService`]:
//!
//! - `GET  /generate-qr`, `GET /generate-qr-for-service?service=N`
//! - `POST /validate-qr` (always 200; the verdict is in the body)
//! - `POST /secure-encrypt`, `POST /secure-decrypt` (per-subject keys)
//! - `POST /encrypt-user-data`, `POST /decrypt-user-data`
//! - `POST /rpc/{function}`, the RPC-callable entry point
//!
//! Every response carries CORS headers from the configured allow-list.

pub mod cors;
pub mod error;
pub mod handlers;
pub mod ops;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use cors::{CorsPolicy, build_cors_layer};
pub use error::{ApiError, ServerError};
pub use state::{AppState, ServerSecrets};

use handlers::{callable, info, qr, vault};

/// Assemble every route, the 404 fallback, CORS, and request tracing.
pub fn build_router(state: AppState, cors: &CorsPolicy) -> Router {
    Router::new()
        .route("/", get(info::root))
        .route("/generate-qr", get(qr::generate_qr))
        .route("/generate-qr-for-service", get(qr::generate_qr_for_service))
        .route("/validate-qr", post(qr::validate_qr))
        .route("/secure-encrypt", post(vault::secure_encrypt))
        .route("/secure-decrypt", post(vault::secure_decrypt))
        .route("/encrypt-user-data", post(vault::encrypt_user_data))
        .route("/decrypt-user-data", post(vault::decrypt_user_data))
        .route("/rpc/{function}", post(callable::dispatch))
        .fallback(info::not_found)
        .method_not_allowed_fallback(info::not_found)
        .layer(build_cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve until Ctrl+C or SIGTERM, then drain in-flight requests.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;
    info!("server stopped");
    Ok(())
}

/// Resolves on the first shutdown signal. If a handler cannot be installed
/// that signal is simply never observed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
