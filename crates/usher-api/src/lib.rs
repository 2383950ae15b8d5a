// usher-api: Async client for a deployed usher check-in server.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::WorkerClient;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{Decrypted, Encrypted, GeneratedQr, QrValidation, ServerInfo, ServiceInfo};
