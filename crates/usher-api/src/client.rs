// Async client for the usher HTTP boundary.
//
// One method per endpoint. Non-2xx responses carrying `{success:false,
// error}` become `Error::Api`; anything else unparseable becomes
// `Error::Deserialization` with the raw body attached.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{Decrypted, Encrypted, ErrorBody, GeneratedQr, QrValidation, ServerInfo};

pub struct WorkerClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl WorkerClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` may include a path prefix (e.g. a reverse-proxy mount);
    /// endpoint paths are appended to it.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::from_reqwest(base_url, http)?;
        client.timeout_secs = transport.timeout.as_secs();
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /`
    pub async fn info(&self) -> Result<ServerInfo, Error> {
        self.get("", &[]).await
    }

    /// `GET /generate-qr`: token for the service active right now.
    pub async fn generate_qr(&self) -> Result<GeneratedQr, Error> {
        self.get("generate-qr", &[]).await
    }

    /// `GET /generate-qr-for-service?service=N`
    pub async fn generate_qr_for_service(&self, service: u32) -> Result<GeneratedQr, Error> {
        self.get("generate-qr-for-service", &[("service", service.to_string())])
            .await
    }

    /// `POST /validate-qr`. Rejected tokens are `Ok` with `is_valid == false`.
    pub async fn validate_qr(&self, qr_data: &str) -> Result<QrValidation, Error> {
        self.post("validate-qr", &json!({ "qrData": qr_data })).await
    }

    /// `POST /secure-encrypt`: seal `user_data` under a key derived for `uid`.
    pub async fn secure_encrypt(&self, uid: &str, user_data: &Value) -> Result<Encrypted, Error> {
        self.post("secure-encrypt", &json!({ "uid": uid, "userData": user_data }))
            .await
    }

    /// `POST /secure-decrypt`
    pub async fn secure_decrypt(&self, uid: &str, encrypted: &str) -> Result<Decrypted, Error> {
        self.post(
            "secure-decrypt",
            &json!({ "uid": uid, "encryptedData": encrypted }),
        )
        .await
    }

    /// `POST /encrypt-user-data`
    pub async fn encrypt_user_data(&self, user_data: &Value) -> Result<Encrypted, Error> {
        self.post("encrypt-user-data", &json!({ "userData": user_data }))
            .await
    }

    /// `POST /decrypt-user-data`
    pub async fn decrypt_user_data(&self, encrypted: &str) -> Result<Decrypted, Error> {
        self.post("decrypt-user-data", &json!({ "encryptedData": encrypted }))
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.parse(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.parse(resp).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn parse<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_owned()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
