use std::fs;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Certificate, Client, Url};
use serde::{Deserialize, Serialize};
use tierkms_auth::Tier;
use tierkms_crypto::{base64_decode, base64_encode};
use tracing::{debug, warn};

use crate::config::KmsClientConfig;
use crate::error::ClientError;
use crate::CREDENTIAL_HEADER;

const API_PREFIX: &str = "api/v1";

#[derive(Serialize)]
struct KeyRequest<'a> {
    key: &'a str,
}

#[derive(Deserialize)]
struct KeyResponse {
    key: String,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Wrap,
    Unwrap,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Wrap => "wrap",
            Operation::Unwrap => "unwrap",
        }
    }
}

/// Client for one tierkms server.
///
/// Holds a single connection pool; clone it to share the pool, drop the last
/// clone to release it.
#[derive(Clone)]
pub struct KmsClient {
    http: Client,
    base_url: Url,
}

impl KmsClient {
    pub fn new(config: KmsClientConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(credential) = &config.credential {
            let mut value = HeaderValue::from_str(credential).map_err(|_| {
                ClientError::Config("credential is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(CREDENTIAL_HEADER, value);
        }

        let mut builder = Client::builder()
            .use_rustls_tls()
            .https_only(true)
            .timeout(config.timeout)
            .default_headers(headers);

        if let Some(path) = &config.ca_bundle {
            let pem = fs::read(path).map_err(|e| {
                ClientError::Config(format!("cannot read CA bundle {}: {}", path.display(), e))
            })?;
            let certs = Certificate::from_pem_bundle(&pem)
                .map_err(|e| ClientError::Config(format!("invalid CA bundle: {}", e)))?;
            if certs.is_empty() {
                return Err(ClientError::Config(format!(
                    "CA bundle {} contains no certificates",
                    path.display()
                )));
            }
            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build()?;
        debug!(base_url = %base_url, timeout_ms = config.timeout.as_millis() as u64, "kms client ready");
        Ok(Self { http, base_url })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(KmsClientConfig::from_env()?)
    }

    /// Wrap `key` under `tier`'s master key.
    pub async fn wrap_key(&self, key: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError> {
        self.call(Operation::Wrap, key, tier).await
    }

    /// Recover the key wrapped under `tier`. Requires a credential that
    /// clears `tier`, unless `tier` is public.
    pub async fn unwrap_key(&self, wrapped: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError> {
        self.call(Operation::Unwrap, wrapped, tier).await
    }

    fn endpoint(&self, op: Operation, tier: Tier) -> Result<Url, ClientError> {
        self.base_url
            .join(&format!("{}/{}/{}", API_PREFIX, op.as_str(), tier.as_str()))
            .map_err(|e| ClientError::Config(format!("invalid endpoint: {}", e)))
    }

    async fn call(&self, op: Operation, key: &[u8], tier: Tier) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(op, tier)?;
        let encoded = base64_encode(key);

        let response = self
            .http
            .post(url)
            .json(&KeyRequest { key: &encoded })
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::from(e);
                warn!(op = op.as_str(), tier = %tier, error = %err, "kms request failed");
                err
            })?;

        let status = response.status();
        // Body reads share the request deadline, so they can time out too.
        let body = response.bytes().await.map_err(|e| {
            let err = ClientError::from(e);
            warn!(op = op.as_str(), tier = %tier, error = %err, "kms response read failed");
            err
        })?;

        if !status.is_success() {
            let err = ClientError::from_status(status.as_u16(), &String::from_utf8_lossy(&body));
            debug!(op = op.as_str(), tier = %tier, status = status.as_u16(), "kms request rejected");
            return Err(err);
        }

        let body: KeyResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let bytes = base64_decode(&body.key).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!(op = op.as_str(), tier = %tier, key_len = bytes.len(), "kms request succeeded");
        Ok(bytes)
    }
}

impl std::fmt::Debug for KmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KmsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse the server root. Only `https` is accepted; a trailing slash is
/// added so relative joins keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {}", raw, e)))?;
    if url.scheme() != "https" {
        return Err(ClientError::Config(format!(
            "base URL must use https, got {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ClientError::Config("base URL has no host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::Config(
            "base URL must not carry a query or fragment".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
