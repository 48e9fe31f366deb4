use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

pub const URL_ENV: &str = "TIERKMS_URL";
pub const TOKEN_ENV: &str = "TIERKMS_TOKEN";
pub const CA_BUNDLE_ENV: &str = "TIERKMS_CA_BUNDLE_PEM";
pub const TIMEOUT_ENV: &str = "TIERKMS_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct KmsClientConfig {
    /// Server root, e.g. `https://kms.internal:8001`.
    pub base_url: String,
    /// Sent on every request when set.
    pub credential: Option<String>,
    /// PEM bundle that replaces the platform trust store.
    pub ca_bundle: Option<PathBuf>,
    pub timeout: Duration,
}

impl KmsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            ca_bundle: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `TIERKMS_URL` (required), `TIERKMS_TOKEN`,
    /// `TIERKMS_CA_BUNDLE_PEM` and `TIERKMS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url =
            non_empty(URL_ENV).ok_or_else(|| ClientError::Config(format!("{} is not set", URL_ENV)))?;
        let mut config = Self::new(base_url);
        config.credential = non_empty(TOKEN_ENV);
        config.ca_bundle = non_empty(CA_BUNDLE_ENV).map(PathBuf::from);
        if let Some(secs) = non_empty(TIMEOUT_ENV) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("{} must be whole seconds", TIMEOUT_ENV)))?;
            if secs == 0 {
                return Err(ClientError::Config(format!("{} must be positive", TIMEOUT_ENV)));
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

impl fmt::Debug for KmsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsClientConfig")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("ca_bundle", &self.ca_bundle)
            .field("timeout", &self.timeout)
            .finish()
    }
}
