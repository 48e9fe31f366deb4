//! Server configuration: defaults, then an optional TOML file, then
//! `TIERKMS_`-prefixed environment variables (nested keys split on `__`,
//! e.g. `TIERKMS_MASTER_KEYS__PUBLIC`).

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tierkms_auth::{AuthorizationPolicy, StaticTokenVerifier, Tier};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::keys::MasterKeyTable;

pub const ENV_PREFIX: &str = "TIERKMS_";
pub const CONFIG_PATH_ENV: &str = "TIERKMS_CONFIG";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8001";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub tls: Option<TlsConfig>,
    pub master_keys: MasterKeysConfig,
    /// Serve with the built-in demonstration keys instead of `master_keys`.
    pub use_demo_keys: bool,
    pub auth: AuthConfig,
    pub body_limit_bytes: usize,
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Hex-encoded master keys, one per tier.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterKeysConfig {
    pub public: Option<String>,
    pub internal: Option<String>,
    pub confidential: Option<String>,
    pub restricted: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// The credential is a tier identifier. Placeholder scheme with no secret.
    #[default]
    TierName,
    /// The credential must match one of `auth.tokens`.
    StaticTokens,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub tokens: Vec<TokenConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub tier: Tier,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8001))),
            tls: None,
            master_keys: MasterKeysConfig::default(),
            use_demo_keys: false,
            auth: AuthConfig::default(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl MasterKeysConfig {
    pub fn get(&self, tier: Tier) -> Option<&str> {
        let value = match tier {
            Tier::Public => &self.public,
            Tier::Internal => &self.internal,
            Tier::Confidential => &self.confidential,
            Tier::Restricted => &self.restricted,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

impl fmt::Debug for MasterKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MasterKeysConfig");
        for tier in Tier::ALL {
            s.field(tier.as_str(), &self.get(tier).map(|_| "***"));
        }
        s.finish()
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token", &"***")
            .field("tier", &self.tier)
            .finish()
    }
}

impl ServerConfig {
    /// Load and validate configuration. `path`, when given, must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            info!(path = %path.display(), "loading configuration");
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

        let config: ServerConfig = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;
        config.validate()?;
        debug!(
            listen_addr = %config.listen_addr,
            tls = config.tls.is_some(),
            auth_mode = ?config.auth.mode,
            demo_keys = config.use_demo_keys,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "body_limit_bytes must be greater than zero".to_string(),
            ));
        }
        self.master_key_table()?;
        self.authorization_policy()?;
        Ok(())
    }

    pub fn master_key_table(&self) -> Result<MasterKeyTable, ConfigError> {
        if self.use_demo_keys {
            return MasterKeyTable::demo().map_err(|source| ConfigError::InvalidMasterKey {
                tier: Tier::Public,
                source,
            });
        }
        MasterKeyTable::from_config(&self.master_keys)
    }

    pub fn authorization_policy(&self) -> Result<AuthorizationPolicy, ConfigError> {
        match self.auth.mode {
            AuthMode::TierName => {
                if !self.auth.tokens.is_empty() {
                    warn!("auth.tokens are ignored when auth.mode = tier-name");
                }
                Ok(AuthorizationPolicy::tier_names())
            }
            AuthMode::StaticTokens => {
                if self.auth.tokens.is_empty() {
                    return Err(ConfigError::Invalid(
                        "auth.mode = static-tokens requires at least one entry in auth.tokens"
                            .to_string(),
                    ));
                }
                let verifier = StaticTokenVerifier::new(
                    self.auth.tokens.iter().map(|t| (t.token.clone(), t.tier)),
                )?;
                Ok(AuthorizationPolicy::new(Arc::new(verifier)))
            }
        }
    }
}
