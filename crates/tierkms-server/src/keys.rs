//! The tier -> master key table.

use tierkms_auth::Tier;
use tierkms_crypto::{CryptoError, MasterKey};

use crate::config::MasterKeysConfig;
use crate::error::ConfigError;

/// Fixed demonstration keys. Anyone with this source can unwrap keys wrapped
/// under them; only for local experiments.
const DEMO_KEYS_HEX: [(Tier, &str); 4] = [
    (
        Tier::Public,
        "960f87a5e2eb7d07e67892cbdd60d94053d43f3c26e2bca1c52a6efd3572b8d0",
    ),
    (
        Tier::Internal,
        "fb0d234a0b650ca3382bb7f481db2f96c7bccaf66f99b9160811c1cacb3f616d",
    ),
    (
        Tier::Confidential,
        "efdbe2afc153a13dae44b7415c4ef0d08cc1eaec75f5029220ec738141090bf2",
    ),
    (
        Tier::Restricted,
        "ab4ae72b44fc91c8c2b5e559855a5eded40595ce423cde6b6435e2821da72c44",
    ),
];

/// One master key per tier, fixed at construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct MasterKeyTable {
    public: MasterKey,
    internal: MasterKey,
    confidential: MasterKey,
    restricted: MasterKey,
}

impl MasterKeyTable {
    pub fn new(
        public: MasterKey,
        internal: MasterKey,
        confidential: MasterKey,
        restricted: MasterKey,
    ) -> Self {
        Self {
            public,
            internal,
            confidential,
            restricted,
        }
    }

    /// Build the table by resolving each tier's key in privilege order.
    pub fn try_from_fn<E>(mut f: impl FnMut(Tier) -> Result<MasterKey, E>) -> Result<Self, E> {
        Ok(Self::new(
            f(Tier::Public)?,
            f(Tier::Internal)?,
            f(Tier::Confidential)?,
            f(Tier::Restricted)?,
        ))
    }

    /// The built-in demonstration keys.
    pub fn demo() -> Result<Self, CryptoError> {
        Self::try_from_fn(|tier| {
            let hex = DEMO_KEYS_HEX
                .iter()
                .find(|(t, _)| *t == tier)
                .map(|(_, hex)| *hex)
                .unwrap_or_default();
            MasterKey::from_hex(hex)
        })
    }

    /// Keys from hex strings in configuration; every tier must be present.
    pub fn from_config(config: &MasterKeysConfig) -> Result<Self, ConfigError> {
        Self::try_from_fn(|tier| {
            let hex = config
                .get(tier)
                .ok_or(ConfigError::MissingMasterKey(tier))?;
            MasterKey::from_hex(hex).map_err(|source| ConfigError::InvalidMasterKey { tier, source })
        })
    }

    pub fn get(&self, tier: Tier) -> &MasterKey {
        match tier {
            Tier::Public => &self.public,
            Tier::Internal => &self.internal,
            Tier::Confidential => &self.confidential,
            Tier::Restricted => &self.restricted,
        }
    }
}
