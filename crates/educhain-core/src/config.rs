//! Registry configuration loading and management.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Full configuration for an EduChain registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Identifier generation policy for credentials and requests.
    #[serde(default)]
    pub identifiers: IdentifierConfig,

    /// Issuance collision handling.
    #[serde(default)]
    pub issuance: IssuanceConfig,

    /// Holder lookup strategy.
    #[serde(default)]
    pub holder_index: HolderIndexConfig,

    /// Ledger substrate backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How new keys are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// The holder id is the key. One record per holder.
    NaturalKey,
    /// `<prefix>-<unix micros>`. Collides within one microsecond.
    Timestamp,
    /// BLAKE3 digest over the descriptive fields, time, and a nonce.
    ContentHash,
    /// Random UUID v4.
    #[default]
    Random,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NaturalKey => write!(f, "natural_key"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::ContentHash => write!(f, "content_hash"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// What issuance does when a natural key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    #[default]
    Reject,
    Overwrite,
}

/// How "all credentials for holder H" is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HolderLookup {
    /// Point lookup under natural keys, otherwise indexed with scan fallback.
    #[default]
    Auto,
    /// Always page through the whole credential keyspace.
    Scan,
    /// Substrate field index, scan when the substrate has none.
    Indexed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierConfig {
    #[serde(default)]
    pub credential_strategy: IdStrategy,
    /// Tag for timestamp-composed credential ids.
    #[serde(default = "default_credential_prefix")]
    pub credential_prefix: String,
    #[serde(default)]
    pub request_strategy: IdStrategy,
    /// Tag for timestamp-composed request ids.
    #[serde(default = "default_request_prefix")]
    pub request_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuanceConfig {
    /// Only consulted under `IdStrategy::NaturalKey`.
    #[serde(default)]
    pub on_collision: CollisionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderIndexConfig {
    #[serde(default)]
    pub lookup: HolderLookup,
    /// Entries fetched per range-scan page.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path to the data directory (RocksDB backend).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_credential_prefix() -> String {
    "CERT".into()
}
fn default_request_prefix() -> String {
    "REQ".into()
}
fn default_scan_page_size() -> usize {
    256
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            credential_strategy: IdStrategy::default(),
            credential_prefix: default_credential_prefix(),
            request_strategy: IdStrategy::default(),
            request_prefix: default_request_prefix(),
        }
    }
}

impl Default for HolderIndexConfig {
    fn default() -> Self {
        Self {
            lookup: HolderLookup::default(),
            scan_page_size: default_scan_page_size(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RegistryConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: RegistryConfig = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings no registry can run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.holder_index.scan_page_size == 0 {
            anyhow::bail!("holder_index.scan_page_size must be greater than zero");
        }
        if self.identifiers.request_strategy == IdStrategy::NaturalKey {
            anyhow::bail!("identifiers.request_strategy cannot be natural_key");
        }
        Ok(())
    }
}
