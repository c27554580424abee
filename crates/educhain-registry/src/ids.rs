//! Identifier generation policies for credential and request keys.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use educhain_core::IdStrategy;

use crate::error::RegistryError;

/// Inputs a generator may draw on when minting a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdMaterial<'a> {
    /// Externally meaningful key (the holder id for credentials).
    pub natural_key: Option<&'a str>,
    /// Descriptive values the key may be derived from.
    pub content: &'a [&'a str],
}

/// Mints unique keys for new records.
pub trait IdGenerator: Send + Sync {
    /// The policy this generator implements.
    fn strategy(&self) -> IdStrategy;

    /// Produce a key for a new record.
    fn next_id(&self, material: &IdMaterial<'_>) -> Result<String, RegistryError>;
}

/// Build the generator for a configured strategy. `prefix` is only used by
/// timestamp-composed keys.
pub fn generator_for(strategy: IdStrategy, prefix: &str) -> Box<dyn IdGenerator> {
    match strategy {
        IdStrategy::NaturalKey => Box::new(NaturalKeyIds),
        IdStrategy::Timestamp => Box::new(TimestampIds::new(prefix)),
        IdStrategy::ContentHash => Box::new(ContentHashIds),
        IdStrategy::Random => Box::new(RandomIds),
    }
}

/// Uses the natural key as-is. Only one record per natural key can exist.
pub struct NaturalKeyIds;

impl IdGenerator for NaturalKeyIds {
    fn strategy(&self) -> IdStrategy {
        IdStrategy::NaturalKey
    }

    fn next_id(&self, material: &IdMaterial<'_>) -> Result<String, RegistryError> {
        match material.natural_key {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(RegistryError::InvalidInput(
                "natural key strategy requires a non-empty natural key".into(),
            )),
        }
    }
}

/// `<prefix>-<unix micros>`.
///
/// Two calls within the same microsecond produce the same key. Callers
/// write with put-if-absent so such a collision is reported as
/// `AlreadyExists` instead of overwriting the earlier record.
pub struct TimestampIds {
    prefix: String,
    clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl TimestampIds {
    pub fn new(prefix: &str) -> Self {
        Self::with_clock(prefix, Utc::now)
    }

    pub fn with_clock(
        prefix: &str,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            clock: Box::new(clock),
        }
    }
}

impl IdGenerator for TimestampIds {
    fn strategy(&self) -> IdStrategy {
        IdStrategy::Timestamp
    }

    fn next_id(&self, _material: &IdMaterial<'_>) -> Result<String, RegistryError> {
        let micros = (self.clock)().timestamp_micros();
        Ok(format!("{}-{}", self.prefix, micros))
    }
}

/// Hex BLAKE3-256 over the length-delimited content, the current time, and
/// a 128-bit random nonce.
pub struct ContentHashIds;

impl IdGenerator for ContentHashIds {
    fn strategy(&self) -> IdStrategy {
        IdStrategy::ContentHash
    }

    fn next_id(&self, material: &IdMaterial<'_>) -> Result<String, RegistryError> {
        let mut hasher = blake3::Hasher::new();
        for part in material.content {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        hasher.update(&nanos.to_le_bytes());
        let nonce: [u8; 16] = rand::random();
        hasher.update(&nonce);
        Ok(hex::encode(hasher.finalize().as_bytes()))
    }
}

/// Random UUID v4.
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn strategy(&self) -> IdStrategy {
        IdStrategy::Random
    }

    fn next_id(&self, _material: &IdMaterial<'_>) -> Result<String, RegistryError> {
        Ok(Uuid::new_v4().to_string())
    }
}
