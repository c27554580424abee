use std::sync::Arc;

use educhain_core::{CollisionPolicy, CoreError, CredentialFields, CredentialRecord, IdStrategy};
use educhain_ledger::{Ledger, LedgerError, Namespace};

use crate::error::{RegistryError, Subject};
use crate::ids::{IdGenerator, IdMaterial};

/// Read-modify-write rounds `revoke` runs before giving up on a key that
/// keeps changing underneath it.
const MAX_REVOKE_ATTEMPTS: usize = 3;

/// Parse a stored credential and check it sits under its own id.
pub(crate) fn decode_record(key: &str, raw: &[u8]) -> Result<CredentialRecord, RegistryError> {
    let record = CredentialRecord::from_json_slice(raw).map_err(|e| {
        tracing::warn!(key = %key, error = %e, "corrupt credential record");
        RegistryError::corrupt(key, e)
    })?;
    if record.id != key {
        tracing::warn!(key = %key, stored_id = %record.id, "credential stored under foreign key");
        return Err(RegistryError::corrupt(
            key,
            format!("stored id {} does not match key", record.id),
        ));
    }
    Ok(record)
}

fn encode_record(record: &CredentialRecord) -> Result<Vec<u8>, RegistryError> {
    record
        .to_json_bytes()
        .map_err(|e| RegistryError::corrupt(&record.id, e))
}

/// Owns credential records and their single `active → revoked` transition.
pub struct CredentialStore {
    ledger: Arc<dyn Ledger>,
    ids: Box<dyn IdGenerator>,
    on_collision: CollisionPolicy,
}

impl CredentialStore {
    /// Create a store writing to `ledger` with the given key policy.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        ids: Box<dyn IdGenerator>,
        on_collision: CollisionPolicy,
    ) -> Self {
        Self {
            ledger,
            ids,
            on_collision,
        }
    }

    /// Key strategy in use.
    pub fn strategy(&self) -> IdStrategy {
        self.ids.strategy()
    }

    /// Issue a new, active credential.
    ///
    /// Keys are written with put-if-absent, so a collision fails with
    /// `AlreadyExists`. The one exception is natural-key mode configured
    /// with `CollisionPolicy::Overwrite`, which replaces the holder's record.
    pub fn issue(&self, fields: CredentialFields) -> Result<CredentialRecord, RegistryError> {
        fields
            .validate()
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;

        let content = fields.values();
        let id = self.ids.next_id(&IdMaterial {
            natural_key: Some(fields.holder_id.as_str()),
            content: &content,
        })?;

        let record = CredentialRecord::issue(id, fields);
        let bytes = encode_record(&record)?;

        let overwrite = self.strategy() == IdStrategy::NaturalKey
            && self.on_collision == CollisionPolicy::Overwrite;
        if overwrite {
            if self.ledger.get(Namespace::Credentials, &record.id)?.is_some() {
                tracing::warn!(
                    credential_id = %record.id,
                    "overwriting existing credential under natural key"
                );
            }
            self.ledger.put(Namespace::Credentials, &record.id, &bytes)?;
        } else if !self
            .ledger
            .compare_and_put(Namespace::Credentials, &record.id, None, &bytes)?
        {
            return Err(RegistryError::AlreadyExists(record.id));
        }

        tracing::info!(
            credential_id = %record.id,
            holder_id = %record.holder_id,
            strategy = %self.strategy(),
            "credential issued"
        );

        Ok(record)
    }

    /// Read a credential by id.
    pub fn get(&self, id: &str) -> Result<CredentialRecord, RegistryError> {
        let raw = self
            .ledger
            .get(Namespace::Credentials, id)?
            .ok_or_else(|| RegistryError::NotFound(Subject::Credential(id.to_string())))?;
        tracing::debug!(credential_id = %id, "credential read");
        decode_record(id, &raw)
    }

    /// Read a credential and assert it is still active.
    pub fn verify(&self, id: &str) -> Result<CredentialRecord, RegistryError> {
        let record = self.get(id)?;
        if !record.is_active() {
            return Err(RegistryError::Revoked(record.id));
        }
        Ok(record)
    }

    /// Revoke an active credential.
    ///
    /// The write is conditional on the value that was read, so of two
    /// concurrent revocations exactly one succeeds; the other re-reads the
    /// record and fails with `AlreadyRevoked`.
    pub fn revoke(&self, id: &str, reason: &str) -> Result<CredentialRecord, RegistryError> {
        if reason.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "revocation reason must not be empty".into(),
            ));
        }

        for attempt in 1..=MAX_REVOKE_ATTEMPTS {
            let raw = self
                .ledger
                .get(Namespace::Credentials, id)?
                .ok_or_else(|| RegistryError::NotFound(Subject::Credential(id.to_string())))?;
            let current = decode_record(id, &raw)?;

            let revoked = current.revoked(reason).map_err(|e| match e {
                CoreError::InvalidStateTransition { .. } => {
                    RegistryError::AlreadyRevoked(id.to_string())
                }
                other => RegistryError::InvalidInput(other.to_string()),
            })?;
            let bytes = encode_record(&revoked)?;

            if self
                .ledger
                .compare_and_put(Namespace::Credentials, id, Some(raw.as_slice()), &bytes)?
            {
                tracing::info!(credential_id = %id, reason = %reason, "credential revoked");
                return Ok(revoked);
            }

            tracing::debug!(credential_id = %id, attempt, "revocation raced a concurrent write");
        }

        Err(LedgerError::Conflict(id.to_string()).into())
    }
}
