//! The registry facade: wires identifier policies, the record store, the
//! holder index and the verification log from configuration.

use std::sync::Arc;

use educhain_core::{
    CredentialFields, CredentialRecord, IdStrategy, RegistryConfig, StorageBackend,
    VerificationRequest,
};
use educhain_ledger::{Ledger, MemoryLedger, RocksLedger};

use crate::error::RegistryError;
use crate::holder::HolderIndex;
use crate::ids::generator_for;
use crate::store::CredentialStore;
use crate::verification::{CredentialRef, VerificationLog};

/// Credential registry over a ledger substrate.
///
/// Holds no state of its own beyond configuration: every call reads from and
/// writes to the ledger before returning.
pub struct Registry {
    store: Arc<CredentialStore>,
    index: Arc<HolderIndex>,
    log: VerificationLog,
}

impl Registry {
    /// Build a registry on an existing ledger.
    pub fn new(ledger: Arc<dyn Ledger>, config: &RegistryConfig) -> Result<Self, RegistryError> {
        config
            .validate()
            .map_err(|e| RegistryError::Config(e.to_string()))?;

        let ids = &config.identifiers;
        let store = Arc::new(CredentialStore::new(
            Arc::clone(&ledger),
            generator_for(ids.credential_strategy, &ids.credential_prefix),
            config.issuance.on_collision,
        ));
        let index = Arc::new(HolderIndex::new(
            Arc::clone(&ledger),
            config.holder_index.lookup,
            store.strategy() == IdStrategy::NaturalKey,
            config.holder_index.scan_page_size,
        ));
        let log = VerificationLog::new(
            ledger,
            Arc::clone(&store),
            Arc::clone(&index),
            generator_for(ids.request_strategy, &ids.request_prefix),
        );

        tracing::debug!(
            credential_ids = %ids.credential_strategy,
            request_ids = %ids.request_strategy,
            lookup = ?config.holder_index.lookup,
            "registry ready"
        );

        Ok(Self { store, index, log })
    }

    /// Build a registry on the backend named in `config.storage`.
    pub fn open(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let ledger: Arc<dyn Ledger> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryLedger::with_field_index()),
            StorageBackend::Rocksdb => Arc::new(RocksLedger::open(&config.storage.data_dir)?),
        };
        Self::new(ledger, config)
    }

    pub fn issue(&self, fields: CredentialFields) -> Result<CredentialRecord, RegistryError> {
        self.store.issue(fields)
    }

    pub fn get(&self, id: &str) -> Result<CredentialRecord, RegistryError> {
        self.store.get(id)
    }

    pub fn verify(&self, id: &str) -> Result<CredentialRecord, RegistryError> {
        self.store.verify(id)
    }

    pub fn revoke(&self, id: &str, reason: &str) -> Result<CredentialRecord, RegistryError> {
        self.store.revoke(id, reason)
    }

    pub fn find_by_holder(&self, holder_id: &str) -> Result<Vec<CredentialRecord>, RegistryError> {
        self.index.find_by_holder(holder_id)
    }

    pub fn log_verification(
        &self,
        reference: &CredentialRef,
        verifier_name: &str,
        request_date: &str,
    ) -> Result<VerificationRequest, RegistryError> {
        self.log
            .log_verification(reference, verifier_name, request_date)
    }

    pub fn get_request(&self, request_id: &str) -> Result<VerificationRequest, RegistryError> {
        self.log.get_request(request_id)
    }
}
