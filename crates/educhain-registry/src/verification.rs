use std::fmt;
use std::sync::Arc;

use educhain_core::{RefKind, VerificationOutcome, VerificationRequest};
use educhain_ledger::{Ledger, Namespace};

use crate::error::{RegistryError, Subject};
use crate::holder::HolderIndex;
use crate::ids::{IdGenerator, IdMaterial};
use crate::store::CredentialStore;

/// How a verifier names the credential it wants checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRef {
    /// A credential id (store key).
    Credential(String),
    /// A holder id; valid if any of the holder's credentials is active.
    Holder(String),
}

impl CredentialRef {
    pub fn kind(&self) -> RefKind {
        match self {
            Self::Credential(_) => RefKind::CredentialId,
            Self::Holder(_) => RefKind::HolderId,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Credential(v) | Self::Holder(v) => v.as_str(),
        }
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential(id) => write!(f, "credential:{}", id),
            Self::Holder(id) => write!(f, "holder:{}", id),
        }
    }
}

/// Append-only log of verification requests.
///
/// The outcome is decided from the credential state at request time and
/// stored with the request. Later revocations do not touch logged requests.
pub struct VerificationLog {
    ledger: Arc<dyn Ledger>,
    store: Arc<CredentialStore>,
    index: Arc<HolderIndex>,
    ids: Box<dyn IdGenerator>,
}

impl VerificationLog {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        store: Arc<CredentialStore>,
        index: Arc<HolderIndex>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            ledger,
            store,
            index,
            ids,
        }
    }

    /// Check the referenced credential(s) and record the outcome.
    ///
    /// Fails with `NotFound` and writes nothing when the reference resolves
    /// to no credential.
    pub fn log_verification(
        &self,
        reference: &CredentialRef,
        verifier_name: &str,
        request_date: &str,
    ) -> Result<VerificationRequest, RegistryError> {
        if reference.value().is_empty() {
            return Err(RegistryError::InvalidInput("credential reference must not be empty".into()));
        }
        if verifier_name.trim().is_empty() {
            return Err(RegistryError::InvalidInput("verifier name must not be empty".into()));
        }

        let outcome = self.resolve_outcome(reference)?;

        let content = [reference.value(), verifier_name, request_date];
        let request_id = self.ids.next_id(&IdMaterial {
            natural_key: None,
            content: &content,
        })?;

        let request = VerificationRequest {
            request_id,
            credential_ref: reference.value().to_string(),
            ref_kind: reference.kind(),
            verifier_name: verifier_name.to_string(),
            request_date: request_date.to_string(),
            outcome,
        };
        let bytes = request
            .to_json_bytes()
            .map_err(|e| RegistryError::corrupt(&request.request_id, e))?;

        if !self.ledger.compare_and_put(
            Namespace::Verifications,
            &request.request_id,
            None,
            &bytes,
        )? {
            return Err(RegistryError::AlreadyExists(request.request_id));
        }

        tracing::info!(
            request_id = %request.request_id,
            reference = %reference,
            verifier = %request.verifier_name,
            outcome = %request.outcome,
            "verification request logged"
        );

        Ok(request)
    }

    /// Read back a logged request exactly as it was recorded.
    pub fn get_request(&self, request_id: &str) -> Result<VerificationRequest, RegistryError> {
        let raw = self
            .ledger
            .get(Namespace::Verifications, request_id)?
            .ok_or_else(|| RegistryError::NotFound(Subject::Request(request_id.to_string())))?;
        let request = VerificationRequest::from_json_slice(&raw)
            .map_err(|e| RegistryError::corrupt(request_id, e))?;
        if request.request_id != request_id {
            return Err(RegistryError::corrupt(
                request_id,
                format!("stored request id {} does not match key", request.request_id),
            ));
        }
        Ok(request)
    }

    fn resolve_outcome(
        &self,
        reference: &CredentialRef,
    ) -> Result<VerificationOutcome, RegistryError> {
        match reference {
            CredentialRef::Credential(id) => match self.store.verify(id) {
                Ok(_) => Ok(VerificationOutcome::Valid),
                Err(RegistryError::Revoked(_)) => Ok(VerificationOutcome::Invalid),
                Err(e) => Err(e),
            },
            CredentialRef::Holder(holder_id) => {
                let records = self.index.find_by_holder(holder_id)?;
                if records.iter().any(|r| r.is_active()) {
                    Ok(VerificationOutcome::Valid)
                } else {
                    Ok(VerificationOutcome::Invalid)
                }
            }
        }
    }
}
