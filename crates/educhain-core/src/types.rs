use serde::{Deserialize, Serialize};
use std::fmt;

use crate::credential_state::{CredentialEvent, CredentialStateMachine, CredentialStatus};
use crate::error::CoreError;

/// Caller-supplied descriptive attributes of a credential to be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFields {
    /// External identifier of the holder (e.g. national ID).
    pub holder_id: String,
    /// Full name of the holder.
    pub holder_name: String,
    /// Academic program (e.g. "Computer Science").
    pub program: String,
    /// Issue date as provided by the institution.
    pub issue_date: String,
    /// Degree level (e.g. "BSc").
    pub degree: String,
    /// Title awarded on the diploma.
    pub title_awarded: String,
    /// Issuing institution.
    pub institution: String,
}

impl CredentialFields {
    /// Reject any blank required value.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in self.named_values() {
            if value.trim().is_empty() {
                return Err(CoreError::MissingField(name.into()));
            }
        }
        Ok(())
    }

    /// Descriptive values in a fixed order, used for content-derived ids.
    pub fn values(&self) -> [&str; 7] {
        self.named_values().map(|(_, v)| v)
    }

    fn named_values(&self) -> [(&'static str, &str); 7] {
        [
            ("holderId", self.holder_id.as_str()),
            ("holderName", self.holder_name.as_str()),
            ("program", self.program.as_str()),
            ("issueDate", self.issue_date.as_str()),
            ("degree", self.degree.as_str()),
            ("titleAwarded", self.title_awarded.as_str()),
            ("institution", self.institution.as_str()),
        ]
    }
}

/// The canonical issued-credential entity, stored at key = `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,
    pub holder_id: String,
    pub holder_name: String,
    pub program: String,
    pub issue_date: String,
    pub degree: String,
    pub title_awarded: String,
    pub institution: String,
    pub status: CredentialStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

impl CredentialRecord {
    /// Build a fresh, active record under the given id.
    pub fn issue(id: String, fields: CredentialFields) -> Self {
        Self {
            id,
            holder_id: fields.holder_id,
            holder_name: fields.holder_name,
            program: fields.program,
            issue_date: fields.issue_date,
            degree: fields.degree,
            title_awarded: fields.title_awarded,
            institution: fields.institution,
            status: CredentialStatus::Active,
            revocation_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    /// Return the revoked form of this record. Every other field is untouched.
    pub fn revoked(&self, reason: &str) -> Result<Self, CoreError> {
        if reason.trim().is_empty() {
            return Err(CoreError::MissingField("revocationReason".into()));
        }
        let status = CredentialStateMachine::transition(self.status, CredentialEvent::Revoke)?;
        Ok(Self {
            status,
            revocation_reason: Some(reason.to_string()),
            ..self.clone()
        })
    }

    /// Check the status / reason pairing.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::MissingField("id".into()));
        }
        match (self.status, &self.revocation_reason) {
            (CredentialStatus::Active, Some(_)) => Err(CoreError::ValidationError(
                "active credential carries a revocation reason".into(),
            )),
            (CredentialStatus::Revoked, None) => Err(CoreError::ValidationError(
                "revoked credential has no revocation reason".into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate a stored record. Unknown fields are ignored.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let record: Self = serde_json::from_slice(bytes)?;
        record.validate()?;
        Ok(record)
    }
}

/// Result of a point-in-time validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    Valid,
    Invalid,
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Which identifier a verifier used to name the subject credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefKind {
    CredentialId,
    HolderId,
}

/// Immutable audit record of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub request_id: String,
    pub credential_ref: String,
    pub ref_kind: RefKind,
    pub verifier_name: String,
    pub request_date: String,
    pub outcome: VerificationOutcome,
}

impl VerificationRequest {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let request: Self = serde_json::from_slice(bytes)?;
        if request.request_id.is_empty() {
            return Err(CoreError::MissingField("requestId".into()));
        }
        Ok(request)
    }
}
