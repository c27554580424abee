use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an issued credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    /// Issued and valid. Every record starts here.
    Active,
    /// Permanently revoked. Final state.
    Revoked,
}

impl CredentialStatus {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Stored string form (`"active"` / `"revoked"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that trigger credential status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// The issuing institution permanently revokes the credential.
    Revoke,
}

/// Enforces the credential lifecycle.
///
/// Valid transitions:
/// - Active → Revoked (Revoke)
///
/// There is no way back out of `Revoked`.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a status transition based on an event.
    /// Returns the new status on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialStatus,
        event: CredentialEvent,
    ) -> Result<CredentialStatus, CoreError> {
        let next = match (current, event) {
            (CredentialStatus::Active, CredentialEvent::Revoke) => CredentialStatus::Revoked,
            (CredentialStatus::Revoked, CredentialEvent::Revoke) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: CredentialStatus::Revoked,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %next,
            event = ?event,
            "credential status transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialStatus, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
