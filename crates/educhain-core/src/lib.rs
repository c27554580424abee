//! EduChain Core — Credential and verification record types, the credential
//! status state machine, errors, and registry configuration.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod types;

pub use config::{
    CollisionPolicy, HolderIndexConfig, HolderLookup, IdStrategy, IdentifierConfig,
    IssuanceConfig, LoggingConfig, RegistryConfig, StorageBackend, StorageConfig,
};
pub use credential_state::{CredentialEvent, CredentialStateMachine, CredentialStatus};
pub use error::CoreError;
pub use types::{
    CredentialFields, CredentialRecord, RefKind, VerificationOutcome, VerificationRequest,
};
