//! EduChain Registry — Issues, verifies, and revokes academic credential
//! records on a ledger substrate, and keeps an immutable log of
//! third-party verification requests.

pub mod error;
pub mod holder;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod store;
pub mod verification;

pub use error::{RegistryError, Subject};
pub use holder::HolderIndex;
pub use ids::{generator_for, IdGenerator, IdMaterial};
pub use registry::Registry;
pub use store::CredentialStore;
pub use verification::{CredentialRef, VerificationLog};
