//! EduChain Ledger — The key-value contract the registry runs on, plus an
//! in-memory substrate and a RocksDB-backed local substrate.

pub mod error;
pub mod memory;
pub mod rocks;
pub mod traits;

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use rocks::RocksLedger;
pub use traits::{Entry, Ledger, Namespace, ScanPage};
