//! Integration test: ledger failures and corrupt values surface unchanged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use educhain_core::{CredentialFields, HolderLookup, RegistryConfig};
use educhain_ledger::{Ledger, LedgerError, MemoryLedger, Namespace, ScanPage};
use educhain_registry::{CredentialRef, Registry, RegistryError};

/// Memory ledger whose writes can be switched off.
struct FlakyLedger {
    inner: MemoryLedger,
    fail_writes: AtomicBool,
}

impl FlakyLedger {
    fn new() -> Self {
        Self {
            inner: MemoryLedger::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Backend("endorsement failed".into()));
        }
        Ok(())
    }
}

impl Ledger for FlakyLedger {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.inner.get(ns, key)
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.check()?;
        self.inner.put(ns, key, value)
    }

    fn compare_and_put(
        &self,
        ns: Namespace,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, LedgerError> {
        self.check()?;
        self.inner.compare_and_put(ns, key, expected, value)
    }

    fn range_scan(
        &self,
        ns: Namespace,
        after: Option<&str>,
        end: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, LedgerError> {
        self.inner.range_scan(ns, after, end, limit)
    }
}

fn diploma(holder_id: &str) -> CredentialFields {
    CredentialFields {
        holder_id: holder_id.into(),
        holder_name: "Rosa Huamán".into(),
        program: "Architecture".into(),
        issue_date: "2021-06-30".into(),
        degree: "BArch".into(),
        title_awarded: "Bachelor of Architecture".into(),
        institution: "Universidad Ricardo Palma".into(),
    }
}

#[test]
fn test_write_failures_propagate_and_leave_state_untouched() {
    let ledger = Arc::new(FlakyLedger::new());
    let registry = Registry::new(ledger.clone(), &RegistryConfig::default()).unwrap();
    let issued = registry.issue(diploma("1")).unwrap();

    ledger.fail_writes.store(true, Ordering::SeqCst);

    assert!(matches!(
        registry.issue(diploma("2")),
        Err(RegistryError::SubstrateFailure(LedgerError::Backend(_)))
    ));
    assert!(matches!(
        registry.revoke(&issued.id, "fraud"),
        Err(RegistryError::SubstrateFailure(_))
    ));
    assert!(matches!(
        registry.log_verification(&CredentialRef::Credential(issued.id.clone()), "Acme", "2024-01-01"),
        Err(RegistryError::SubstrateFailure(_))
    ));

    // Reads still work and the record is exactly as it was.
    assert_eq!(registry.verify(&issued.id).unwrap(), issued);
    assert!(ledger.inner.is_empty(Namespace::Verifications).unwrap());

    ledger.fail_writes.store(false, Ordering::SeqCst);
    assert!(registry.revoke(&issued.id, "fraud").is_ok());
}

#[test]
fn test_corrupt_value_reported_with_key() {
    let ledger = Arc::new(MemoryLedger::new());
    let mut config = RegistryConfig::default();
    config.holder_index.lookup = HolderLookup::Scan;
    let registry = Registry::new(ledger.clone(), &config).unwrap();

    ledger
        .put(
            Namespace::Credentials,
            "legacy-1",
            br#"{"nombreEstudiante":"Ana","dni":"1","estado":"activo"}"#,
        )
        .unwrap();

    match registry.get("legacy-1") {
        Err(RegistryError::Corrupt { key, .. }) => assert_eq!(key, "legacy-1"),
        other => panic!("expected Corrupt, got {:?}", other),
    }
    assert!(matches!(
        registry.find_by_holder("1"),
        Err(RegistryError::Corrupt { .. })
    ));
    assert!(matches!(
        registry.log_verification(&CredentialRef::Credential("legacy-1".into()), "Acme", "2024-01-01"),
        Err(RegistryError::Corrupt { .. })
    ));
    assert!(ledger.is_empty(Namespace::Verifications).unwrap());
}
