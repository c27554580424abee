//! Integration test: holder lookup across strategies and backends.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use educhain_core::{
    CredentialFields, HolderLookup, IdStrategy, RegistryConfig, StorageBackend,
};
use educhain_ledger::{Ledger, MemoryLedger};
use educhain_registry::{Registry, RegistryError, Subject};

fn diploma(holder_id: &str, program: &str) -> CredentialFields {
    CredentialFields {
        holder_id: holder_id.into(),
        holder_name: "Jorge Paredes".into(),
        program: program.into(),
        issue_date: "2022-12-20".into(),
        degree: "MSc".into(),
        title_awarded: format!("Master of Science in {}", program),
        institution: "Pontificia Universidad".into(),
    }
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("educhain-it-{}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Issue `n` credentials for `holder` plus noise for other holders, and
/// check the lookup returns exactly the holder's set.
fn check_completeness(registry: &Registry, holder: &str, n: usize) {
    let mut expected = HashSet::new();
    for i in 0..n {
        let record = registry.issue(diploma(holder, &format!("Program {}", i))).unwrap();
        expected.insert(record.id);
        registry
            .issue(diploma(&format!("other-{}", i), "Noise"))
            .unwrap();
    }

    let found: Vec<_> = registry.find_by_holder(holder).unwrap();
    assert_eq!(found.len(), n);
    let ids: HashSet<String> = found.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, expected);

    match registry.find_by_holder("no-such-holder") {
        Err(RegistryError::NotFound(Subject::Holder(h))) => assert_eq!(h, "no-such-holder"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_completeness_scan_small_pages() {
    let mut config = RegistryConfig::default();
    config.holder_index.lookup = HolderLookup::Scan;
    config.holder_index.scan_page_size = 3;
    let registry = Registry::new(Arc::new(MemoryLedger::new()), &config).unwrap();
    check_completeness(&registry, "40506070", 7);
}

#[test]
fn test_completeness_indexed() {
    let mut config = RegistryConfig::default();
    config.holder_index.lookup = HolderLookup::Indexed;
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::with_field_index());
    let registry = Registry::new(ledger, &config).unwrap();
    check_completeness(&registry, "40506070", 5);
}

#[test]
fn test_completeness_content_hash_auto() {
    let mut config = RegistryConfig::default();
    config.identifiers.credential_strategy = IdStrategy::ContentHash;
    let registry = Registry::new(Arc::new(MemoryLedger::new()), &config).unwrap();
    check_completeness(&registry, "40506070", 4);
}

#[test]
fn test_completeness_rocksdb() {
    let dir = temp_dir();
    let mut config = RegistryConfig::default();
    config.storage.backend = StorageBackend::Rocksdb;
    config.storage.data_dir = dir.clone();
    config.holder_index.scan_page_size = 2;

    {
        let registry = Registry::open(&config).unwrap();
        check_completeness(&registry, "40506070", 5);
    }

    // Records survive reopening the store.
    let registry = Registry::open(&config).unwrap();
    assert_eq!(registry.find_by_holder("40506070").unwrap().len(), 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_natural_key_holds_one_record_per_holder() {
    let mut config = RegistryConfig::default();
    config.identifiers.credential_strategy = IdStrategy::NaturalKey;
    let registry = Registry::new(Arc::new(MemoryLedger::new()), &config).unwrap();

    registry.issue(diploma("40506070", "Physics")).unwrap();
    assert!(matches!(
        registry.issue(diploma("40506070", "Chemistry")),
        Err(RegistryError::AlreadyExists(_))
    ));
    let found = registry.find_by_holder("40506070").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].program, "Physics");
}

#[test]
fn test_natural_key_overwrite_policy() {
    let mut config = RegistryConfig::default();
    config.identifiers.credential_strategy = IdStrategy::NaturalKey;
    config.issuance.on_collision = educhain_core::CollisionPolicy::Overwrite;
    let registry = Registry::new(Arc::new(MemoryLedger::new()), &config).unwrap();

    registry.issue(diploma("40506070", "Physics")).unwrap();
    registry.issue(diploma("40506070", "Chemistry")).unwrap();
    let found = registry.find_by_holder("40506070").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].program, "Chemistry");
}
