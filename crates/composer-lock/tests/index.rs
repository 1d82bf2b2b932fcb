//! Integration tests for package lookups over the fixture lockfile.

use std::path::PathBuf;

use composer_lock::{LockError, LockfileReader, PackageIndex, PackageRecord, PackageSelector};

fn packages() -> PackageIndex {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/composer.lock");
    LockfileReader::new(path)
        .packages(PackageSelector::All)
        .unwrap()
}

#[test]
fn test_get_by_name() {
    let packages = packages();
    let package = packages.by_name("t4web/composer-lock-parser").unwrap();
    assert_eq!(package.name(), "t4web/composer-lock-parser");
}

#[test]
fn test_get_by_name_missing() {
    let err = packages().by_name("fr3nch13/dont-exist").unwrap_err();
    assert!(matches!(err, LockError::NotFound(_)));
    assert_eq!(err.to_string(), "Package fr3nch13/dont-exist not exists");
}

#[test]
fn test_get_by_namespace() {
    let packages = packages();
    let package = packages.by_namespace("ComposerLockParser").unwrap();
    assert_eq!(package.name(), "t4web/composer-lock-parser");
}

#[test]
fn test_get_by_namespace_missing() {
    let err = packages().by_namespace("ComposerLockParserNope").unwrap_err();
    assert_eq!(err.to_string(), "Package ComposerLockParserNope not exists");
}

#[test]
fn test_has_package_name() {
    let packages = packages();
    assert!(packages.has_name("t4web/composer-lock-parser"));
    assert!(!packages.has_name("fr3nch13/dont-exist"));
}

#[test]
fn test_has_package_namespace() {
    let packages = packages();
    assert!(packages.has_namespace("ComposerLockParser"));
    assert!(!packages.has_namespace("ComposerLockParserNope"));
}

#[test]
fn test_reset_index() {
    let mut packages = packages();
    assert!(packages.has_name("t4web/composer-lock-parser"));
    assert!(packages.has_namespace("ComposerLockParser"));

    packages.reset_index();
    assert_eq!(packages.len(), 33);
    assert!(packages.has_name("t4web/composer-lock-parser"));
    assert!(!packages.has_name("fr3nch13/dont-exist"));
    assert!(packages.has_namespace("ComposerLockParser"));
}

#[test]
fn test_append_after_lookup() {
    let mut packages = packages();
    assert!(!packages.has_name("acme/local"));

    packages.append(
        PackageRecord::builder("acme/local", "dev-main")
            .psr4("Acme\\Local\\", "src/")
            .build(),
    );
    assert_eq!(packages.len(), 34);
    assert_eq!(packages.by_name("acme/local").unwrap().version(), "dev-main");
    assert_eq!(packages.by_namespace("Acme\\Local").unwrap().name(), "acme/local");
}

#[test]
fn test_every_name_resolves_to_itself() {
    let packages = packages();
    for package in &packages {
        assert_eq!(packages.by_name(package.name()).unwrap().name(), package.name());
    }
}
