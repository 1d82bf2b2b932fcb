//! Integration tests for package records read from the fixture lockfile.

use std::path::PathBuf;

use chrono::{Datelike, Timelike};
use composer_lock::{AutoloadPaths, AutoloadRule, LockfileReader, PackageRecord, PackageSelector};

fn first_package() -> PackageRecord {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/composer.lock");
    let packages = LockfileReader::new(path)
        .packages(PackageSelector::All)
        .unwrap();
    packages.into_iter().next().unwrap()
}

#[test]
fn test_identity() {
    let package = first_package();
    assert_eq!(package.name(), "t4web/composer-lock-parser");
    assert_eq!(package.version(), "dev-updates");
    assert_eq!(package.homepage(), "https://github.com/t4web/ComposerLockParser");
    assert_eq!(package.kind(), "library");
}

#[test]
fn test_source_and_dist() {
    let package = first_package();
    let reference = "98844fe3c4b8f0c21f396aff88cca90b508f6f45";

    let source = package.source();
    assert_eq!(source.kind, "git");
    assert_eq!(source.url, "https://github.com/fr3nch13/ComposerLockParser.git");
    assert_eq!(source.reference, reference);

    let dist = package.dist();
    assert_eq!(dist.kind, "zip");
    assert_eq!(
        dist.url,
        format!("https://api.github.com/repos/fr3nch13/ComposerLockParser/zipball/{reference}")
    );
    assert_eq!(dist.reference, reference);
    assert_eq!(dist.shasum, "");
}

#[test]
fn test_requirements() {
    let package = first_package();
    assert_eq!(package.require().len(), 1);
    assert_eq!(package.require()["php"], ">=5.4.0");
    assert_eq!(package.require_dev().len(), 1);
    assert_eq!(package.require_dev()["codeception/codeception"], "<2");
    assert!(package.suggest().is_empty());
    assert!(package.extra().is_empty());
}

#[test]
fn test_autoload_and_namespace() {
    let package = first_package();

    let autoload = package.autoload();
    assert_eq!(autoload.len(), 1);
    match &autoload["psr-0"] {
        AutoloadRule::Namespaces(prefixes) => {
            assert_eq!(
                prefixes.get("ComposerLockParser\\"),
                Some(&AutoloadPaths::One("src/".to_string()))
            );
        }
        other => panic!("unexpected psr-0 rule: {other:?}"),
    }

    assert_eq!(package.namespace(), "ComposerLockParser");
    assert_eq!(package.notification_url(), "");
}

#[test]
fn test_people_and_text() {
    let package = first_package();

    assert_eq!(package.license(), ["BSD-3-Clause"]);
    assert_eq!(package.authors().len(), 1);
    let author = &package.authors()[0];
    assert_eq!(author.name, "Max Gulturyan");
    assert_eq!(author.email, "gulturyan@gmail.com");
    assert_eq!(author.homepage, "http://about.me/maxgu");
    assert_eq!(author.role, None);

    assert_eq!(package.description(), "OOP reader of composer.lock file.");
    assert_eq!(package.keywords(), ["composer.lock reader"]);
}

#[test]
fn test_release_time() {
    let time = *first_package().release_time().unwrap();
    assert_eq!((time.year(), time.month(), time.day()), (2020, 6, 4));
    assert_eq!((time.hour(), time.minute(), time.second()), (17, 21, 44));
    assert_eq!(time.offset().local_minus_utc(), 0);
}

#[test]
fn test_dev_package_extras() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/composer.lock");
    let packages = LockfileReader::new(path)
        .packages(PackageSelector::Development)
        .unwrap();

    let phpunit = packages.by_name("phpunit/phpunit").unwrap();
    assert_eq!(phpunit.bin(), ["phpunit"]);
    assert_eq!(phpunit.suggest().len(), 2);
    assert!(phpunit.extra().contains_key("branch-alias"));
    assert_eq!(phpunit.notification_url(), "https://packagist.org/downloads/");
    assert_eq!(phpunit.namespace(), "");

    let polyfill = packages.by_name("symfony/polyfill-ctype").unwrap();
    assert_eq!(polyfill.namespace(), "Symfony\\Polyfill\\Ctype");
    assert!(matches!(polyfill.autoload()["files"], AutoloadRule::Paths(_)));
    assert_eq!(polyfill.authors()[0].role.as_deref(), Some("lead"));
}

#[test]
fn test_record_serializes_with_lockfile_keys() {
    let value = serde_json::to_value(first_package()).unwrap();
    assert_eq!(value["name"], "t4web/composer-lock-parser");
    assert_eq!(value["require-dev"]["codeception/codeception"], "<2");
    assert_eq!(value["source"]["type"], "git");
    assert!(value.get("notification-url").is_some());
}
