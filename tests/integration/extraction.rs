//! Dependency extraction through repository lookup and the config-built resolver chain.

use crate::integration::test_utils::write_archive;
use idlsync::config::{IdlsyncConfig, PinnedArtifact};
use idlsync::error::ExtractError;
use idlsync::extract::{ArchiveExtractor, LocalRepositoryResolver};
use idlsync::pipeline::Pipeline;
use idlsync::types::DependencyRef;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_extract_from_local_repository_layout() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    write_archive(
        &repo.join("com/acme/common-idl/1.2.0/common-idl-1.2.0.jar"),
        &[
            ("acme/common.thrift", "struct Common {}"),
            ("acme/Common.class", "binary"),
        ],
    );
    write_archive(
        &repo.join("org.example/events/3.0/events-3.0.zip"),
        &[("events.thrift", "struct Event {}")],
    );

    let resolver = LocalRepositoryResolver::new(vec![repo]);
    let target = temp_dir.path().join("external");
    let extracted = ArchiveExtractor::new("thrift")
        .extract(
            &resolver,
            &[
                DependencyRef::new("com.acme", "common-idl", "1.2.0"),
                DependencyRef::new("org.example", "events", "3.0"),
            ],
            &target,
        )
        .unwrap();

    assert_eq!(
        extracted,
        vec![target.join("acme/common.thrift"), target.join("events.thrift")]
    );
    assert!(!target.join("acme/Common.class").exists());
    assert_eq!(
        fs::read_to_string(target.join("events.thrift")).unwrap(),
        "struct Event {}"
    );
}

#[test]
fn test_one_missing_dependency_fails_the_pass() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    write_archive(
        &repo.join("com/acme/present/1.0/present-1.0.jar"),
        &[("present.thrift", "")],
    );

    let resolver = LocalRepositoryResolver::new(vec![repo.clone()]);
    let result = ArchiveExtractor::new("thrift").extract(
        &resolver,
        &[
            DependencyRef::new("com.acme", "present", "1.0"),
            DependencyRef::new("com.acme", "absent", "1.0"),
        ],
        &temp_dir.path().join("external"),
    );

    match result {
        Err(ExtractError::Unresolved {
            dependency,
            searched,
        }) => {
            assert_eq!(dependency.name, "absent");
            assert!(searched.contains(&repo.join("com/acme/absent/1.0/absent-1.0.jar")));
        }
        other => panic!("expected unresolved dependency, got {:?}", other),
    }
}

#[test]
fn test_corrupt_archive_is_an_archive_error() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    let archive = repo.join("com/acme/broken/1.0/broken-1.0.jar");
    fs::create_dir_all(archive.parent().unwrap()).unwrap();
    fs::write(&archive, "not a zip file").unwrap();

    let result = ArchiveExtractor::new("thrift").extract(
        &LocalRepositoryResolver::new(vec![repo]),
        &[DependencyRef::new("com.acme", "broken", "1.0")],
        &temp_dir.path().join("external"),
    );
    assert!(matches!(result, Err(ExtractError::Archive { .. })));
}

#[test]
fn test_pinned_archive_from_config_feeds_the_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path();
    write_archive(
        &workspace.join("vendor/common.jar"),
        &[("common.thrift", "struct Common {}")],
    );

    let mut config = IdlsyncConfig::default();
    config.project.dependencies = vec!["com.acme:common:1.0".to_string()];
    config.artifacts.pinned = vec![PinnedArtifact {
        dependency: "com.acme:common:1.0".to_string(),
        archive: PathBuf::from("vendor/common.jar"),
    }];

    let pipeline = Pipeline::from_config(&config, workspace).unwrap();
    let extracted = pipeline.extract_only().unwrap();
    assert_eq!(extracted.len(), 1);
    assert!(extracted[0].ends_with("target/thrift-external/common.thrift"));
    assert!(extracted[0].is_file());
}

#[test]
fn test_repository_from_config_resolves_relative_to_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path();
    write_archive(
        &workspace.join("libs/com/acme/events/2.0/events-2.0.jar"),
        &[("events.thrift", "")],
    );

    let mut config = IdlsyncConfig::default();
    config.project.dependencies = vec!["com.acme:events:2.0".to_string()];
    config.artifacts.repositories = vec![PathBuf::from("libs")];

    let pipeline = Pipeline::from_config(&config, workspace).unwrap();
    let extracted = pipeline.extract_only().unwrap();
    assert_eq!(extracted.len(), 1);
    assert!(extracted[0].ends_with("events.thrift"));
}

#[test]
fn test_dropped_dependency_files_are_pruned_on_next_pass() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    write_archive(
        &repo.join("com/acme/a/1.0/a-1.0.jar"),
        &[("a/one.thrift", "")],
    );
    write_archive(
        &repo.join("com/acme/b/1.0/b-1.0.jar"),
        &[("b/two.thrift", "")],
    );
    let resolver = LocalRepositoryResolver::new(vec![repo]);
    let target = temp_dir.path().join("external");
    let a = DependencyRef::new("com.acme", "a", "1.0");
    let b = DependencyRef::new("com.acme", "b", "1.0");

    let extractor = ArchiveExtractor::new("thrift");
    extractor
        .extract(&resolver, &[a.clone(), b], &target)
        .unwrap();
    assert!(target.join("b/two.thrift").exists());

    extractor.extract(&resolver, &[a], &target).unwrap();
    assert!(target.join("a/one.thrift").exists());
    assert!(!target.join("b/two.thrift").exists());
    assert!(!target.join("b").exists());
}
