//! Cancelled and failed builds delete everything they wrote.

use std::fs;
use std::sync::atomic::AtomicBool;

use ftrie::testing::{CancelAt, CancelPoint};
use ftrie::{BuildOutcome, IndexBuilder, IndexConfig, IndexError, IndexReader};
use tempfile::TempDir;

use crate::common::dir_entries;

fn docs() -> Vec<(u32, String)> {
    (0..20u32)
        .map(|i| (i, format!("document number {} has words w{}", i, i % 5)))
        .collect()
}

#[test]
fn test_cancel_between_documents_removes_partials() {
    let dir = TempDir::new().unwrap();
    let flag = AtomicBool::new(false);
    let outcome = IndexBuilder::new(IndexConfig::default().with_memory_limit(1))
        .unwrap()
        .cancel_flag(&flag)
        .observer(CancelAt::new(&flag, CancelPoint::Documents(5)))
        .build(dir.path(), docs())
        .unwrap();

    assert_eq!(outcome, BuildOutcome::Cancelled);
    assert!(dir_entries(dir.path()).is_empty(), "{:?}", dir_entries(dir.path()));
}

#[test]
fn test_cancel_without_memory_limit_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let flag = AtomicBool::new(false);
    let outcome = IndexBuilder::new(IndexConfig::default())
        .unwrap()
        .cancel_flag(&flag)
        .observer(CancelAt::new(&flag, CancelPoint::Documents(20)))
        .build(dir.path(), docs())
        .unwrap();

    // The flag rose on the last document; the build still must not finish.
    assert!(outcome.is_cancelled());
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn test_cancel_during_merge_removes_everything() {
    let dir = TempDir::new().unwrap();
    let flag = AtomicBool::new(false);
    let outcome = IndexBuilder::new(IndexConfig::default().with_memory_limit(1))
        .unwrap()
        .cancel_flag(&flag)
        .observer(CancelAt::new(&flag, CancelPoint::Merge))
        .build(dir.path(), docs())
        .unwrap();

    assert!(outcome.is_cancelled());
    assert!(dir_entries(dir.path()).is_empty(), "{:?}", dir_entries(dir.path()));
    assert!(IndexReader::open(dir.path()).is_err());
}

#[test]
fn test_io_failure_mid_build_removes_partials() {
    let dir = TempDir::new().unwrap();
    // A plain file where the second partial directory should go.
    fs::write(dir.path().join("partial-1"), b"in the way").unwrap();

    let result = IndexBuilder::new(IndexConfig::default().with_memory_limit(1))
        .unwrap()
        .build(dir.path(), docs());

    match result {
        Err(IndexError::Io { path, .. }) => assert!(path.ends_with("partial-1")),
        other => panic!("expected an I/O error, got {:?}", other),
    }
    assert_eq!(dir_entries(dir.path()), vec!["partial-1".to_string()]);
}

#[test]
fn test_output_path_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, b"").unwrap();

    let result = IndexBuilder::new(IndexConfig::default()).unwrap().build(&file, docs());
    assert!(matches!(result, Err(IndexError::Io { .. })));
    assert_eq!(fs::read(&file).unwrap(), b"");
}
