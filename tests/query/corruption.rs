//! Damaged index files surface as errors.

use std::fs;
use std::path::Path;

use ftrie::{Index, IndexConfig, IndexError, IndexReader, Pattern};
use tempfile::TempDir;

use crate::common::build;

fn small_index() -> TempDir {
    let dir = TempDir::new().unwrap();
    build(
        dir.path(),
        IndexConfig::default(),
        &[(1, "apple".to_string()), (2, "apple pie".to_string())],
    );
    dir
}

fn patch(dir: &Path, file: &str, edit: impl FnOnce(&mut Vec<u8>)) {
    let path = dir.join(file);
    let mut bytes = fs::read(&path).unwrap();
    edit(&mut bytes);
    fs::write(&path, bytes).unwrap();
}

fn assert_corrupt<T: std::fmt::Debug>(result: Result<T, IndexError>, file: &str) {
    match result {
        Err(IndexError::Corrupt { file: f, .. }) => assert_eq!(f, file),
        other => panic!("expected {file} to be reported corrupt, got {:?}", other),
    }
}

#[test]
fn test_bit_flip_caught_by_verify() {
    let dir = small_index();
    patch(dir.path(), "ftx.post", |b| b[0] ^= 0x01);

    let index = Index::open(dir.path()).unwrap();
    let err = index.verify().unwrap_err();
    assert!(err.is_corruption());
    assert_corrupt(index.verify(), "ftx.post");
}

#[test]
fn test_truncated_file_fails_open() {
    let dir = small_index();
    patch(dir.path(), "ftx.node", |b| {
        b.pop();
    });
    assert_corrupt(IndexReader::open(dir.path()), "ftx.node");
}

#[test]
fn test_damaged_header_fails_open() {
    let dir = small_index();
    patch(dir.path(), "ftx.meta", |b| b[0] = b'X');
    assert_corrupt(IndexReader::open(dir.path()), "ftx.meta");

    let dir = small_index();
    patch(dir.path(), "ftx.meta", |b| b[14] ^= 0xFF);
    assert_corrupt(IndexReader::open(dir.path()), "ftx.meta");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = small_index();
    fs::remove_file(dir.path().join("ftx.tok")).unwrap();
    assert!(matches!(
        IndexReader::open(dir.path()),
        Err(IndexError::Io { .. })
    ));
}

#[test]
fn test_dangling_child_fails_queries() {
    let dir = small_index();
    // The root record is `[0][child id: u32][first byte]...`; point its
    // only child far past the last node.
    patch(dir.path(), "ftx.node", |b| b[1..5].copy_from_slice(&u32::MAX.to_le_bytes()));

    let reader = IndexReader::open(dir.path()).unwrap();
    assert_corrupt(reader.lookup(b"apple"), "ftx.node");
    assert_corrupt(reader.wildcard(&Pattern::parse(b"a.*").unwrap()), "ftx.node");
    assert_corrupt(reader.fuzzy(b"apple", 1), "ftx.node");
    assert!(reader.tokens().any(|entry| entry.is_err()));
}
