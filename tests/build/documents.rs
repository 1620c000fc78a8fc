//! How documents flow into an index.

use ftrie::testing::{BuildEvent, RecordingObserver};
use ftrie::{Index, IndexBuilder, IndexConfig, IndexError, Posting};
use tempfile::TempDir;

use crate::common::{build, dir_entries};

fn docs(texts: &[(u32, &str)]) -> Vec<(u32, String)> {
    texts.iter().map(|(id, t)| (*id, t.to_string())).collect()
}

#[test]
fn test_repeated_ids_count_once_and_restart_positions() {
    let dir = TempDir::new().unwrap();
    let summary = build(
        dir.path(),
        IndexConfig::default(),
        &docs(&[(1, "title words"), (1, "body words here"), (4, "words")]),
    );
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.doc_count, 2);

    let index = Index::open(dir.path()).unwrap();
    assert_eq!(
        index.lookup("words").unwrap(),
        vec![Posting::new(1, 1), Posting::new(4, 0)]
    );
    assert_eq!(index.header().doc_count, 2);
}

#[test]
fn test_decreasing_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = Index::build(
        dir.path(),
        IndexConfig::default(),
        vec![(5u32, "five"), (3, "three")],
    );
    match result {
        Err(IndexError::DocumentOrder { previous, next }) => {
            assert_eq!((previous, next), (5, 3));
        }
        other => panic!("expected DocumentOrder, got {:?}", other),
    }
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn test_rebuild_replaces_previous_index() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), IndexConfig::default(), &docs(&[(1, "old words")]));
    build(dir.path(), IndexConfig::default(), &docs(&[(2, "new")]));

    let index = Index::open(dir.path()).unwrap();
    assert!(index.lookup("old").unwrap().is_empty());
    assert_eq!(index.lookup("new").unwrap(), vec![Posting::new(2, 0)]);
}

#[test]
fn test_tokenizer_options_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut config = IndexConfig::default();
    config.tokenizer.diacritics = true;
    config.tokenizer.max_token_len = 8;
    build(dir.path(), config, &docs(&[(1, "Café cafe extraordinarily")]));

    let index = Index::open(dir.path()).unwrap();
    assert!(index.tokenizer().options().diacritics);
    assert_eq!(index.tokenizer().max_token_len(), 8);
    assert_eq!(index.lookup("CAFÉ").unwrap(), vec![Posting::new(1, 0)]);
    assert_eq!(index.lookup("cafe").unwrap(), vec![Posting::new(1, 1)]);
    assert!(index.lookup("extraordinarily").unwrap().is_empty());
}

#[test]
fn test_observer_sees_flushes_and_merge() {
    let dir = TempDir::new().unwrap();
    let mut observer = RecordingObserver::default();
    let outcome = IndexBuilder::new(IndexConfig::default().with_memory_limit(1))
        .unwrap()
        .observer(&mut observer)
        .build(dir.path(), vec![(1, "alpha beta"), (2, "beta gamma"), (3, "delta")])
        .unwrap();
    let summary = outcome.summary().unwrap().clone();

    assert_eq!(summary.partials, 3);
    assert_eq!(observer.flushes(), 3);
    assert!(observer.events.contains(&BuildEvent::MergeStarted {
        partials: 3,
        tokens: 5
    }));
    assert_eq!(
        observer.events.last(),
        Some(&BuildEvent::Finished { tokens: 4 })
    );
    assert_eq!(
        observer.events.first(),
        Some(&BuildEvent::Documents(1))
    );
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let mut config = IndexConfig::default();
    config.tokenizer.max_token_len = 0;
    assert!(matches!(IndexBuilder::new(config), Err(IndexError::Config(_))));

    let config = IndexConfig::default().with_memory_limit(0);
    assert!(matches!(IndexBuilder::new(config), Err(IndexError::Config(_))));
}
