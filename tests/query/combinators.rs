//! Union, intersection, phrases and proximity.

use ftrie::postings::{collect_hits, collect_postings, Intersect, ListCursor, MultiUnion, Union};
use ftrie::{Hit, Index, IndexConfig, Posting, Span};
use proptest::prelude::*;
use tempfile::TempDir;

use crate::common::build;

fn list(pairs: &[(u32, u32)]) -> ListCursor {
    ListCursor::new(pairs.iter().map(|&p| p.into()).collect())
}

#[test]
fn test_union_collapses_shared_posting() {
    let union = Union::new(list(&[(1, 0), (1, 5), (2, 0)]), list(&[(1, 5), (3, 0)]));
    assert_eq!(
        collect_postings(union),
        vec![
            Posting::new(1, 0),
            Posting::new(1, 5),
            Posting::new(2, 0),
            Posting::new(3, 0)
        ]
    );
}

#[test]
fn test_intersect_pairs_adjacent_only() {
    let hits = collect_hits(Intersect::new(list(&[(1, 0)]), list(&[(1, 1), (1, 9)]), 1));
    assert_eq!(
        hits,
        vec![Hit {
            doc: 1,
            spans: vec![Span { start: 0, end: 1 }]
        }]
    );
}

fn postings_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..10, 0u32..20), 0..30).prop_map(|mut v| {
        v.sort_unstable();
        v.dedup();
        v
    })
}

proptest! {
    #[test]
    fn prop_union_is_sorted_set_union(a in postings_strategy(), b in postings_strategy()) {
        let mut expected: Vec<Posting> = a.iter().chain(&b).map(|&p| p.into()).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(collect_postings(Union::new(list(&a), list(&b))), expected.clone());
        let multi = MultiUnion::new(vec![list(&a), list(&b), list(&[])]);
        prop_assert_eq!(collect_postings(multi), expected);
    }

    #[test]
    fn prop_intersect_finds_every_pair(
        a in postings_strategy(),
        b in postings_strategy(),
        w in 0u32..4,
    ) {
        let mut expected: Vec<(u32, u32, u32)> = Vec::new();
        for &(da, oa) in &a {
            for &(db, ob) in &b {
                if da == db && ob == oa + w {
                    expected.push((da, oa, ob));
                }
            }
        }
        expected.sort_unstable();

        let hits = collect_hits(Intersect::new(list(&a), list(&b), w));
        let mut found: Vec<(u32, u32, u32)> = hits
            .iter()
            .flat_map(|h| h.spans.iter().map(move |s| (h.doc, s.start, s.end)))
            .collect();
        found.sort_unstable();
        prop_assert_eq!(found, expected);
        prop_assert!(hits.iter().all(|h| !h.spans.is_empty()));
    }
}

fn corpus_index() -> (TempDir, Index) {
    let dir = TempDir::new().unwrap();
    let docs: Vec<(u32, String)> = [
        (1, "the quick brown fox"),
        (2, "a quick fox and a brown dog"),
        (3, "quick brown quick brown fox"),
        (4, "the fox is quick"),
    ]
    .iter()
    .map(|(id, t)| (*id, t.to_string()))
    .collect();
    build(dir.path(), IndexConfig::default(), &docs);
    let index = Index::open(dir.path()).unwrap();
    (dir, index)
}

#[test]
fn test_phrase_spans_every_occurrence() {
    let (_dir, index) = corpus_index();
    let hits = index.phrase("quick brown").unwrap();
    let docs: Vec<u32> = hits.iter().map(|h| h.doc).collect();
    assert_eq!(docs, vec![1, 3]);
    assert_eq!(
        hits[1].spans,
        vec![Span { start: 0, end: 1 }, Span { start: 2, end: 3 }]
    );

    let three = index.phrase("quick brown fox").unwrap();
    assert_eq!(three.len(), 2);
    assert_eq!(three[1].spans, vec![Span { start: 2, end: 4 }]);
}

#[test]
fn test_phrase_keeps_gaps_of_dropped_tokens() {
    let dir = TempDir::new().unwrap();
    let mut config = IndexConfig::default();
    config.tokenizer.max_token_len = 5;
    let docs = vec![(1, "red enormous dog".to_string()), (2, "red dog".to_string())];
    build(dir.path(), config, &docs);
    let index = Index::open(dir.path()).unwrap();

    let hits = index.phrase("red gigantic dog").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc, 1);
    assert_eq!(index.phrase("red dog").unwrap()[0].doc, 2);
}

#[test]
fn test_near_uses_exact_distance() {
    let (_dir, index) = corpus_index();
    let hits = index.near("quick", "fox", 2).unwrap();
    let docs: Vec<u32> = hits.iter().map(|h| h.doc).collect();
    assert_eq!(docs, vec![1, 3]);
    assert!(index.near("quick", "fox", 1).unwrap().iter().any(|h| h.doc == 2));
    assert!(index.near("nothing", "fox", 1).unwrap().is_empty());
}
