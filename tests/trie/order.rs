//! Children stay sorted by first byte whatever order tokens arrive in.

use ftrie::trie::{InsertCase, RadixTrie};
use ftrie::PostingsList;
use proptest::prelude::*;

use crate::common::token_strategy;

fn tokens_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(token_strategy(), 1..60)
}

proptest! {
    #[test]
    fn prop_children_sorted_after_every_insert(tokens in tokens_strategy()) {
        let mut trie = RadixTrie::<PostingsList>::new();
        for (i, token) in tokens.iter().enumerate() {
            trie.insert_posting(token, i as u32, 0);
            prop_assert!(trie.check_invariants().is_ok());
        }
    }

    #[test]
    fn prop_insertion_order_does_not_change_contents(
        (tokens, shuffled) in tokens_strategy()
            .prop_flat_map(|t| (Just(t.clone()), Just(t).prop_shuffle()))
    ) {
        let mut a = RadixTrie::<PostingsList>::new();
        let mut b = RadixTrie::<PostingsList>::new();
        for token in &tokens {
            a.insert_posting(token, 0, 0);
        }
        for token in &shuffled {
            b.insert_posting(token, 0, 0);
        }
        let a_tokens: Vec<Vec<u8>> = a.iter().map(|(t, _)| t).collect();
        let b_tokens: Vec<Vec<u8>> = b.iter().map(|(t, _)| t).collect();
        prop_assert_eq!(&a_tokens, &b_tokens);
        prop_assert_eq!(a.node_count(), b.node_count());
    }

    #[test]
    fn prop_iteration_is_sorted_and_unique(tokens in tokens_strategy()) {
        let mut trie = RadixTrie::<PostingsList>::new();
        for token in &tokens {
            trie.insert_posting(token, 1, 1);
        }
        let listed: Vec<Vec<u8>> = trie.iter().map(|(t, _)| t).collect();
        let mut expected = tokens.clone();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(listed, expected);
        prop_assert_eq!(trie.len(), trie.iter().count());
    }
}

#[test]
fn test_every_insert_case_keeps_order() {
    let mut trie = RadixTrie::<PostingsList>::new();
    let steps: [(&str, InsertCase); 6] = [
        ("team", InsertCase::NewLeaf),
        ("test", InsertCase::SplitDiverge),
        ("te", InsertCase::Exact { appended: false }),
        ("zoo", InsertCase::NewSibling),
        ("te", InsertCase::Exact { appended: true }),
        ("tea", InsertCase::SplitPrefix),
    ];
    for (token, case) in steps {
        assert_eq!(trie.insert_posting(token.as_bytes(), 1, 0), case, "{token}");
        trie.check_invariants().unwrap();
    }
    let tokens: Vec<Vec<u8>> = trie.iter().map(|(t, _)| t).collect();
    assert_eq!(
        tokens,
        vec![
            b"te".to_vec(),
            b"tea".to_vec(),
            b"team".to_vec(),
            b"test".to_vec(),
            b"zoo".to_vec()
        ]
    );
}
