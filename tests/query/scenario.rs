//! Three tokens, every query class.

use ftrie::{IndexReader, Pattern, Posting};
use tempfile::TempDir;

use crate::common::{reader_from_triples, Triple};

fn cat_car_cart() -> (TempDir, IndexReader) {
    let triples: Vec<Triple> = vec![
        (b"cat".to_vec(), 1, 0),
        (b"car".to_vec(), 2, 0),
        (b"cart".to_vec(), 3, 0),
    ];
    reader_from_triples(&triples)
}

fn wildcard(reader: &IndexReader, pattern: &str) -> Vec<(String, Vec<Posting>)> {
    reader
        .wildcard(&Pattern::parse(pattern.as_bytes()).unwrap())
        .unwrap()
        .into_iter()
        .map(|m| {
            (
                String::from_utf8(m.token).unwrap(),
                reader.postings(m.postings).unwrap(),
            )
        })
        .collect()
}

fn fuzzy(reader: &IndexReader, query: &str, k: usize) -> Vec<(String, usize)> {
    reader
        .fuzzy(query.as_bytes(), k)
        .unwrap()
        .into_iter()
        .map(|m| {
            let d = m.distance();
            (String::from_utf8(m.token).unwrap(), d)
        })
        .collect()
}

#[test]
fn test_exact() {
    let (_dir, reader) = cat_car_cart();
    let car = reader.lookup(b"car").unwrap().unwrap();
    assert_eq!(reader.postings(car).unwrap(), vec![Posting::new(2, 0)]);
    assert_eq!(reader.lookup_in_table(b"car"), Some(car));
}

#[test]
fn test_single_byte_wildcard() {
    let (_dir, reader) = cat_car_cart();
    assert_eq!(
        wildcard(&reader, "ca."),
        vec![
            ("car".to_string(), vec![Posting::new(2, 0)]),
            ("cat".to_string(), vec![Posting::new(1, 0)]),
        ]
    );
}

#[test]
fn test_star_wildcard() {
    let (_dir, reader) = cat_car_cart();
    let tokens: Vec<String> = wildcard(&reader, "ca.*").into_iter().map(|(t, _)| t).collect();
    assert_eq!(tokens, vec!["car", "cart", "cat"]);
}

#[test]
fn test_fuzzy_budgets() {
    let (_dir, reader) = cat_car_cart();
    assert_eq!(fuzzy(&reader, "cat", 0), vec![("cat".to_string(), 0)]);
    // "cart" is one insertion away from "cat".
    assert_eq!(
        fuzzy(&reader, "cat", 1),
        vec![
            ("car".to_string(), 1),
            ("cart".to_string(), 1),
            ("cat".to_string(), 0)
        ]
    );
    assert_eq!(fuzzy(&reader, "cat", 2).len(), 3);
    assert_eq!(fuzzy(&reader, "dog", 1), vec![]);
}
