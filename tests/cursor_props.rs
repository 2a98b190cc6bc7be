mod common;

use common::{as_ints, int_handle, ints, tree};
use cursorwork::{
    AppendCursor, CachingCursor, CachingMode, Cursor, CursorExt, FilterCursor, InfiniteCursor,
    LimitCursor, Lookahead, MultipleCursor, MultipleFlags, TraversalMode, TreeCursor, Value,
};
use proptest::prelude::*;

fn items() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-50i64..50, 0..24)
}

/// Nested JSON arrays of small integers.
fn nested() -> impl Strategy<Value = serde_json::Value> {
    let leaf = (0i64..100).prop_map(serde_json::Value::from);
    leaf.prop_recursive(4, 32, 4, |inner| {
        proptest::collection::vec(inner, 0..4).prop_map(serde_json::Value::Array)
    })
}

fn leaves(json: &serde_json::Value, out: &mut Vec<i64>) {
    match json {
        serde_json::Value::Array(items) => items.iter().for_each(|item| leaves(item, out)),
        other => out.push(other.as_i64().expect("integer leaf")),
    }
}

/// Key paths of every element, parents before or after their children.
fn paths(
    json: &serde_json::Value,
    prefix: &mut Vec<i64>,
    parents_first: bool,
    out: &mut Vec<Vec<i64>>,
) {
    let serde_json::Value::Array(items) = json else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        prefix.push(index as i64);
        if parents_first {
            out.push(prefix.clone());
        }
        paths(item, prefix, parents_first, out);
        if !parents_first {
            out.push(prefix.clone());
        }
        prefix.pop();
    }
}

fn visited_paths(json: serde_json::Value, mode: TraversalMode) -> Vec<Vec<i64>> {
    let mut cursor = TreeCursor::new(tree(json), mode);
    let mut out = Vec::new();
    cursor.rewind().expect("rewind");
    while cursor.valid() {
        let path = (0..=cursor.get_depth())
            .map(|level| {
                let level = cursor.get_sub_iterator(level).expect("open level");
                level.key().expect("key").as_int().expect("integer key")
            })
            .collect();
        out.push(path);
        cursor.next().expect("next");
    }
    out
}

proptest! {
    #[test]
    fn sequence_preserves_order(values in items()) {
        let mut cursor = ints(&values);
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), values.clone());
        let keys: Vec<Value> = (0..values.len() as i64).map(Value::Int).collect();
        prop_assert_eq!(cursor.keys().expect("keys"), keys);
    }

    #[test]
    fn limit_matches_slice(values in items(), offset in 0usize..30, limit in -1i64..30) {
        let mut cursor = LimitCursor::new(ints(&values), offset as i64, limit).expect("bounds");
        let start = offset.min(values.len());
        let end = match limit {
            -1 => values.len(),
            n => (start + n as usize).min(values.len()),
        };
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), values[start..end].to_vec());
    }

    #[test]
    fn filter_matches_retain(values in items(), modulus in 1i64..5) {
        let mut cursor = FilterCursor::callback(ints(&values), move |v| {
            Ok(v.as_int().is_some_and(|n| n.rem_euclid(modulus) == 0))
        });
        let expected: Vec<i64> = values.iter().copied().filter(|n| n.rem_euclid(modulus) == 0).collect();
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), expected);
    }

    #[test]
    fn append_matches_concatenation(parts in proptest::collection::vec(items(), 0..5)) {
        let mut cursor = AppendCursor::new();
        for part in &parts {
            cursor.append(int_handle(part)).expect("append");
        }
        let expected: Vec<i64> = parts.concat();
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), expected);
    }

    #[test]
    fn multiple_zips_to_shortest(a in items(), b in items()) {
        let mut cursor = MultipleCursor::new(MultipleFlags::default());
        cursor.attach_iterator(int_handle(&a), None).expect("attach");
        cursor.attach_iterator(int_handle(&b), None).expect("attach");
        let rows = cursor.values().expect("values");
        prop_assert_eq!(rows.len(), a.len().min(b.len()));
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_array().expect("row");
            let pair: Vec<Value> = row.values().cloned().collect();
            prop_assert_eq!(pair, vec![Value::Int(a[index]), Value::Int(b[index])]);
        }
    }

    #[test]
    fn infinite_is_periodic(values in proptest::collection::vec(-50i64..50, 1..8), take in 0usize..40) {
        let mut cursor = LimitCursor::new(InfiniteCursor::new(ints(&values)), 0, take as i64).expect("bounds");
        let seen = as_ints(&cursor.values().expect("values"));
        prop_assert_eq!(seen.len(), take);
        for (index, value) in seen.iter().enumerate() {
            prop_assert_eq!(*value, values[index % values.len()]);
        }
    }

    #[test]
    fn caching_is_transparent_and_looks_ahead(values in items()) {
        let mut cursor = CachingCursor::new(ints(&values), CachingMode::default());
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), values.clone());

        cursor.rewind().expect("rewind");
        let mut remaining = values.len();
        while cursor.valid() {
            remaining -= 1;
            prop_assert_eq!(cursor.has_next(), remaining > 0);
            cursor.next().expect("next");
        }
    }

    #[test]
    fn leaves_only_matches_recursive_walk(json in nested()) {
        prop_assume!(json.is_array());
        let mut expected = Vec::new();
        leaves(&json, &mut expected);

        let mut cursor = TreeCursor::new(tree(json), TraversalMode::LeavesOnly);
        prop_assert_eq!(as_ints(&cursor.values().expect("values")), expected);
    }

    #[test]
    fn self_first_is_a_pre_order_walk(json in nested()) {
        prop_assume!(json.is_array());
        let mut expected = Vec::new();
        paths(&json, &mut Vec::new(), true, &mut expected);
        prop_assert_eq!(visited_paths(json, TraversalMode::SelfFirst), expected);
    }

    #[test]
    fn child_first_is_a_post_order_walk(json in nested()) {
        prop_assume!(json.is_array());
        let mut expected = Vec::new();
        paths(&json, &mut Vec::new(), false, &mut expected);
        prop_assert_eq!(visited_paths(json, TraversalMode::ChildFirst), expected);
    }
}
