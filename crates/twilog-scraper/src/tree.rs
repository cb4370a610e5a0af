//! Key search over arbitrary JSON trees.

use serde_json::Value;

/// Collects every value stored under `key`, at any depth, in document order.
///
/// A match is reported before any matches nested inside it. Traversal uses
/// an explicit stack, so deeply nested input cannot exhaust the call stack.
pub fn find_values<'a>(root: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    // (key this value is stored under, value)
    let mut stack: Vec<(Option<&'a str>, &'a Value)> = vec![(None, root)];

    while let Some((stored_under, value)) = stack.pop() {
        if stored_under == Some(key) {
            found.push(value);
        }
        match value {
            Value::Object(map) => {
                stack.extend(map.iter().rev().map(|(k, v)| (Some(k.as_str()), v)));
            }
            Value::Array(items) => {
                stack.extend(items.iter().rev().map(|v| (None, v)));
            }
            _ => {}
        }
    }

    found
}

/// First value under `key` in document order.
pub fn find_first<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    find_values(root, key).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_nested_values_in_document_order() {
        let doc = json!({
            "a": {"id": 1, "child": {"id": 2}},
            "list": [{"id": 3}, {"other": {"id": 4}}],
            "id": 5
        });
        let ids: Vec<i64> = find_values(&doc, "id")
            .into_iter()
            .filter_map(Value::as_i64)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn reports_outer_match_before_inner_match() {
        let doc = json!({"entries": [{"entries": [1]}]});
        let found = find_values(&doc, "entries");
        assert_eq!(found.len(), 2);
        assert!(found[0].as_array().is_some_and(|a| a.len() == 1 && a[0].is_object()));
        assert_eq!(found[1], &json!([1]));
    }

    #[test]
    fn missing_key_yields_nothing() {
        let doc = json!({"a": [1, 2, {"b": null}]});
        assert!(find_values(&doc, "c").is_empty());
        assert!(find_first(&doc, "c").is_none());
    }

    #[test]
    fn survives_deep_nesting() {
        let mut doc = json!({"leaf": true});
        for _ in 0..1_000 {
            doc = json!({ "n": [doc] });
        }
        assert_eq!(find_values(&doc, "leaf").len(), 1);
    }
}
