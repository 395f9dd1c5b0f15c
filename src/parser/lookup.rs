use serde_json::Value;
use tracing::{debug, warn};

use super::THREAD_ITEMS_KEY;
use crate::error::BlockError;

/// Every value bound to `key` anywhere in `root`, in document order.
///
/// Matches are also descended into, so a key nested under another occurrence
/// of itself is found too.
pub fn find_all<'a>(root: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    let mut stack: Vec<(Option<&str>, &Value)> = vec![(None, root)];

    while let Some((name, value)) = stack.pop() {
        if name == Some(key) {
            found.push(value);
        }
        match value {
            Value::Object(map) => {
                for (k, v) in map.iter().rev() {
                    stack.push((Some(k.as_str()), v));
                }
            }
            Value::Array(items) => {
                for v in items.iter().rev() {
                    stack.push((None, v));
                }
            }
            _ => {}
        }
    }

    found
}

pub fn parse_block(index: usize, text: &str) -> Result<Value, BlockError> {
    serde_json::from_str(text).map_err(|source| BlockError::Parse { index, source })
}

/// Flatten all thread-item collections across the page's blocks.
///
/// A block that fails to parse is logged and skipped; the rest still count.
pub fn extract_thread_items(blocks: &[String]) -> ExtractedItems {
    let mut out = ExtractedItems::default();

    for (index, text) in blocks.iter().enumerate() {
        let root = match parse_block(index, text) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping embedded block: {}", e);
                out.skipped_blocks += 1;
                continue;
            }
        };

        for collection in find_all(&root, THREAD_ITEMS_KEY) {
            match collection {
                Value::Array(items) => out.items.extend(items.iter().cloned()),
                other => debug!(block = index, kind = kind(other), "thread_items is not an array"),
            }
        }
    }

    out
}

#[derive(Debug, Default)]
pub struct ExtractedItems {
    pub items: Vec<Value>,
    pub skipped_blocks: usize,
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_key_at_any_depth() {
        let v = json!({
            "a": {"thread_items": [1]},
            "b": [{"c": {"d": {"thread_items": [2, 3]}}}],
            "thread_items": []
        });
        let found = find_all(&v, "thread_items");
        assert_eq!(found, vec![&json!([1]), &json!([2, 3]), &json!([])]);
    }

    #[test]
    fn descends_into_matched_values() {
        let v = json!({"thread_items": [{"x": {"thread_items": ["inner"]}}]});
        let found = find_all(&v, "thread_items");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1], &json!(["inner"]));
    }

    #[test]
    fn key_only_matches_object_keys() {
        let v = json!(["thread_items", {"other": "thread_items"}]);
        assert!(find_all(&v, "thread_items").is_empty());
    }

    #[test]
    fn scalar_root() {
        assert!(find_all(&json!(42), "thread_items").is_empty());
    }

    #[test]
    fn flattens_one_level() {
        let blocks = vec![
            r#"{"x":{"thread_items":[{"post":{"code":"a"}},{"post":{"code":"b"}}]}}"#.to_string(),
            r#"[{"thread_items":[{"post":{"code":"c"}}]}]"#.to_string(),
        ];
        let out = extract_thread_items(&blocks);
        assert_eq!(out.items.len(), 3);
        assert_eq!(out.items[2], json!({"post": {"code": "c"}}));
        assert_eq!(out.skipped_blocks, 0);
    }

    #[test]
    fn non_array_collections_contribute_nothing() {
        let blocks = vec![r#"{"thread_items":"oops","y":{"thread_items":null}}"#.to_string()];
        let out = extract_thread_items(&blocks);
        assert!(out.items.is_empty());
    }

    #[test]
    fn bad_block_is_isolated() {
        let blocks = vec![
            r#"{"thread_items":[{"post":{"code":"a"}}]}"#.to_string(),
            r#"{"thread_items":[{"post":"#.to_string(),
            r#"{"thread_items":[{"post":{"code":"b"}}]}"#.to_string(),
        ];
        let out = extract_thread_items(&blocks);
        assert_eq!(out.items.len(), 2);
        assert_eq!(out.skipped_blocks, 1);
    }

    #[test]
    fn parse_error_names_block() {
        let err = parse_block(3, "{").unwrap_err();
        assert!(err.to_string().starts_with("block 3: invalid JSON"));
    }
}
