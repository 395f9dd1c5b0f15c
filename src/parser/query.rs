//! Dotted field paths over JSON records, e.g. `post.user.username` or
//! `carousel_media[0].image.url`.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

/// Split a path into steps. Returns `None` for malformed paths.
pub fn parse_path(path: &str) -> Option<Vec<Step<'_>>> {
    let mut steps = Vec::new();

    for segment in path.split('.') {
        let (name, mut rest) = match segment.find('[') {
            Some(i) => segment.split_at(i),
            None => (segment, ""),
        };
        if name.is_empty() && rest.is_empty() {
            return None;
        }
        if !name.is_empty() {
            steps.push(Step::Key(name));
        }
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            steps.push(Step::Index(inner[..close].parse().ok()?));
            rest = &inner[close + 1..];
        }
    }

    Some(steps)
}

/// Walk `path` through `value`. Missing keys, out-of-range indices, type
/// mismatches along the way and a final `null` all resolve to `None`.
pub fn resolve<'v>(path: &str, value: &'v Value) -> Option<&'v Value> {
    let mut current = value;
    for step in parse_path(path)? {
        current = match step {
            Step::Key(k) => current.as_object()?.get(k)?,
            Step::Index(i) => current.as_array()?.get(i)?,
        };
    }
    (!current.is_null()).then_some(current)
}

pub fn resolve_str(path: &str, value: &Value) -> Option<String> {
    resolve(path, value)?.as_str().map(str::to_string)
}

pub fn resolve_i64(path: &str, value: &Value) -> Option<i64> {
    resolve(path, value)?.as_i64()
}
