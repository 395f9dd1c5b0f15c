use std::collections::HashSet;

use super::post::Post;

/// First-seen-wins filter keyed by post code.
///
/// Posts without a code all share the `None` key, so only the first of them
/// survives. One instance per account run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<Option<String>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `post` if it has text and its code has not been accepted yet.
    pub fn accept(&mut self, post: &Post) -> bool {
        let has_text = post.text.as_deref().is_some_and(|t| !t.is_empty());
        has_text && self.seen.insert(post.code.clone())
    }

    pub fn filter(&mut self, drafts: Vec<Post>) -> Vec<Post> {
        drafts.into_iter().filter(|p| self.accept(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(code: Option<&str>, text: Option<&str>) -> Post {
        Post {
            text: text.map(String::from),
            published_on: None,
            code: code.map(String::from),
            username: Some("bob".into()),
            like_count: None,
            url: String::new(),
        }
    }

    #[test]
    fn first_seen_wins() {
        let out = Deduplicator::new().filter(vec![
            post(Some("a"), Some("first")),
            post(Some("b"), Some("other")),
            post(Some("a"), Some("second")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text.as_deref(), Some("first"));
        assert_eq!(out[1].code.as_deref(), Some("b"));
    }

    #[test]
    fn drops_missing_and_empty_text() {
        let out = Deduplicator::new().filter(vec![
            post(Some("a"), None),
            post(Some("b"), Some("")),
            post(Some("c"), Some("kept")),
        ]);
        assert_eq!(out, vec![post(Some("c"), Some("kept"))]);
    }

    #[test]
    fn rejected_drafts_do_not_claim_their_code() {
        let out = Deduplicator::new().filter(vec![
            post(Some("a"), None),
            post(Some("a"), Some("later text")),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text.as_deref(), Some("later text"));
    }

    #[test]
    fn codeless_posts_share_one_key() {
        let out = Deduplicator::new().filter(vec![
            post(None, Some("one")),
            post(None, Some("two")),
            post(Some(""), Some("empty code")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text.as_deref(), Some("one"));
        assert_eq!(out[1].text.as_deref(), Some("empty code"));
    }

    #[test]
    fn idempotent() {
        let drafts = vec![
            post(Some("a"), Some("x")),
            post(Some("a"), Some("y")),
            post(None, Some("z")),
            post(None, Some("w")),
            post(Some("b"), None),
        ];
        let once = Deduplicator::new().filter(drafts);
        let twice = Deduplicator::new().filter(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn state_is_per_instance() {
        let mut first = Deduplicator::new();
        assert!(first.accept(&post(Some("a"), Some("x"))));
        assert!(!first.accept(&post(Some("a"), Some("x"))));
        assert!(Deduplicator::new().accept(&post(Some("a"), Some("x"))));
    }
}
