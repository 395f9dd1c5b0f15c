use serde_json::Value;

use super::query::{resolve_i64, resolve_str};

pub const PLATFORM_BASE: &str = "https://www.threads.net";

const TEXT_PATH: &str = "post.caption.text";
const PUBLISHED_PATH: &str = "post.taken_at";
const CODE_PATH: &str = "post.code";
const USERNAME_PATH: &str = "post.user.username";
const LIKES_PATH: &str = "post.like_count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: Option<String>,
    /// Epoch seconds.
    pub published_on: Option<i64>,
    pub code: Option<String>,
    pub username: Option<String>,
    pub like_count: Option<i64>,
    /// Empty unless both username and code are known.
    pub url: String,
}

/// Map one raw thread item to a post. Never fails; unknown shapes give empty fields.
pub fn normalize(item: &Value) -> Post {
    let code = resolve_str(CODE_PATH, item);
    let username = resolve_str(USERNAME_PATH, item);
    let url = canonical_url(username.as_deref(), code.as_deref());

    Post {
        text: resolve_str(TEXT_PATH, item),
        published_on: resolve_i64(PUBLISHED_PATH, item),
        code,
        username,
        like_count: resolve_i64(LIKES_PATH, item),
        url,
    }
}

pub fn canonical_url(username: Option<&str>, code: Option<&str>) -> String {
    match (username, code) {
        (Some(u), Some(c)) if !u.is_empty() && !c.is_empty() => {
            format!("{}/@{}/post/{}", PLATFORM_BASE, u, c)
        }
        _ => String::new(),
    }
}

pub fn profile_url(account: &str) -> String {
    format!("{}/@{}", PLATFORM_BASE, account)
}
