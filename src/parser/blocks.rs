use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::THREAD_ITEMS_KEY;

static DATA_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/json"][data-sjs]"#).unwrap()
});

/// Literal that identifies the server-rendered hydration payload family.
const PAYLOAD_MARKER: &str = "\"ScheduledServerJS\"";

/// Raw text of every structured-data script element, in document order.
pub fn script_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&DATA_SCRIPT)
        .map(|el| el.text().collect::<String>())
        .collect()
}

/// Cheap substring check run before any JSON parsing.
pub fn is_candidate(text: &str) -> bool {
    text.contains(PAYLOAD_MARKER) && text.contains(THREAD_ITEMS_KEY)
}

/// Locate the embedded JSON fragments that may carry thread items.
pub fn locate_blocks(html: &str) -> Vec<String> {
    script_texts(html)
        .into_iter()
        .filter(|text| is_candidate(text))
        .collect()
}
