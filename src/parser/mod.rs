pub mod blocks;
pub mod dedup;
pub mod lookup;
pub mod post;
pub mod query;

use tracing::debug;

use dedup::Deduplicator;
use post::Post;

/// Key under which the page embeds each collection of raw post records.
pub const THREAD_ITEMS_KEY: &str = "thread_items";

pub struct PageScan {
    pub posts: Vec<Post>,
    pub blocks: usize,
    pub skipped_blocks: usize,
    pub drafts: usize,
}

/// Four-pass pipeline: html → blocks → thread items → posts → deduplicated posts.
pub fn process_page(html: &str) -> PageScan {
    let blocks = blocks::locate_blocks(html);
    let extracted = lookup::extract_thread_items(&blocks);
    let drafts: Vec<Post> = extracted.items.iter().map(post::normalize).collect();
    let draft_count = drafts.len();
    let posts = Deduplicator::new().filter(drafts);

    for p in &posts {
        debug!(code = ?p.code, user = ?p.username, likes = ?p.like_count, "Accepted post");
    }

    PageScan {
        posts,
        blocks: blocks.len(),
        skipped_blocks: extracted.skipped_blocks,
        drafts: draft_count,
    }
}

// ── Tests ──
