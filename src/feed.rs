use anyhow::Result;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::parser::post::{profile_url, Post};

/// Item titles longer than this many characters are cut and get an ellipsis.
pub const TITLE_LIMIT: usize = 80;

const RFC822: &str = "%a, %d %b %Y %H:%M:%S +0000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub last_build_date: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<String>,
    pub guid: String,
}

impl Feed {
    pub fn build(account: &str, posts: &[Post], built_at: DateTime<Utc>) -> Self {
        Feed {
            title: format!("@{} - Threads", account),
            link: profile_url(account),
            description: format!("Threads posts from @{}", account),
            last_build_date: built_at.format(RFC822).to_string(),
            items: posts.iter().map(FeedItem::from_post).collect(),
        }
    }

    /// Render as an RSS 2.0 document.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        text_element(&mut writer, "title", &self.title)?;
        text_element(&mut writer, "link", &self.link)?;
        text_element(&mut writer, "description", &self.description)?;
        text_element(&mut writer, "lastBuildDate", &self.last_build_date)?;

        for item in &self.items {
            writer.write_event(Event::Start(BytesStart::new("item")))?;
            text_element(&mut writer, "title", &item.title)?;
            text_element(&mut writer, "link", &item.link)?;
            text_element(&mut writer, "description", &item.description)?;
            if let Some(date) = &item.pub_date {
                text_element(&mut writer, "pubDate", date)?;
            }
            text_element(&mut writer, "guid", &item.guid)?;
            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

impl FeedItem {
    fn from_post(post: &Post) -> Self {
        let text = post.text.as_deref().unwrap_or_default();
        FeedItem {
            title: item_title(text),
            link: post.url.clone(),
            description: text.to_string(),
            // A zero timestamp means the page did not say when.
            pub_date: post
                .published_on
                .filter(|&secs| secs != 0)
                .and_then(format_timestamp),
            guid: post.url.clone(),
        }
    }
}

fn text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

pub fn item_title(text: &str) -> String {
    if text.chars().count() <= TITLE_LIMIT {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(TITLE_LIMIT).collect();
        format!("{}...", truncated)
    }
}

/// Epoch seconds as an RFC-822 date in UTC; `None` if out of chrono's range.
pub fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format(RFC822).to_string())
}
