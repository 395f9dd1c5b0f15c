use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::RenderError;
use crate::parser::post::profile_url;

pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
pub const SELECTOR_TIMEOUT: Duration = Duration::from_secs(15);
pub const SCROLL_TIMEOUT: Duration = Duration::from_secs(20);
/// Present once the profile's post list has been hydrated.
pub const READY_SELECTOR: &str = "[data-pressable-container=true]";

/// Five scrolls to the bottom, two seconds apart, so lazily loaded posts
/// get hydrated before the content is taken.
const SCROLL_SCRIPT: &str = "async () => { \
    for (let i = 0; i < 5; i++) { \
        window.scrollTo(0, document.body.scrollHeight); \
        await new Promise((resolve) => setTimeout(resolve, 2000)); \
    } \
    return true; \
}";

static READY: LazyLock<Selector> = LazyLock::new(|| Selector::parse(READY_SELECTOR).unwrap());

/// Produces the fully rendered HTML of an account's profile page.
pub trait Renderer {
    fn render(&self, account: &str) -> Result<String, RenderError>;
}

/// Renders pages through a Browserless instance's `/content` endpoint.
pub struct BrowserlessRenderer {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    /// Return whatever was rendered when a wait step times out.
    best_attempt: bool,
    goto_options: GotoOptions,
    wait_for_function: WaitForFunction,
    wait_for_selector: WaitForSelector,
    viewport: Viewport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    timeout: u64,
    wait_until: &'static str,
}

#[derive(Serialize)]
struct WaitForFunction {
    #[serde(rename = "fn")]
    function: &'static str,
    timeout: u64,
}

#[derive(Serialize)]
struct WaitForSelector {
    selector: &'static str,
    timeout: u64,
}

#[derive(Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

fn content_request(url: &str) -> ContentRequest<'_> {
    ContentRequest {
        url,
        best_attempt: true,
        goto_options: GotoOptions {
            timeout: NAVIGATION_TIMEOUT.as_millis() as u64,
            wait_until: "networkidle2",
        },
        wait_for_function: WaitForFunction {
            function: SCROLL_SCRIPT,
            timeout: SCROLL_TIMEOUT.as_millis() as u64,
        },
        wait_for_selector: WaitForSelector {
            selector: READY_SELECTOR,
            timeout: SELECTOR_TIMEOUT.as_millis() as u64,
        },
        viewport: Viewport {
            width: 1920,
            height: 1080,
        },
    }
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, RenderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(NAVIGATION_TIMEOUT + SCROLL_TIMEOUT + SELECTOR_TIMEOUT + Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }
}

impl Renderer for BrowserlessRenderer {
    fn render(&self, account: &str) -> Result<String, RenderError> {
        let url = profile_url(account);
        let body = content_request(&url);

        info!("Rendering {}", url);
        let resp = match self.client.post(self.endpoint()).json(&body).send() {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return Err(RenderError::NavigationTimeout {
                    after: NAVIGATION_TIMEOUT,
                    partial: String::new(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(classify_failure(status.as_u16(), message));
        }

        let html = resp.text()?;
        debug!(bytes = html.len(), "Rendered {}", url);
        check_ready(html)
    }
}

/// A best-attempt page that never showed the post list is a selector-wait
/// timeout; the rendered HTML travels with the error.
fn check_ready(html: String) -> Result<String, RenderError> {
    if Html::parse_document(&html).select(&READY).next().is_some() {
        Ok(html)
    } else {
        Err(RenderError::SelectorWaitTimeout {
            selector: READY_SELECTOR.to_string(),
            partial: html,
        })
    }
}

/// Map a non-2xx Browserless response onto the error kinds. No page comes
/// back with these, so a timeout carries an empty partial page.
fn classify_failure(status: u16, message: String) -> RenderError {
    if status == 408 || message.contains("Navigation timeout") {
        RenderError::NavigationTimeout {
            after: NAVIGATION_TIMEOUT,
            partial: String::new(),
        }
    } else {
        RenderError::Api { status, message }
    }
}

/// Reads previously saved pages from `<dir>/<account>.html`.
pub struct SnapshotRenderer {
    dir: PathBuf,
}

impl SnapshotRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Renderer for SnapshotRenderer {
    fn render(&self, account: &str) -> Result<String, RenderError> {
        let path = self.dir.join(format!("{}.html", account));
        std::fs::read_to_string(&path).map_err(|source| RenderError::Snapshot { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let v = serde_json::to_value(content_request("https://www.threads.net/@bob")).unwrap();
        assert_eq!(v["url"], "https://www.threads.net/@bob");
        assert_eq!(v["bestAttempt"], true);
        assert_eq!(v["gotoOptions"]["timeout"], 30000);
        assert_eq!(v["gotoOptions"]["waitUntil"], "networkidle2");
        assert_eq!(v["waitForSelector"]["selector"], READY_SELECTOR);
        assert_eq!(v["waitForSelector"]["timeout"], 15000);
        assert_eq!(v["viewport"]["width"], 1920);
    }

    #[test]
    fn request_scrolls_before_capture() {
        let v = serde_json::to_value(content_request("https://www.threads.net/@bob")).unwrap();
        let script = v["waitForFunction"]["fn"].as_str().unwrap();
        assert!(script.contains("window.scrollTo(0, document.body.scrollHeight)"));
        assert!(script.contains("i < 5"));
        assert_eq!(v["waitForFunction"]["timeout"], 20000);
    }

    #[test]
    fn endpoint_with_token() {
        let r = BrowserlessRenderer::new("http://localhost:3000/", Some("secret")).unwrap();
        assert_eq!(r.endpoint(), "http://localhost:3000/content?token=secret");
        let r = BrowserlessRenderer::new("http://localhost:3000", None).unwrap();
        assert_eq!(r.endpoint(), "http://localhost:3000/content");
    }

    #[test]
    fn ready_page_passes_through() {
        let html = std::fs::read_to_string("tests/fixtures/profile.html").unwrap();
        assert_eq!(check_ready(html.clone()).unwrap(), html);
    }

    #[test]
    fn selector_timeout_keeps_rendered_page() {
        let html = std::fs::read_to_string("tests/fixtures/empty_profile.html").unwrap();
        let err = check_ready(html.clone()).unwrap_err();
        assert!(matches!(err, RenderError::SelectorWaitTimeout { .. }));
        let partial = err.into_partial().unwrap();
        assert!(!partial.is_empty());
        assert_eq!(partial, html);
    }

    #[test]
    fn failure_classification() {
        assert!(matches!(
            classify_failure(408, "Request has timed out".into()),
            RenderError::NavigationTimeout { .. }
        ));
        assert!(matches!(
            classify_failure(503, "Too many requests".into()),
            RenderError::Api { status: 503, .. }
        ));
    }

    #[test]
    fn snapshot_reads_fixture() {
        let r = SnapshotRenderer::new("tests/fixtures");
        let html = r.render("profile").unwrap();
        assert!(html.contains("ScheduledServerJS"));
    }

    #[test]
    fn snapshot_missing_file() {
        let r = SnapshotRenderer::new("tests/fixtures");
        let err = r.render("nobody").unwrap_err();
        assert!(matches!(err, RenderError::Snapshot { .. }));
        assert!(err.into_partial().is_err());
    }
}
