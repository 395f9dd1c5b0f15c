mod browser;
mod error;
mod feed;
mod output;
mod parser;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use regex::Regex;
use tracing::{info, warn};

use browser::{BrowserlessRenderer, Renderer, SnapshotRenderer};
use feed::Feed;

/// Accounts scraped when none are given on the command line.
const ACCOUNTS: &[&str] = &["choi.openai"];

static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap());

#[derive(Parser)]
#[command(name = "threads_feed", about = "Turn Threads profiles into RSS feeds")]
struct Cli {
    /// Accounts to scrape (default: the built-in list)
    accounts: Vec<String>,
    /// Directory the feeds are written to
    #[arg(short, long, default_value = output::DEFAULT_DIR)]
    out: PathBuf,
    /// Browserless instance used to render profile pages
    #[arg(long, env = "BROWSERLESS_URL", default_value = "http://localhost:3000")]
    browserless_url: String,
    #[arg(long, env = "BROWSERLESS_TOKEN")]
    browserless_token: Option<String>,
    /// Read saved pages from <DIR>/<account>.html instead of rendering
    #[arg(long, value_name = "DIR")]
    html_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let accounts: Vec<String> = if cli.accounts.is_empty() {
        ACCOUNTS.iter().map(|a| a.to_string()).collect()
    } else {
        cli.accounts
    };

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("Failed to create output directory {}", cli.out.display()))?;

    let renderer: Box<dyn Renderer> = match cli.html_dir {
        Some(dir) => Box::new(SnapshotRenderer::new(dir)),
        None => Box::new(BrowserlessRenderer::new(
            &cli.browserless_url,
            cli.browserless_token.as_deref(),
        )?),
    };

    let stats = run_all(renderer.as_ref(), &accounts, &cli.out);
    info!(
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Finished {} accounts ({} ok, {} errors)",
        stats.total,
        stats.ok,
        stats.errors
    );

    Ok(())
}

struct RunStats {
    total: usize,
    ok: usize,
    errors: usize,
}

/// Process accounts one after another. A failing account is reported and
/// skipped; it never stops the others.
fn run_all(renderer: &dyn Renderer, accounts: &[String], out_dir: &Path) -> RunStats {
    let mut stats = RunStats {
        total: accounts.len(),
        ok: 0,
        errors: 0,
    };

    for account in accounts {
        println!("Scraping @{}...", account);
        match run_account(renderer, account, out_dir, Utc::now) {
            Ok(saved) => {
                println!("  Found {} posts", saved.posts);
                println!("  Saved to {}", saved.path.display());
                stats.ok += 1;
            }
            Err(e) => {
                warn!(account = %account, "Account failed: {:#}", e);
                println!("  Error: {:#}", e);
                stats.errors += 1;
            }
        }
    }

    stats
}

#[derive(Debug)]
struct Saved {
    path: PathBuf,
    posts: usize,
}

/// render → parse → feed → write for one account. Nothing is written unless
/// every step succeeds.
fn run_account(
    renderer: &dyn Renderer,
    account: &str,
    out_dir: &Path,
    now: impl Fn() -> DateTime<Utc>,
) -> Result<Saved> {
    if !ACCOUNT_RE.is_match(account) {
        bail!("invalid account id {:?}", account);
    }

    let html = match renderer.render(account) {
        Ok(html) => html,
        Err(e) => {
            let reason = e.to_string();
            let partial = e
                .into_partial()
                .with_context(|| format!("Failed to render @{}", account))?;
            warn!(account = %account, bytes = partial.len(), "{}; continuing with partial page", reason);
            partial
        }
    };

    let scan = parser::process_page(&html);
    info!(
        account = %account,
        blocks = scan.blocks,
        skipped = scan.skipped_blocks,
        drafts = scan.drafts,
        posts = scan.posts.len(),
        "Parsed profile page"
    );

    let xml = Feed::build(account, &scan.posts, now()).to_xml()?;
    let path = output::feed_path(out_dir, account);
    output::write_feed(&path, &xml)?;

    Ok(Saved {
        path,
        posts: scan.posts.len(),
    })
}
