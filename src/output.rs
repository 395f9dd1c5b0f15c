use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

pub const DEFAULT_DIR: &str = "feeds";

/// `<dir>/<account with dots replaced by dashes>.xml`
pub fn feed_path(dir: &Path, account: &str) -> PathBuf {
    dir.join(format!("{}.xml", account.replace('.', "-")))
}

/// Write through a temp file in the same directory so readers never see a
/// partial feed.
pub fn write_feed(path: &Path, xml: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(xml.as_bytes())
        .with_context(|| format!("Failed to write feed for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move feed into {}", path.display()))?;
    Ok(())
}
