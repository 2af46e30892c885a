//! Utility functions for text cleanup, log truncation and file system checks.
//!
//! - Whitespace cleanup for scraped and API-supplied text
//! - String truncation for logging response previews
//! - Output path validation

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse runs of whitespace and trim the ends.
///
/// Scraped markup is full of indentation and line breaks between inline
/// nodes; every extracted field goes through this.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  Notion \n\t AI  "), "Notion AI");
/// ```
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure the directory that will hold `path` exists and is writable.
///
/// Creates missing parent directories, then performs a write test by
/// creating and immediately deleting a scratch file next to the target.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_parent(path: &str) -> Result<(), Box<dyn Error>> {
    let parent = match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&parent).await?;

    let scratch_path = parent.join("..__write_check__");
    fs::write(&scratch_path, b"").await?;
    let _ = fs::remove_file(&scratch_path).await;
    info!(dir = %parent.display(), "Output directory is writable");
    Ok(())
}
