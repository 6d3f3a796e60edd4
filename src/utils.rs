//! Utility functions for string cleanup and file system checks.
//!
//! - Whitespace collapsing for names and evidence text
//! - String truncation for log previews
//! - Slugification for output file names
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Trim and collapse every run of whitespace to a single space.
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  Jane \n Doe "), "Jane Doe");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes, with `"…(+N bytes)"` appended.
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

/// Convert a company name into a file-name friendly slug.
///
/// ```ignore
/// assert_eq!(slugify("Acme AI, Inc."), "acme-ai-inc");
/// ```
pub fn slugify(name: &str) -> String {
    let cleaned = name
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "");
    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        "roster".to_string()
    } else {
        slug
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
