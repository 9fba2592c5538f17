//! Shared utilities: logging, output paths.

use crate::config::FOW_SUFFIX;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// `dir/mission.mis` -> `dir/mission-fow.mis`.
///
/// The file name must have a non-empty stem and an extension of exactly three
/// characters; anything else yields `None` rather than a truncated name.
pub fn fow_output_path(input: &Path) -> Option<PathBuf> {
    let stem = input.file_stem()?.to_str()?;
    let ext = input.extension()?.to_str()?;
    if stem.is_empty() || ext.chars().count() != 3 {
        return None;
    }
    Some(input.with_file_name(format!("{}{}", stem, FOW_SUFFIX)))
}
