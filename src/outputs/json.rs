//! JSON output of the final query snapshot.
//!
//! The file holds the complete [`QueryState`] (articles, counts, paging, and
//! any error) in the same camelCase shape front ends consume.

use crate::error::Result;
use crate::models::QueryState;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `state` as pretty-printed JSON to `path`, creating parent
/// directories as needed.
///
/// # Arguments
///
/// * `state` - The snapshot to serialize
/// * `path` - Destination file; an existing file is overwritten
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation, serialization,
/// or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_snapshot(state: &QueryState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(state)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(articles = state.articles.len(), "Wrote JSON snapshot");
    Ok(())
}
