//! JSON snapshot of a run.
//!
//! Unlike the CSV and text exports, the snapshot carries every resolved
//! identity as well as the location-filtered subset, so a run can be
//! re-filtered later without re-querying any source.

use crate::models::Roster;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `roster` as pretty-printed JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(roster: &Roster, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(roster)?;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(
        identities = roster.identities.len(),
        filtered = roster.filtered.len(),
        "Wrote JSON snapshot"
    );
    Ok(())
}
