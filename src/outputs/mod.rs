//! Export of a finished [`Roster`](crate::models::Roster).
//!
//! # Submodules
//!
//! - [`table`]: CSV of the location-filtered roster
//! - [`json`]: Full JSON snapshot of the run (all identities plus the filtered subset)
//! - [`summary`]: Human-readable text summary
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── acme-ai_2025-05-06.csv
//! ├── acme-ai_2025-05-06.json
//! └── acme-ai_2025-05-06.txt
//! ```

pub mod json;
pub mod summary;
pub mod table;

use crate::models::Roster;
use crate::utils::slugify;
use std::path::{Path, PathBuf};

/// Output path for `roster` with the given extension.
pub fn output_path(output_dir: &str, roster: &Roster, date: &str, extension: &str) -> PathBuf {
    Path::new(output_dir).join(format!("{}_{}.{}", slugify(&roster.company), date, extension))
}
