//! Human-readable text summary of a run.
//!
//! Relevant identities are listed first, each group ordered by descending
//! evidence score. An empty roster produces an explicit notice rather than an
//! empty file.

use crate::models::{ResolvedIdentity, Roster};
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const EMPTY_NOTICE: &str = "No identities were resolved. Every source returned zero usable candidates \
or none passed the location filter.";

pub fn render(roster: &Roster) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Research roster for {}", roster.company)?;
    writeln!(out, "Generated: {}", roster.generated_at)?;
    writeln!(
        out,
        "Location filter: >= {} (unknown locations kept)",
        roster.min_location
    )?;
    writeln!(
        out,
        "Resolved {} identities from {} candidates ({} dropped); {} shown after filtering",
        roster.identities.len(),
        roster.stats.total_received(),
        roster.stats.dropped,
        roster.filtered.len()
    )?;
    for (source, count) in &roster.stats.received {
        writeln!(out, "  {source}: {count} candidates")?;
    }
    writeln!(out)?;

    if roster.filtered.is_empty() {
        writeln!(out, "{EMPTY_NOTICE}")?;
        return Ok(out);
    }

    let (relevant, other): (Vec<&ResolvedIdentity>, Vec<&ResolvedIdentity>) =
        roster.filtered.iter().partition(|i| i.is_relevant);

    for (heading, group) in [("Research-like", relevant), ("Other", other)] {
        if group.is_empty() {
            continue;
        }
        writeln!(out, "== {heading} ({}) ==", group.len())?;
        for identity in group
            .into_iter()
            .sorted_by(|a, b| b.evidence_score.total_cmp(&a.evidence_score))
        {
            write_identity(&mut out, identity)?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

fn write_identity(out: &mut String, identity: &ResolvedIdentity) -> std::fmt::Result {
    let headline = [identity.title.as_deref(), identity.company.as_deref()]
        .into_iter()
        .flatten()
        .join(" @ ");
    write!(out, "- {} [{:.2}]", identity.canonical_name, identity.evidence_score)?;
    if !headline.is_empty() {
        write!(out, " {headline}")?;
    }
    writeln!(out)?;
    if let Some(location) = &identity.best_location {
        writeln!(
            out,
            "    location: {location} ({})",
            identity.best_location_confidence
        )?;
    }
    for link in &identity.identity_links {
        writeln!(out, "    link: {}", link.url)?;
    }
    let sources = identity
        .sources
        .iter()
        .map(|p| p.source.as_str())
        .unique()
        .join(", ");
    writeln!(out, "    sources: {sources}")
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_summary(roster: &Roster, path: &Path) -> Result<(), Box<dyn Error>> {
    let text = render(roster)?;
    fs::write(path, text).await?;
    info!(filtered = roster.filtered.len(), "Wrote text summary");
    Ok(())
}
