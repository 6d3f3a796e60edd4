//! CSV export of the location-filtered roster.
//!
//! One row per identity; multi-valued columns are `;`-joined.

use crate::models::{LinkKind, ResolvedIdentity, Roster};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const HEADER: [&str; 11] = [
    "name",
    "title",
    "company",
    "location",
    "location_confidence",
    "evidence_score",
    "relevant",
    "profile_url",
    "academic_url",
    "homepage_url",
    "sources",
];

/// Render identities as CSV, header included even when there are no rows.
pub fn to_csv(identities: &[ResolvedIdentity]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for identity in identities {
        writer.write_record(row(identity))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

fn row(identity: &ResolvedIdentity) -> [String; 11] {
    let links = |kind: LinkKind| {
        identity
            .identity_links
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.url.as_str())
            .join(";")
    };
    [
        identity.canonical_name.clone(),
        identity.title.clone().unwrap_or_default(),
        identity.company.clone().unwrap_or_default(),
        identity.best_location.clone().unwrap_or_default(),
        identity.best_location_confidence.to_string(),
        format!("{:.3}", identity.evidence_score),
        identity.is_relevant.to_string(),
        links(LinkKind::Profile),
        links(LinkKind::Academic),
        links(LinkKind::Homepage),
        identity.sources.iter().map(|s| s.to_string()).join(";"),
    ]
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_roster(roster: &Roster, path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv(&roster.filtered)?;
    fs::write(path, bytes).await?;
    info!(rows = roster.filtered.len(), "Wrote CSV roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::tests::{jane, roster};

    #[test]
    fn test_to_csv_header_only_when_empty() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), HEADER.join(","));
    }

    #[test]
    fn test_to_csv_row() {
        let bytes = to_csv(&[jane()]).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let records = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(&r[0], "Jane Doe");
        assert_eq!(&r[2], "Acme, Inc.");
        assert_eq!(&r[3], "Palo Alto, CA");
        assert_eq!(&r[4], "high");
        assert_eq!(&r[5], "0.500");
        assert_eq!(&r[6], "true");
        assert_eq!(&r[7], "https://github.com/janedoe");
        assert_eq!(&r[8], "");
        assert_eq!(&r[9], "https://jane.dev");
        assert_eq!(
            &r[10],
            "github:https://api.github.com/users/janedoe;hackernews:https://news.ycombinator.com/item?id=1"
        );
    }

    #[tokio::test]
    async fn test_write_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        write_roster(&roster(vec![jane()]), &path).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
