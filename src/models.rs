//! Data models for candidates and resolved identities.
//!
//! This module defines the records that flow through the roster pipeline:
//! - [`RawCandidate`]: One source's unprocessed report about one person
//! - [`NormalizedCandidate`]: A raw candidate mapped onto the common, lower-cased shape
//! - [`ResolvedIdentity`]: The merged representation of one person across all sources
//! - [`Roster`]: Everything one run produced, as handed to the exporters
//!
//! Supporting types: [`SourceKind`], [`Provenance`], [`IdentityHints`],
//! [`IdentityLink`], [`LocationConfidence`] and [`RunStats`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// The external system a candidate was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "openalex")]
    OpenAlex,
    #[serde(rename = "hackernews")]
    HackerNews,
    #[serde(rename = "newsapi")]
    NewsApi,
    #[serde(rename = "hunter")]
    Hunter,
    #[serde(rename = "team_page")]
    TeamPage,
}

impl SourceKind {
    /// Every connector this build knows how to run, in execution order.
    pub const ALL: [SourceKind; 6] = [
        SourceKind::GitHub,
        SourceKind::OpenAlex,
        SourceKind::HackerNews,
        SourceKind::NewsApi,
        SourceKind::Hunter,
        SourceKind::TeamPage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GitHub => "github",
            SourceKind::OpenAlex => "openalex",
            SourceKind::HackerNews => "hackernews",
            SourceKind::NewsApi => "newsapi",
            SourceKind::Hunter => "hunter",
            SourceKind::TeamPage => "team_page",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown source `{s}`"))
    }
}

/// Which source produced a candidate, and where in that source it was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub source: SourceKind,
    /// Source-specific reference URL (API object, article, page).
    pub reference: String,
}

impl Provenance {
    pub fn new(source: SourceKind, reference: impl Into<String>) -> Self {
        Self {
            source,
            reference: reference.into(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.reference)
    }
}

/// Optional identity links reported by a source.
///
/// Any one of these, when it matches a link already attached to a resolved
/// identity, is authoritative for merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityHints {
    pub profile_url: Option<String>,
    pub academic_profile_url: Option<String>,
    pub homepage_url: Option<String>,
}

/// The kind of an identity link, declared in merge-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Profile,
    Academic,
    Homepage,
}

/// A single identity link value attached to a candidate or identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityLink {
    pub kind: LinkKind,
    pub url: String,
}

/// A candidate as produced by a source connector, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Name as reported by the source; may be a handle, a real name or noise.
    pub display_name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub identity_hints: IdentityHints,
    pub location_text: Option<String>,
    /// Bio, snippet or excerpt. Used for scoring, never for identity.
    pub evidence_text: Option<String>,
    pub provenance: Provenance,
}

impl RawCandidate {
    /// A candidate carrying only a name and its provenance.
    pub fn new(display_name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            display_name: display_name.into(),
            title: None,
            company: None,
            identity_hints: IdentityHints::default(),
            location_text: None,
            evidence_text: None,
            provenance,
        }
    }
}

/// Tiered certainty that a reported location lies in the target region.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationConfidence {
    #[default]
    Low,
    Medium,
    High,
}

impl LocationConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationConfidence::Low => "low",
            LocationConfidence::Medium => "medium",
            LocationConfidence::High => "high",
        }
    }
}

impl fmt::Display for LocationConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationConfidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(LocationConfidence::Low),
            "medium" => Ok(LocationConfidence::Medium),
            "high" => Ok(LocationConfidence::High),
            other => Err(format!("unknown location tier `{other}`")),
        }
    }
}

/// A raw candidate mapped onto the common shape.
///
/// `display_name` and `location` keep their original casing for export;
/// `name_key` and `evidence_text` are lower-cased for matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCandidate {
    pub display_name: String,
    /// Trimmed, lower-cased, whitespace-collapsed name used as the fallback merge key.
    pub name_key: String,
    pub title: Option<String>,
    pub company: Option<String>,
    /// Non-empty links in merge-priority order (profile, academic, homepage).
    pub links: Vec<IdentityLink>,
    pub location: Option<String>,
    pub location_confidence: LocationConfidence,
    pub evidence_text: String,
    pub score: f64,
    pub is_research_like: bool,
    pub provenance: Provenance,
}

/// One real person as merged across every source that reported them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIdentity {
    pub canonical_name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub identity_links: BTreeSet<IdentityLink>,
    pub best_location: Option<String>,
    pub best_location_confidence: LocationConfidence,
    /// Always within `[0, 1]`.
    pub evidence_score: f64,
    pub is_relevant: bool,
    pub sources: BTreeSet<Provenance>,
}

impl ResolvedIdentity {
    /// True when no source reported a location for this identity.
    pub fn location_unknown(&self) -> bool {
        self.best_location.is_none()
    }
}

/// Counters gathered while feeding the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Raw candidates received per source, before normalization.
    pub received: BTreeMap<SourceKind, usize>,
    /// Candidates dropped as malformed.
    pub dropped: usize,
}

impl RunStats {
    pub fn total_received(&self) -> usize {
        self.received.values().sum()
    }
}

/// The result of one run: every resolved identity plus the location-filtered
/// subset that is exported as the roster proper.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub company: String,
    /// RFC 3339 local timestamp.
    pub generated_at: String,
    pub min_location: LocationConfidence,
    pub relevance_threshold: f64,
    pub stats: RunStats,
    pub identities: Vec<ResolvedIdentity>,
    pub filtered: Vec<ResolvedIdentity>,
}
