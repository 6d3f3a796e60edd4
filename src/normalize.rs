//! Candidate normalization and the table-driven classifiers.
//!
//! Every function here is pure: the only inputs are the raw candidate and the
//! keyword tables from [`RosterConfig`]. Nothing in this module performs I/O.

use crate::config::{LocationTiers, RosterConfig};
use crate::error::NormalizeError;
use crate::models::{IdentityLink, LinkKind, LocationConfidence, NormalizedCandidate, RawCandidate};
use crate::utils::collapse_whitespace;
use itertools::Itertools;

/// Floor added to every relevance score, so a candidate with no keyword hits
/// still carries some weight.
pub const BASE_SCORE: f64 = 0.2;

/// Map a [`RawCandidate`] onto the common shape.
///
/// # Errors
///
/// Returns [`NormalizeError::MalformedCandidate`] when the display name is
/// empty after trimming. Callers drop the candidate and carry on.
pub fn normalize(raw: RawCandidate, config: &RosterConfig) -> Result<NormalizedCandidate, NormalizeError> {
    let display_name = collapse_whitespace(&raw.display_name);
    if display_name.is_empty() {
        return Err(NormalizeError::MalformedCandidate {
            origin: raw.provenance.source,
            reference: raw.provenance.reference,
        });
    }
    let name_key = display_name.to_lowercase();

    let hints = raw.identity_hints;
    let links = [
        (LinkKind::Profile, hints.profile_url),
        (LinkKind::Academic, hints.academic_profile_url),
        (LinkKind::Homepage, hints.homepage_url),
    ]
    .into_iter()
    .filter_map(|(kind, url)| {
        non_empty(url).map(|url| IdentityLink {
            kind,
            url: url.trim_end_matches('/').to_string(),
        })
    })
    .filter(|link| !link.url.is_empty())
    .collect::<Vec<_>>();

    let location = non_empty(raw.location_text);
    let location_confidence = classify_location(location.as_deref().unwrap_or(""), &config.location);

    let evidence_text = raw
        .evidence_text
        .map(|t| collapse_whitespace(&t).to_lowercase())
        .unwrap_or_default();
    let keywords = &config.relevance.keywords;
    let score = compute_score(&evidence_text, keywords);
    let is_research_like = is_research_like(&evidence_text, keywords);

    Ok(NormalizedCandidate {
        display_name,
        name_key,
        title: non_empty(raw.title),
        company: non_empty(raw.company),
        links,
        location,
        location_confidence,
        evidence_text,
        score,
        is_research_like,
        provenance: raw.provenance,
    })
}

/// Classify free-text location against the keyword tiers.
///
/// The "high" tier is consulted first, then "medium"; empty or unmatched text
/// is `Low`.
pub fn classify_location(text: &str, tiers: &LocationTiers) -> LocationConfidence {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return LocationConfidence::Low;
    }
    if contains_any(&text, &tiers.high) {
        LocationConfidence::High
    } else if contains_any(&text, &tiers.medium) {
        LocationConfidence::Medium
    } else {
        LocationConfidence::Low
    }
}

/// True if the evidence text mentions at least one relevance keyword.
pub fn is_research_like(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    !text.is_empty() && contains_any(&text, keywords)
}

/// `min(1, hits / |keywords| + 0.2)`, where `hits` counts distinct keywords found.
pub fn compute_score(text: &str, keywords: &[String]) -> f64 {
    let distinct = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .unique()
        .collect::<Vec<_>>();
    if distinct.is_empty() {
        return BASE_SCORE;
    }
    let text = text.to_lowercase();
    let hits = distinct.iter().filter(|k| text.contains(k.as_str())).count();
    (hits as f64 / distinct.len() as f64 + BASE_SCORE).min(1.0)
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && text.contains(k.as_str()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
