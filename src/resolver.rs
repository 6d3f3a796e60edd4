//! Cross-source identity resolution and confidence scoring.
//!
//! The [`Resolver`] owns the working set of [`ResolvedIdentity`] values for a
//! single run. Candidates are folded in one at a time via [`Resolver::merge`];
//! identities are never removed.
//!
//! # Merge keys
//!
//! A candidate is matched against the working set in this order:
//! 1. each of its identity links, in priority order (profile, academic,
//!    homepage), against every link already attached to an identity;
//! 2. its normalized display name against the names already indexed.
//!
//! The first hit wins. A candidate whose links point at two different
//! identities joins the first one; identities are never merged with each other.
//!
//! Name equality is a deliberate fallback: two different people reported
//! under the same display name collapse into one identity.

use crate::models::{LocationConfidence, NormalizedCandidate, ResolvedIdentity};
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// Score boost applied each time another candidate corroborates an identity.
pub const CORROBORATION_BONUS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MergeKey {
    Link(String),
    Name(String),
}

/// Accumulate-only working set of resolved identities.
#[derive(Debug)]
pub struct Resolver {
    identities: Vec<ResolvedIdentity>,
    index: HashMap<MergeKey, usize>,
    relevance_threshold: f64,
}

impl Resolver {
    pub fn new(relevance_threshold: f64) -> Self {
        Self {
            identities: Vec::new(),
            index: HashMap::new(),
            relevance_threshold: relevance_threshold.clamp(0.0, 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Fold one candidate into the working set and return the identity it
    /// landed in. Never fails.
    pub fn merge(&mut self, candidate: NormalizedCandidate) -> &ResolvedIdentity {
        let slot = match self.lookup(&candidate) {
            Some(slot) => {
                trace!(name = %candidate.display_name, slot, "Merging into existing identity");
                absorb(&mut self.identities[slot], candidate, self.relevance_threshold);
                slot
            }
            None => {
                let slot = self.identities.len();
                trace!(name = %candidate.display_name, slot, "New identity");
                self.identities.push(seed(candidate, self.relevance_threshold));
                slot
            }
        };
        self.reindex(slot);
        &self.identities[slot]
    }

    /// All identities in order of first appearance.
    pub fn finalize(&self) -> Vec<ResolvedIdentity> {
        self.identities.clone()
    }

    fn lookup(&self, candidate: &NormalizedCandidate) -> Option<usize> {
        candidate
            .links
            .iter()
            .find_map(|link| self.index.get(&MergeKey::Link(link.url.clone())).copied())
            .or_else(|| {
                self.index
                    .get(&MergeKey::Name(candidate.name_key.clone()))
                    .copied()
            })
    }

    /// Register the identity's links and canonical name. Keys already owned by
    /// another identity keep pointing there.
    fn reindex(&mut self, slot: usize) {
        let identity = &self.identities[slot];
        let keys = identity
            .identity_links
            .iter()
            .map(|link| MergeKey::Link(link.url.clone()))
            .chain(std::iter::once(MergeKey::Name(
                identity.canonical_name.trim().to_lowercase(),
            )))
            .collect::<Vec<_>>();
        for key in keys {
            self.index.entry(key).or_insert(slot);
        }
    }
}

/// Keep identities located at or above `threshold`, plus every identity with
/// no reported location at all. Unknown locations are kept on purpose: the
/// roster favours recall over precision.
pub fn filter_by_location(
    identities: &[ResolvedIdentity],
    threshold: LocationConfidence,
) -> Vec<ResolvedIdentity> {
    identities
        .iter()
        .filter(|identity| identity.location_unknown() || identity.best_location_confidence >= threshold)
        .cloned()
        .collect()
}

fn seed(candidate: NormalizedCandidate, threshold: f64) -> ResolvedIdentity {
    let evidence_score = candidate.score.clamp(0.0, 1.0);
    ResolvedIdentity {
        canonical_name: candidate.display_name,
        title: candidate.title,
        company: candidate.company,
        identity_links: candidate.links.into_iter().collect(),
        best_location: candidate.location,
        best_location_confidence: candidate.location_confidence,
        evidence_score,
        is_relevant: candidate.is_research_like || evidence_score >= threshold,
        sources: BTreeSet::from([candidate.provenance]),
    }
}

fn absorb(identity: &mut ResolvedIdentity, candidate: NormalizedCandidate, threshold: f64) {
    if identity.canonical_name.trim().is_empty() {
        identity.canonical_name = candidate.display_name;
    }
    if identity.title.is_none() {
        identity.title = candidate.title;
    }
    if identity.company.is_none() {
        identity.company = candidate.company;
    }

    identity.identity_links.extend(candidate.links);

    if candidate.location.is_some() {
        let upgrade = identity.best_location.is_none()
            || candidate.location_confidence > identity.best_location_confidence;
        if upgrade {
            identity.best_location = candidate.location;
            identity.best_location_confidence = candidate.location_confidence;
        }
    }

    identity.evidence_score =
        (identity.evidence_score.max(candidate.score) + CORROBORATION_BONUS).min(1.0);

    identity.is_relevant = identity.is_relevant
        || candidate.is_research_like
        || identity.evidence_score >= threshold;

    identity.sources.insert(candidate.provenance);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::models::{IdentityHints, IdentityLink, LinkKind, Provenance, RawCandidate, SourceKind};
    use crate::normalize::{compute_score, normalize};

    fn config() -> RosterConfig {
        RosterConfig::default()
    }

    fn candidate(
        name: &str,
        profile: Option<&str>,
        location: &str,
        evidence: &str,
        source: SourceKind,
    ) -> NormalizedCandidate {
        let raw = RawCandidate {
            display_name: name.to_string(),
            title: None,
            company: None,
            identity_hints: IdentityHints {
                profile_url: profile.map(str::to_string),
                ..IdentityHints::default()
            },
            location_text: Some(location.to_string()),
            evidence_text: Some(evidence.to_string()),
            provenance: Provenance::new(source, format!("https://{source}.example/{name}")),
        };
        normalize(raw, &config()).unwrap()
    }

    fn jane_a() -> NormalizedCandidate {
        candidate(
            "Jane Doe",
            Some("gh.example/jane"),
            "Palo Alto, CA",
            "research scientist working on ml",
            SourceKind::GitHub,
        )
    }

    fn jane_b() -> NormalizedCandidate {
        candidate("jane doe", Some("gh.example/jane"), "", "", SourceKind::HackerNews)
    }

    fn resolver() -> Resolver {
        Resolver::new(config().relevance.threshold)
    }

    #[test]
    fn test_new_identity_seeded_from_candidate() {
        let mut r = resolver();
        let a = jane_a();
        let expected_score = a.score;
        let identity = r.merge(a).clone();

        assert_eq!(r.len(), 1);
        assert_eq!(identity.canonical_name, "Jane Doe");
        assert_eq!(identity.evidence_score, expected_score);
        assert_eq!(identity.best_location.as_deref(), Some("Palo Alto, CA"));
        assert_eq!(identity.best_location_confidence, LocationConfidence::High);
        assert_eq!(identity.sources.len(), 1);
        assert!(identity.is_relevant);
    }

    #[test]
    fn test_jane_doe_scenario_merges_on_profile_url() {
        let keywords = config().relevance.keywords;
        let mut r = resolver();
        r.merge(jane_a());
        r.merge(jane_b());

        let all = r.finalize();
        assert_eq!(all.len(), 1);
        let jane = &all[0];
        assert_eq!(jane.canonical_name, "Jane Doe");
        assert_eq!(jane.best_location_confidence, LocationConfidence::High);
        assert!(jane.is_relevant);
        let expected = (compute_score("research scientist working on ml", &keywords) + 0.1).min(1.0);
        assert!((jane.evidence_score - expected).abs() < 1e-9);
        assert_eq!(jane.sources.len(), 2);
    }

    #[test]
    fn test_same_name_different_profiles_merge_on_name() {
        // Two distinct people may share a display name; they still collapse.
        let mut r = resolver();
        r.merge(candidate("John Smith", Some("gh.example/jsmith1"), "", "", SourceKind::GitHub));
        r.merge(candidate("John Smith", Some("gh.example/jsmith2"), "", "", SourceKind::HackerNews));

        let all = r.finalize();
        assert_eq!(all.len(), 1);
        let links = all[0]
            .identity_links
            .iter()
            .map(|l| l.url.as_str())
            .collect::<Vec<_>>();
        assert_eq!(links, vec!["gh.example/jsmith1", "gh.example/jsmith2"]);
    }

    #[test]
    fn test_different_names_without_shared_links_stay_apart() {
        let mut r = resolver();
        r.merge(candidate("Ada Lovelace", Some("gh.example/ada"), "", "", SourceKind::GitHub));
        r.merge(candidate("Alan Turing", Some("gh.example/alan"), "", "", SourceKind::GitHub));
        r.merge(candidate("Grace Hopper", None, "", "", SourceKind::NewsApi));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_never_merges_on_location_or_evidence() {
        let mut r = resolver();
        r.merge(candidate("Ada", None, "Palo Alto", "ml research", SourceKind::GitHub));
        r.merge(candidate("Alan", None, "Palo Alto", "ml research", SourceKind::GitHub));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_link_learned_from_merge_is_authoritative() {
        let mut r = resolver();
        let mut first = candidate("Jane Doe", Some("gh.example/jane"), "", "", SourceKind::GitHub);
        first.links.push(IdentityLink {
            kind: LinkKind::Homepage,
            url: "https://jane.dev".to_string(),
        });
        r.merge(first);

        let mut other = candidate("J. Doe", None, "", "", SourceKind::OpenAlex);
        other.links = vec![IdentityLink {
            kind: LinkKind::Homepage,
            url: "https://jane.dev".to_string(),
        }];
        r.merge(other);

        assert_eq!(r.len(), 1);
        assert_eq!(r.finalize()[0].canonical_name, "Jane Doe");
    }

    #[test]
    fn test_profile_link_outranks_academic_link() {
        let mut r = resolver();
        let mut scholar = candidate("Y. Researcher", None, "", "", SourceKind::OpenAlex);
        scholar.links.push(IdentityLink {
            kind: LinkKind::Academic,
            url: "https://orcid.org/1".to_string(),
        });
        r.merge(scholar);
        r.merge(candidate("X Developer", Some("gh.example/x"), "", "", SourceKind::GitHub));

        let mut both = candidate("Z Person", Some("gh.example/x"), "", "", SourceKind::TeamPage);
        both.links.push(IdentityLink {
            kind: LinkKind::Academic,
            url: "https://orcid.org/1".to_string(),
        });
        let landed = r.merge(both).clone();

        assert_eq!(r.len(), 2);
        assert_eq!(landed.canonical_name, "X Developer");
        assert!(landed.identity_links.iter().any(|l| l.kind == LinkKind::Academic));

        let all = r.finalize();
        assert_eq!(all[0].canonical_name, "Y. Researcher");
        assert_eq!(all[0].sources.len(), 1);
        assert_eq!(all[1].sources.len(), 2);
    }

    #[test]
    fn test_merge_twice_only_changes_score() {
        let mut once = resolver();
        let single = once.merge(jane_a()).clone();

        let mut twice = resolver();
        twice.merge(jane_a());
        let double = twice.merge(jane_a()).clone();

        assert_eq!(twice.len(), 1);
        assert_eq!(double.canonical_name, single.canonical_name);
        assert_eq!(double.identity_links, single.identity_links);
        assert_eq!(double.sources, single.sources);
        assert_eq!(double.best_location, single.best_location);
        assert_eq!(double.is_relevant, single.is_relevant);
        let expected = (single.evidence_score + CORROBORATION_BONUS).min(1.0);
        assert!((double.evidence_score - expected).abs() < 1e-9);
        assert!(double.evidence_score > single.evidence_score || single.evidence_score == 1.0);
    }

    #[test]
    fn test_arrival_order_only_affects_canonical_name() {
        let mut ab = resolver();
        ab.merge(jane_a());
        let ab = ab.merge(jane_b()).clone();

        let mut ba = resolver();
        ba.merge(jane_b());
        let ba = ba.merge(jane_a()).clone();

        assert_eq!(ab.identity_links, ba.identity_links);
        assert_eq!(ab.sources, ba.sources);
        assert_eq!(ab.is_relevant, ba.is_relevant);
        assert!((ab.evidence_score - ba.evidence_score).abs() < 1e-9);

        // First seen wins.
        assert_eq!(ab.canonical_name, "Jane Doe");
        assert_eq!(ba.canonical_name, "jane doe");
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let mut r = resolver();
        for i in 0..50 {
            let identity = r.merge(candidate(
                "Jane Doe",
                Some("gh.example/jane"),
                "",
                if i % 2 == 0 { "research scientist nlp" } else { "" },
                SourceKind::GitHub,
            ));
            assert!((0.0..=1.0).contains(&identity.evidence_score));
        }
        assert_eq!(r.finalize()[0].evidence_score, 1.0);
    }

    #[test]
    fn test_location_confidence_never_downgrades() {
        let mut r = resolver();
        r.merge(candidate("Jane Doe", Some("gh.example/jane"), "Palo Alto", "", SourceKind::GitHub));
        let identity = r
            .merge(candidate("Jane Doe", Some("gh.example/jane"), "Berlin", "", SourceKind::OpenAlex))
            .clone();
        assert_eq!(identity.best_location_confidence, LocationConfidence::High);
        assert_eq!(identity.best_location.as_deref(), Some("Palo Alto"));
    }

    #[test]
    fn test_location_upgrades_on_strictly_higher_tier() {
        let mut r = resolver();
        r.merge(candidate("Jane Doe", None, "Berlin", "", SourceKind::GitHub));
        let same_tier = r.merge(candidate("Jane Doe", None, "Paris", "", SourceKind::GitHub)).clone();
        assert_eq!(same_tier.best_location.as_deref(), Some("Berlin"));

        let upgraded = r
            .merge(candidate("Jane Doe", None, "Seattle, WA", "", SourceKind::GitHub))
            .clone();
        assert_eq!(upgraded.best_location.as_deref(), Some("Seattle, WA"));
        assert_eq!(upgraded.best_location_confidence, LocationConfidence::Medium);
    }

    #[test]
    fn test_first_observed_location_fills_unknown() {
        let mut r = resolver();
        r.merge(candidate("Jane Doe", None, "", "", SourceKind::GitHub));
        let identity = r.merge(candidate("Jane Doe", None, "Berlin", "", SourceKind::GitHub)).clone();
        assert_eq!(identity.best_location.as_deref(), Some("Berlin"));
        assert_eq!(identity.best_location_confidence, LocationConfidence::Low);
    }

    #[test]
    fn test_relevance_is_sticky() {
        let mut r = resolver();
        r.merge(jane_a());
        for _ in 0..3 {
            let identity = r.merge(jane_b());
            assert!(identity.is_relevant);
        }
    }

    #[test]
    fn test_relevance_from_score_threshold() {
        let mut r = Resolver::new(0.5);
        // Starts at 0.2 and rises by 0.1 per corroboration.
        let mut last = false;
        for _ in 0..5 {
            last = r.merge(candidate("Nobody", None, "", "sales", SourceKind::NewsApi)).is_relevant;
        }
        assert!(last);

        let mut r = Resolver::new(0.5);
        let first = r.merge(candidate("Nobody", None, "", "sales", SourceKind::NewsApi)).clone();
        assert!(!first.is_relevant);
    }

    #[test]
    fn test_title_and_company_filled_when_absent() {
        let mut r = resolver();
        r.merge(jane_b());
        let mut with_title = jane_a();
        with_title.title = Some("Research Scientist".to_string());
        with_title.company = Some("Acme AI".to_string());
        let identity = r.merge(with_title).clone();
        assert_eq!(identity.title.as_deref(), Some("Research Scientist"));
        assert_eq!(identity.company.as_deref(), Some("Acme AI"));

        let mut later = jane_a();
        later.title = Some("Intern".to_string());
        let identity = r.merge(later).clone();
        assert_eq!(identity.title.as_deref(), Some("Research Scientist"));
    }

    #[test]
    fn test_sources_are_deduplicated() {
        let mut r = resolver();
        r.merge(jane_a());
        r.merge(jane_a());
        r.merge(jane_b());
        assert_eq!(r.finalize()[0].sources.len(), 2);
    }

    #[test]
    fn test_finalize_preserves_first_appearance_order() {
        let mut r = resolver();
        r.merge(candidate("Charlie", None, "", "", SourceKind::GitHub));
        r.merge(candidate("Alice", None, "", "", SourceKind::GitHub));
        r.merge(candidate("charlie", None, "", "", SourceKind::NewsApi));
        r.merge(candidate("Bob", None, "", "", SourceKind::GitHub));

        let names = r
            .finalize()
            .into_iter()
            .map(|i| i.canonical_name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[test]
    fn test_filter_by_location_keeps_unknowns() {
        let mut r = resolver();
        r.merge(candidate("High", None, "Palo Alto", "", SourceKind::GitHub));
        r.merge(candidate("Medium", None, "Seattle", "", SourceKind::GitHub));
        r.merge(candidate("Low", None, "Berlin", "", SourceKind::GitHub));
        r.merge(candidate("Unknown", None, "", "", SourceKind::GitHub));
        let all = r.finalize();

        let names = |ids: Vec<ResolvedIdentity>| ids.into_iter().map(|i| i.canonical_name).collect::<Vec<_>>();
        assert_eq!(
            names(filter_by_location(&all, LocationConfidence::High)),
            vec!["High", "Unknown"]
        );
        assert_eq!(
            names(filter_by_location(&all, LocationConfidence::Medium)),
            vec!["High", "Medium", "Unknown"]
        );
        assert_eq!(filter_by_location(&all, LocationConfidence::Low).len(), 4);
    }

    #[test]
    fn test_empty_resolver() {
        let r = resolver();
        assert!(r.is_empty());
        assert!(r.finalize().is_empty());
        assert!(filter_by_location(&[], LocationConfidence::High).is_empty());
    }
}
