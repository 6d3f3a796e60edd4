//! OpenAlex authors affiliated with the company.
//!
//! Resolves the company to an OpenAlex institution, then lists authors whose
//! last known institution is that one. ORCID, when present, is the academic
//! identity link; otherwise the OpenAlex author id is.

use super::{join_text, SourceContext};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{IdentityHints, Provenance, RawCandidate, SourceKind};
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

const API_BASE: &str = "https://api.openalex.org";

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Institution {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    pub id: String,
    pub display_name: Option<String>,
    pub orcid: Option<String>,
    #[serde(default)]
    pub works_count: u64,
    #[serde(default)]
    pub last_known_institutions: Vec<AuthorInstitution>,
    #[serde(default)]
    pub topics: Vec<Named>,
    #[serde(default)]
    pub x_concepts: Vec<Named>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorInstitution {
    pub display_name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub display_name: String,
}

pub fn institutions_url(query: &str) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(API_BASE)?.join("institutions")?;
    url.query_pairs_mut()
        .append_pair("search", query)
        .append_pair("per-page", "1");
    Ok(url)
}

pub fn authors_url(institution_id: &str, per_page: usize) -> Result<Url, ConnectorError> {
    let short_id = institution_id.rsplit('/').next().unwrap_or(institution_id);
    let mut url = Url::parse(API_BASE)?.join("authors")?;
    url.query_pairs_mut()
        .append_pair("filter", &format!("last_known_institutions.id:{short_id}"))
        .append_pair("sort", "works_count:desc")
        .append_pair("per-page", &per_page.min(200).to_string());
    Ok(url)
}

#[instrument(level = "info", skip_all)]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    let query = ctx.openalex_institution.as_deref().unwrap_or(&ctx.company);
    let page: Page<Institution> = http.get_json(&Request::get(institutions_url(query)?)).await?;
    let Some(institution) = page.results.into_iter().next() else {
        info!(%query, "No OpenAlex institution matched");
        return Ok(Vec::new());
    };
    info!(id = %institution.id, name = %institution.display_name, "Matched OpenAlex institution");

    let url = authors_url(&institution.id, ctx.max_results)?;
    let authors: Page<Author> = http.get_json(&Request::get(url)).await?;
    Ok(authors.results.into_iter().map(author_to_candidate).collect())
}

pub fn author_to_candidate(author: Author) -> RawCandidate {
    let topics = author
        .topics
        .iter()
        .chain(author.x_concepts.iter())
        .take(8)
        .map(|t| t.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let summary = format!("published research: {} works", author.works_count);
    let institution = author.last_known_institutions.first();
    let location = institution.and_then(|i| {
        join_text([i.display_name.as_deref(), i.country_code.as_deref()])
    });

    RawCandidate {
        display_name: author.display_name.unwrap_or_default(),
        title: None,
        company: institution.and_then(|i| i.display_name.clone()),
        identity_hints: IdentityHints {
            profile_url: None,
            academic_profile_url: Some(author.orcid.unwrap_or_else(|| author.id.clone())),
            homepage_url: None,
        },
        location_text: location,
        evidence_text: join_text([Some(summary.as_str()), Some(topics.as_str())]),
        provenance: Provenance::new(SourceKind::OpenAlex, author.id),
    }
}
