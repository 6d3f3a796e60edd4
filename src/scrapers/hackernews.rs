//! Hacker News story authors, via the Algolia search API.
//!
//! A handle that posted several matching stories yields one candidate whose
//! evidence is the concatenation of those story titles.

use super::{join_text, SourceContext};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{IdentityHints, Provenance, RawCandidate, SourceKind};
use itertools::Itertools;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub story_text: Option<String>,
}

pub fn search_url(company: &str, hits_per_page: usize) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(SEARCH_URL)?;
    url.query_pairs_mut()
        .append_pair("query", &format!("\"{company}\""))
        .append_pair("tags", "story")
        .append_pair("hitsPerPage", &hits_per_page.min(1000).to_string());
    Ok(url)
}

#[instrument(level = "info", skip_all)]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    let response: SearchResponse = http
        .get_json(&Request::get(search_url(&ctx.company, ctx.max_results)?))
        .await?;
    Ok(hits_to_candidates(response.hits))
}

/// One candidate per distinct author, in order of first hit.
pub fn hits_to_candidates(hits: Vec<Hit>) -> Vec<RawCandidate> {
    let authors = hits
        .iter()
        .filter_map(|h| h.author.as_deref())
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unique()
        .map(str::to_string)
        .collect::<Vec<_>>();

    authors
        .into_iter()
        .filter_map(|author| {
            let theirs = hits
                .iter()
                .filter(|h| h.author.as_deref().map(str::trim) == Some(author.as_str()))
                .collect::<Vec<_>>();
            let first = theirs.first()?;
            let evidence = join_text(
                theirs
                    .iter()
                    .flat_map(|h| [h.title.as_deref(), h.story_text.as_deref()]),
            );
            let reference = format!("https://news.ycombinator.com/item?id={}", first.object_id);
            Some(RawCandidate {
                identity_hints: IdentityHints {
                    profile_url: Some(format!("https://news.ycombinator.com/user?id={author}")),
                    ..IdentityHints::default()
                },
                display_name: author,
                title: None,
                company: None,
                location_text: None,
                evidence_text: evidence,
                provenance: Provenance::new(SourceKind::HackerNews, reference),
            })
        })
        .collect()
}
