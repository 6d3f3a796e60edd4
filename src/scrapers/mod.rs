//! Source connectors that turn public sources into [`RawCandidate`] records.
//!
//! Each connector module exposes:
//! - `collect(http, ctx)`: performs the HTTP calls and returns candidates
//! - one or more pure `parse_*` functions that map a response body to candidates
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | GitHub | [`github`] | REST API | Org members, then one profile lookup per member |
//! | OpenAlex | [`openalex`] | REST API | Institution lookup, then authors |
//! | Hacker News | [`hackernews`] | Algolia search API | Story authors mentioning the company |
//! | NewsAPI | [`newsapi`] | REST API | Requires `NEWSAPI_KEY` |
//! | Hunter.io | [`hunter`] | Domain search API | Requires `HUNTER_API_KEY` and `--domain` |
//! | Team pages | [`team_page`] | HTML scraping | CSS selectors from config |
//!
//! Connector failures never reach the resolver: [`collect_source`] logs them
//! and yields an empty batch.

use crate::config::RosterConfig;
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http};
use crate::models::{RawCandidate, SourceKind};
use tracing::{error, info, instrument};

pub mod github;
pub mod hackernews;
pub mod hunter;
pub mod newsapi;
pub mod openalex;
pub mod team_page;

/// CSS selectors used by the team page scraper.
#[derive(Debug, Clone)]
pub struct TeamSelectors {
    pub card: String,
    pub name: String,
    pub title: String,
}

/// Everything a connector needs to know about the target company.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub company: String,
    pub domain: Option<String>,
    pub github_org: Option<String>,
    pub openalex_institution: Option<String>,
    pub team_pages: Vec<String>,
    pub github_token: Option<String>,
    pub newsapi_key: Option<String>,
    pub hunter_api_key: Option<String>,
    pub max_results: usize,
    pub team_selectors: TeamSelectors,
}

impl SourceContext {
    /// A context for `company` with no credentials and selectors from `config`.
    pub fn new(company: impl Into<String>, config: &RosterConfig) -> Self {
        let connectors = &config.connectors;
        Self {
            company: company.into(),
            domain: None,
            github_org: None,
            openalex_institution: None,
            team_pages: Vec::new(),
            github_token: None,
            newsapi_key: None,
            hunter_api_key: None,
            max_results: connectors.max_results.max(1),
            team_selectors: TeamSelectors {
                card: connectors.team_card_selector.clone(),
                name: connectors.team_name_selector.clone(),
                title: connectors.team_title_selector.clone(),
            },
        }
    }
}

/// Run one connector, degrading any failure to an empty batch.
#[instrument(level = "info", skip_all, fields(source = %kind))]
pub async fn collect_source<F: FetchAsync>(
    kind: SourceKind,
    ctx: &SourceContext,
    http: &Http<F>,
) -> Vec<RawCandidate> {
    let result: Result<Vec<RawCandidate>, ConnectorError> = match kind {
        SourceKind::GitHub => github::collect(http, ctx).await,
        SourceKind::OpenAlex => openalex::collect(http, ctx).await,
        SourceKind::HackerNews => hackernews::collect(http, ctx).await,
        SourceKind::NewsApi => newsapi::collect(http, ctx).await,
        SourceKind::Hunter => hunter::collect(http, ctx).await,
        SourceKind::TeamPage => team_page::collect(http, ctx).await,
    };

    match result {
        Ok(candidates) => {
            info!(count = candidates.len(), "Collected candidates");
            candidates
        }
        Err(e) => {
            error!(error = %e, "Connector failed; contributing no candidates");
            Vec::new()
        }
    }
}

/// Join non-empty text fragments with `" "`; `None` when nothing remains.
pub(crate) fn join_text<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let joined = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}
