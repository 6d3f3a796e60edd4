//! Company "team" / "people" page scraper.
//!
//! Each `--team-page-url` is fetched and every element matching the card
//! selector is treated as one person: the first name-selector match is the
//! display name, the first title-selector match with different text is the
//! title, and the card's full text is the evidence.

use super::{SourceContext, TeamSelectors};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{IdentityHints, Provenance, RawCandidate, SourceKind};
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

#[instrument(level = "info", skip_all, fields(pages = ctx.team_pages.len()))]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    if ctx.team_pages.is_empty() {
        info!("No team pages configured");
        return Ok(Vec::new());
    }
    let selectors = CompiledSelectors::compile(&ctx.team_selectors)?;

    let mut candidates = Vec::new();
    for page in &ctx.team_pages {
        let url = match Url::parse(page) {
            Ok(url) => url,
            Err(e) => {
                warn!(page = %page, error = %e, "Skipping malformed team page URL");
                continue;
            }
        };
        match http.get_text(&Request::get(url.clone())).await {
            Ok(html) => {
                let found = parse_team_page(&html, &url, &selectors, &ctx.company);
                info!(%url, count = found.len(), "Parsed team page");
                candidates.extend(found);
            }
            Err(e) => warn!(%url, error = %e, "Team page fetch failed"),
        }
    }
    Ok(candidates.into_iter().take(ctx.max_results).collect())
}

pub struct CompiledSelectors {
    card: Selector,
    name: Selector,
    title: Selector,
    link: Selector,
}

impl CompiledSelectors {
    pub fn compile(selectors: &TeamSelectors) -> Result<Self, ConnectorError> {
        let parse = |s: &str| Selector::parse(s).map_err(|_| ConnectorError::Selector(s.to_string()));
        Ok(Self {
            card: parse(&selectors.card)?,
            name: parse(&selectors.name)?,
            title: parse(&selectors.title)?,
            link: parse("a[href]")?,
        })
    }
}

pub fn parse_team_page(
    html: &str,
    page_url: &Url,
    selectors: &CompiledSelectors,
    company: &str,
) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .filter_map(|card| {
            let name = first_text(card, &selectors.name)?;
            let title = card
                .select(&selectors.title)
                .map(element_text)
                .find(|t| !t.is_empty() && *t != name);
            let homepage = card
                .select(&selectors.link)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| page_url.join(href).ok())
                .find(|link| link.host_str() != page_url.host_str())
                .map(|link| link.to_string());

            Some(RawCandidate {
                display_name: name,
                title,
                company: Some(company.to_string()),
                identity_hints: IdentityHints {
                    homepage_url: homepage,
                    ..IdentityHints::default()
                },
                location_text: None,
                evidence_text: Some(element_text(card)),
                provenance: Provenance::new(SourceKind::TeamPage, page_url.to_string()),
            })
        })
        .collect()
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .map(element_text)
        .find(|t| !t.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
