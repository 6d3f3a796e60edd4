//! News article bylines from NewsAPI.
//!
//! Searches for articles mentioning the company alongside research terms and
//! turns each byline author into a candidate. Bylines carry no identity link,
//! so these candidates merge on name only.

use super::{join_text, SourceContext};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{Provenance, RawCandidate, SourceKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

static BYLINE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:,|;|&|\band\b)\s*").expect("static regex"));

#[derive(Debug, Deserialize)]
pub struct EverythingResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
pub struct Article {
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

pub fn everything_url(company: &str, page_size: usize) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(EVERYTHING_URL)?;
    url.query_pairs_mut()
        .append_pair(
            "q",
            &format!("\"{company}\" AND (researcher OR scientist OR research)"),
        )
        .append_pair("language", "en")
        .append_pair("sortBy", "relevancy")
        .append_pair("pageSize", &page_size.min(100).to_string());
    Ok(url)
}

#[instrument(level = "info", skip_all)]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    let key = ctx
        .newsapi_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConnectorError::MissingCredential("NEWSAPI_KEY"))?;
    let request = Request::get(everything_url(&ctx.company, ctx.max_results)?).header("X-Api-Key", key.trim());
    let response: EverythingResponse = http.get_json(&request).await?;
    Ok(articles_to_candidates(response.articles))
}

pub fn articles_to_candidates(articles: Vec<Article>) -> Vec<RawCandidate> {
    articles
        .into_iter()
        .flat_map(|article| {
            let outlet = article
                .source
                .as_ref()
                .and_then(|s| s.name.as_deref())
                .unwrap_or_default()
                .to_lowercase();
            let evidence = join_text([article.title.as_deref(), article.description.as_deref()]);
            split_byline(article.author.as_deref().unwrap_or_default())
                .into_iter()
                .filter(|name| name.to_lowercase() != outlet)
                .map(|name| RawCandidate {
                    evidence_text: evidence.clone(),
                    ..RawCandidate::new(name, Provenance::new(SourceKind::NewsApi, article.url.clone()))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Split a byline into person names, dropping URLs, handles and empty parts.
pub fn split_byline(byline: &str) -> Vec<String> {
    let byline = byline.trim();
    let byline = byline
        .strip_prefix("By ")
        .or_else(|| byline.strip_prefix("by "))
        .unwrap_or(byline);
    BYLINE_SPLIT
        .split(byline)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| !part.contains("://") && !part.starts_with('@') && !part.contains(".com"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::http::tests::stub_http;

    const EVERYTHING_JSON: &str = r#"{
        "status": "ok",
        "articles": [
            {
                "author": "Jane Doe and John Smith",
                "title": "Acme's research lab unveils model",
                "description": "Scientists at Acme...",
                "url": "https://news.example/acme-model",
                "source": {"name": "News Example"}
            },
            {
                "author": "News Example",
                "title": "Acme quarterly results",
                "description": null,
                "url": "https://news.example/acme-q3",
                "source": {"name": "News Example"}
            },
            {
                "author": null,
                "title": "Unattributed",
                "url": "https://news.example/none",
                "source": null
            }
        ]
    }"#;

    #[test]
    fn test_split_byline() {
        assert_eq!(split_byline("By Jane Doe, John Smith"), vec!["Jane Doe", "John Smith"]);
        assert_eq!(split_byline("Ada Lovelace & Alan Turing"), vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(split_byline("Grace Hopper; @hopper"), vec!["Grace Hopper"]);
        assert_eq!(split_byline("https://www.facebook.com/someone"), Vec::<String>::new());
        assert!(split_byline("").is_empty());
    }

    #[test]
    fn test_split_byline_keeps_names_containing_and() {
        assert_eq!(split_byline("Andrea Anderson"), vec!["Andrea Anderson"]);
    }

    #[test]
    fn test_articles_to_candidates() {
        let response: EverythingResponse = serde_json::from_str(EVERYTHING_JSON).unwrap();
        let candidates = articles_to_candidates(response.articles);
        let names = candidates
            .iter()
            .map(|c| c.display_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Jane Doe", "John Smith"]);
        assert_eq!(candidates[0].provenance.reference, "https://news.example/acme-model");
        assert_eq!(
            candidates[0].evidence_text.as_deref(),
            Some("Acme's research lab unveils model Scientists at Acme...")
        );
        assert_eq!(candidates[0].identity_hints, Default::default());
    }

    #[tokio::test]
    async fn test_collect_requires_key() {
        let ctx = SourceContext::new("Acme", &RosterConfig::default());
        let http = stub_http(&[]);
        let err = collect(&http, &ctx).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MissingCredential("NEWSAPI_KEY")));
    }

    #[tokio::test]
    async fn test_collect_with_key() {
        let mut ctx = SourceContext::new("Acme", &RosterConfig::default());
        ctx.newsapi_key = Some("k".to_string());
        let url = everything_url("Acme", ctx.max_results).unwrap();
        let http = stub_http(&[(url.as_str(), EVERYTHING_JSON)]);
        assert_eq!(collect(&http, &ctx).await.unwrap().len(), 2);
    }
}
