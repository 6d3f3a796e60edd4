//! Hunter.io domain search.
//!
//! Returns the people Hunter has associated with the company's email domain.
//! Email addresses are not carried into candidates.

use super::{join_text, SourceContext};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{IdentityHints, Provenance, RawCandidate, SourceKind};
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

const DOMAIN_SEARCH_URL: &str = "https://api.hunter.io/v2/domain-search";

#[derive(Debug, Deserialize)]
pub struct DomainSearchResponse {
    pub data: DomainData,
}

#[derive(Debug, Deserialize)]
pub struct DomainData {
    pub domain: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub emails: Vec<Person>,
}

#[derive(Debug, Deserialize)]
pub struct Person {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub linkedin: Option<String>,
}

pub fn domain_search_url(domain: &str, api_key: &str, limit: usize) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(DOMAIN_SEARCH_URL)?;
    url.query_pairs_mut()
        .append_pair("domain", domain)
        .append_pair("type", "personal")
        .append_pair("limit", &limit.min(100).to_string())
        .append_pair("api_key", api_key);
    Ok(url)
}

#[instrument(level = "info", skip_all)]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    let key = ctx
        .hunter_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConnectorError::MissingCredential("HUNTER_API_KEY"))?;
    let domain = ctx
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ConnectorError::MissingInput("--domain"))?;

    let response: DomainSearchResponse = http
        .get_json(&Request::get(domain_search_url(domain, key, ctx.max_results)?))
        .await?;
    info!(
        domain,
        organization = response.data.organization.as_deref().unwrap_or("?"),
        count = response.data.emails.len(),
        "Hunter domain search returned"
    );
    Ok(data_to_candidates(response.data, domain))
}

pub fn data_to_candidates(data: DomainData, domain: &str) -> Vec<RawCandidate> {
    let domain = data.domain.as_deref().unwrap_or(domain);
    let reference = format!("https://hunter.io/search/{domain}");
    data.emails
        .into_iter()
        .map(|person| {
            let name = join_text([person.first_name.as_deref(), person.last_name.as_deref()])
                .unwrap_or_default();
            RawCandidate {
                display_name: name,
                title: person.position.clone(),
                company: data.organization.clone(),
                identity_hints: IdentityHints {
                    profile_url: person.linkedin.as_deref().map(normalize_linkedin),
                    ..IdentityHints::default()
                },
                location_text: None,
                evidence_text: join_text([person.position.as_deref(), person.department.as_deref()]),
                provenance: Provenance::new(SourceKind::Hunter, reference.clone()),
            }
        })
        .collect()
}

/// Hunter returns LinkedIn profiles either as full URLs or as bare handles.
fn normalize_linkedin(value: &str) -> String {
    let value = value.trim().trim_end_matches('/');
    if value.starts_with("http://") || value.starts_with("https://") {
        value.replacen("http://", "https://", 1)
    } else {
        format!("https://www.linkedin.com/in/{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;

    const DOMAIN_JSON: &str = r#"{
        "data": {
            "domain": "acme.ai",
            "organization": "Acme AI",
            "emails": [
                {
                    "value": "jane@acme.ai",
                    "first_name": "Jane",
                    "last_name": "Doe",
                    "position": "Research Scientist",
                    "department": "research",
                    "linkedin": "janedoe"
                },
                {
                    "value": "ops@acme.ai",
                    "first_name": null,
                    "last_name": null,
                    "position": null,
                    "department": "management",
                    "linkedin": null
                }
            ]
        }
    }"#;

    #[test]
    fn test_data_to_candidates() {
        let response: DomainSearchResponse = serde_json::from_str(DOMAIN_JSON).unwrap();
        let candidates = data_to_candidates(response.data, "acme.ai");
        assert_eq!(candidates.len(), 2);

        let jane = &candidates[0];
        assert_eq!(jane.display_name, "Jane Doe");
        assert_eq!(jane.title.as_deref(), Some("Research Scientist"));
        assert_eq!(jane.company.as_deref(), Some("Acme AI"));
        assert_eq!(
            jane.identity_hints.profile_url.as_deref(),
            Some("https://www.linkedin.com/in/janedoe")
        );
        assert_eq!(jane.provenance.reference, "https://hunter.io/search/acme.ai");
        assert!(!format!("{jane:?}").contains("jane@acme.ai"));

        // Nameless entries are left for the normalizer to drop.
        assert_eq!(candidates[1].display_name, "");
    }

    #[test]
    fn test_normalize_linkedin() {
        assert_eq!(
            normalize_linkedin("http://www.linkedin.com/in/janedoe/"),
            "https://www.linkedin.com/in/janedoe"
        );
        assert_eq!(normalize_linkedin("janedoe"), "https://www.linkedin.com/in/janedoe");
    }

    #[tokio::test]
    async fn test_collect_requires_domain() {
        let mut ctx = SourceContext::new("Acme", &RosterConfig::default());
        ctx.hunter_api_key = Some("k".to_string());
        let http = crate::http::tests::stub_http(&[]);
        let err = collect(&http, &ctx).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MissingInput("--domain")));
    }
}
