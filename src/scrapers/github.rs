//! GitHub organization members.
//!
//! Lists the public members of the company's GitHub organization, then
//! fetches each member's profile for name, bio, blog and location. A token in
//! `GITHUB_TOKEN` raises the rate limit but is not required.

use super::{join_text, SourceContext};
use crate::error::ConnectorError;
use crate::http::{FetchAsync, Http, Request};
use crate::models::{IdentityHints, Provenance, RawCandidate, SourceKind};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

const API_BASE: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
pub struct Member {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    pub html_url: String,
    pub url: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
}

/// The organization login to query: explicit `--github-org`, else the company
/// name lower-cased with spaces removed.
pub fn org_login(ctx: &SourceContext) -> String {
    ctx.github_org
        .clone()
        .unwrap_or_else(|| ctx.company.to_lowercase().split_whitespace().collect())
}

pub fn members_url(org: &str, per_page: usize) -> Result<Url, ConnectorError> {
    let mut url = Url::parse(API_BASE)?.join(&format!("orgs/{}/members", urlencoding::encode(org)))?;
    url.query_pairs_mut()
        .append_pair("per_page", &per_page.min(100).to_string());
    Ok(url)
}

pub fn user_url(login: &str) -> Result<Url, ConnectorError> {
    Ok(Url::parse(API_BASE)?.join(&format!("users/{}", urlencoding::encode(login)))?)
}

#[instrument(level = "info", skip_all)]
pub async fn collect<F: FetchAsync>(
    http: &Http<F>,
    ctx: &SourceContext,
) -> Result<Vec<RawCandidate>, ConnectorError> {
    let org = org_login(ctx);
    let members: Vec<Member> = http
        .get_json(&request(members_url(&org, ctx.max_results)?, ctx))
        .await?;
    info!(%org, count = members.len(), "Listed GitHub org members");

    let mut candidates = Vec::new();
    for member in members.into_iter().take(ctx.max_results) {
        let url = user_url(&member.login)?;
        match http.get_json::<User>(&request(url, ctx)).await {
            Ok(user) => {
                debug!(login = %user.login, "Fetched GitHub profile");
                candidates.push(user_to_candidate(user));
            }
            Err(e) => warn!(login = %member.login, error = %e, "GitHub profile fetch failed"),
        }
    }
    Ok(candidates)
}

fn request(url: Url, ctx: &SourceContext) -> Request {
    let req = Request::get(url)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28");
    match ctx.github_token.as_deref() {
        Some(token) if !token.trim().is_empty() => req.header("Authorization", format!("Bearer {}", token.trim())),
        _ => req,
    }
}

/// Map one GitHub profile onto a candidate; the login stands in for a missing name.
pub fn user_to_candidate(user: User) -> RawCandidate {
    let display_name = user
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&user.login)
        .to_string();
    let reference = user
        .url
        .clone()
        .unwrap_or_else(|| format!("{API_BASE}/users/{}", user.login));
    let company = user
        .company
        .as_deref()
        .map(|c| c.trim().trim_start_matches('@').to_string())
        .filter(|c| !c.is_empty());

    RawCandidate {
        evidence_text: join_text([user.bio.as_deref(), user.company.as_deref()]),
        display_name,
        title: None,
        company,
        identity_hints: IdentityHints {
            profile_url: Some(user.html_url),
            academic_profile_url: None,
            homepage_url: user.blog.map(normalize_blog).filter(|b| !b.is_empty()),
        },
        location_text: user.location,
        provenance: Provenance::new(SourceKind::GitHub, reference),
    }
}

/// GitHub stores blog URLs as typed by the user, often without a scheme.
fn normalize_blog(blog: String) -> String {
    let blog = blog.trim();
    if blog.is_empty() || blog.starts_with("http://") || blog.starts_with("https://") {
        blog.to_string()
    } else {
        format!("https://{blog}")
    }
}
