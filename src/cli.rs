//! Command-line interface definitions for Research Roster.
//!
//! Credentials are read from the environment when not passed as flags.

use crate::config::RosterConfig;
use crate::models::{LocationConfidence, SourceKind};
use crate::scrapers::SourceContext;
use clap::Parser;

/// Command-line arguments for the Research Roster application.
///
/// # Examples
///
/// ```sh
/// # All sources, default Bay Area location tiers
/// research_roster --company "Acme AI" --domain acme.ai -o ./out
///
/// # Only GitHub and OpenAlex, custom tiers, strict location filter
/// research_roster --company "Acme AI" --sources github,openalex \
///     -c ./roster.yaml --min-location high -o ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Company whose people should be collected
    #[arg(long)]
    pub company: String,

    /// Company email domain (used by Hunter.io)
    #[arg(long)]
    pub domain: Option<String>,

    /// GitHub organization login (defaults to the company name without spaces)
    #[arg(long)]
    pub github_org: Option<String>,

    /// Institution name to search on OpenAlex (defaults to the company name)
    #[arg(long)]
    pub openalex_institution: Option<String>,

    /// Company team/people page to scrape (repeatable)
    #[arg(long = "team-page-url")]
    pub team_page_urls: Vec<String>,

    /// Output directory for the CSV, JSON and text files
    #[arg(short, long)]
    pub output_dir: String,

    /// Optional path to a YAML config with classifier tables and connector tuning
    #[arg(short, long)]
    pub config: Option<String>,

    /// Minimum location confidence kept in the exported roster
    #[arg(long, default_value = "medium")]
    pub min_location: LocationConfidence,

    /// Comma-separated list of sources to query (default: all)
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<SourceKind>,

    /// Number of connectors allowed to run at once
    #[arg(long, default_value_t = 3)]
    pub concurrency: usize,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Hunter.io API key
    #[arg(long, env = "HUNTER_API_KEY", hide_env_values = true)]
    pub hunter_api_key: Option<String>,
}

impl Cli {
    /// Sources to run, in the order they are declared in [`SourceKind::ALL`].
    pub fn selected_sources(&self) -> Vec<SourceKind> {
        if self.sources.is_empty() {
            return SourceKind::ALL.to_vec();
        }
        SourceKind::ALL
            .into_iter()
            .filter(|kind| self.sources.contains(kind))
            .collect()
    }

    pub fn source_context(&self, config: &RosterConfig) -> SourceContext {
        SourceContext {
            domain: self.domain.clone(),
            github_org: self.github_org.clone(),
            openalex_institution: self.openalex_institution.clone(),
            team_pages: self.team_page_urls.clone(),
            github_token: self.github_token.clone(),
            newsapi_key: self.newsapi_key.clone(),
            hunter_api_key: self.hunter_api_key.clone(),
            ..SourceContext::new(self.company.trim(), config)
        }
    }
}
