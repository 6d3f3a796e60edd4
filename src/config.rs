//! Run configuration: classifier tables and connector tuning.
//!
//! All fields are defaulted so an empty (or missing) YAML file yields a usable
//! configuration targeting the San Francisco Bay Area. Point `--config` at a
//! file like the one below to retarget the location tiers:
//!
//! ```yaml
//! location:
//!   high: ["zurich", "zürich"]
//!   medium: ["switzerland", "basel", "geneva"]
//! relevance:
//!   threshold: 0.4
//! connectors:
//!   request_delay_ms: 1000
//! ```
//!
//! Keywords match as plain substrings, so very short entries ("ml", "usa")
//! also hit inside unrelated words ("html", "jerusalem").

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterConfig {
    pub location: LocationTiers,
    pub relevance: RelevanceConfig,
    pub connectors: ConnectorConfig,
}

/// Keyword tiers for location confidence. Matching is substring-based on
/// lower-cased text; "high" is checked before "medium".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationTiers {
    pub high: Vec<String>,
    pub medium: Vec<String>,
}

impl Default for LocationTiers {
    fn default() -> Self {
        Self {
            high: to_strings(&[
                "san francisco",
                "palo alto",
                "mountain view",
                "menlo park",
                "sunnyvale",
                "berkeley",
                "stanford",
                "bay area",
                "redwood city",
                "cupertino",
            ]),
            medium: to_strings(&[
                "california",
                "san jose",
                "oakland",
                "los angeles",
                "san diego",
                "seattle",
                "new york",
                "boston",
                "united states",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub keywords: Vec<String>,
    /// An identity whose evidence score reaches this value is relevant.
    pub threshold: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(&[
                "research",
                "scientist",
                "machine learning",
                "ml engineer",
                "ml research",
                "nlp",
                "deep learning",
                "artificial intelligence",
                "phd",
                "professor",
                "computer vision",
                "reinforcement learning",
                "neural",
                "alignment",
                "interpretability",
                "language model",
            ]),
            threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Fixed pause between successive HTTP calls within one connector.
    pub request_delay_ms: u64,
    pub max_retries: usize,
    /// Upper bound on candidates requested from any single source.
    pub max_results: usize,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Selector for one person card on a company team page.
    pub team_card_selector: String,
    pub team_name_selector: String,
    pub team_title_selector: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            max_retries: 3,
            max_results: 50,
            user_agent: concat!("research_roster/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 20,
            team_card_selector: ".team-member, .person, [class*=\"team\"] li".to_string(),
            team_name_selector: "h2, h3, h4, .name".to_string(),
            team_title_selector: ".title, .role, .position, p".to_string(),
        }
    }
}

impl RosterConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RosterConfig = if yaml.trim().is_empty() {
            RosterConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config.lowercased())
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using built-in classifier tables");
            return Ok(RosterConfig::default());
        };
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            path,
            high = config.location.high.len(),
            medium = config.location.medium.len(),
            keywords = config.relevance.keywords.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relevance.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyRelevanceKeywords);
        }
        let t = self.relevance.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ThresholdOutOfRange(t));
        }
        Ok(())
    }

    /// Keyword tables are matched against lower-cased text, so store them lower-cased.
    fn lowercased(mut self) -> Self {
        let clean = |words: Vec<String>| {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
        };
        self.location.high = clean(self.location.high);
        self.location.medium = clean(self.location.medium);
        self.relevance.keywords = clean(self.relevance.keywords);
        self
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
