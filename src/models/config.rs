//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Source;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Source endpoint settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Filter policy settings
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.filter.horizon_days == 0 {
            return Err(AppError::validation("filter.horizon_days must be > 0"));
        }
        for (name, url) in [
            ("sources.campus_url", &self.sources.campus_url),
            ("sources.partner_url", &self.sources.partner_url),
            ("sources.council_url", &self.sources.council_url),
            ("sources.alumni.listing_url", &self.sources.alumni.listing_url),
            ("sources.sports.listing_url", &self.sources.sports.listing_url),
        ] {
            if url.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between sequential detail-page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Endpoints for the five event sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Structured campus events API (JSON)
    #[serde(default = "defaults::campus_url")]
    pub campus_url: String,

    /// Partner institute events API (JSON)
    #[serde(default = "defaults::partner_url")]
    pub partner_url: String,

    /// Student council listing page (HTML)
    #[serde(default = "defaults::council_url")]
    pub council_url: String,

    /// Alumni club site (HTML listing + detail pages)
    #[serde(default = "defaults::alumni_site")]
    pub alumni: ClubSiteConfig,

    /// Sports club site (HTML listing + detail pages)
    #[serde(default = "defaults::sports_site")]
    pub sports: ClubSiteConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            campus_url: defaults::campus_url(),
            partner_url: defaults::partner_url(),
            council_url: defaults::council_url(),
            alumni: defaults::alumni_site(),
            sports: defaults::sports_site(),
        }
    }
}

/// A club site scraped in two phases (listing scan, then detail fetches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubSiteConfig {
    /// Listing page URL
    pub listing_url: String,
}

/// Filter policy settings.
///
/// The always-food source list and the paid-event exclusion are product
/// defaults, kept configurable because source reliability may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Forward horizon for the time-window filter, in days
    #[serde(default = "defaults::horizon_days")]
    pub horizon_days: u32,

    /// Sources assumed to always include refreshments
    #[serde(default = "defaults::food_sources")]
    pub food_sources: Vec<Source>,

    /// Keep paid events instead of dropping them during extraction
    #[serde(default)]
    pub include_paid: bool,

    /// Keywords appended to the built-in food lexicon
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            horizon_days: defaults::horizon_days(),
            food_sources: defaults::food_sources(),
            include_paid: false,
            extra_keywords: Vec::new(),
        }
    }
}

mod defaults {
    use super::ClubSiteConfig;
    use crate::models::Source;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; eventring/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }

    // Source defaults
    pub fn campus_url() -> String {
        "https://events.campus.example/api/v1/events?format=json&limit=500".into()
    }
    pub fn partner_url() -> String {
        "https://www.partner-institute.example/api/events".into()
    }
    pub fn council_url() -> String {
        "https://council.campus.example/events".into()
    }
    pub fn alumni_site() -> ClubSiteConfig {
        ClubSiteConfig {
            listing_url: "https://alumni.campus.example/events".into(),
        }
    }
    pub fn sports_site() -> ClubSiteConfig {
        ClubSiteConfig {
            listing_url: "https://sports.campus.example/events".into(),
        }
    }

    // Filter defaults
    pub fn horizon_days() -> u32 {
        14
    }
    pub fn food_sources() -> Vec<Source> {
        vec![Source::Alumni, Source::Sports]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_horizon() {
        let mut config = Config::default();
        config.filter.horizon_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_endpoint() {
        let mut config = Config::default();
        config.sources.partner_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn filter_defaults_match_policy() {
        let filter = FilterConfig::default();
        assert_eq!(filter.horizon_days, 14);
        assert!(!filter.include_paid);
        assert_eq!(filter.food_sources, vec![Source::Alumni, Source::Sports]);
    }

    #[test]
    fn toml_round_trip_overrides() {
        let toml = r#"
            [http]
            timeout_secs = 5

            [filter]
            horizon_days = 30
            food_sources = ["council"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.filter.horizon_days, 30);
        assert_eq!(config.filter.food_sources, vec![Source::Council]);
        assert!(!config.http.user_agent.is_empty());
    }
}
