use std::env;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/odds.db";
pub const DEFAULT_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_SPORT: &str = "soccer_epl";
pub const DEFAULT_REGIONS: &str = "uk,eu,us";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Markets requested from the feed. Only these three are ever normalized.
pub const MARKETS: &str = "h2h,btts,totals";
pub const ODDS_FORMAT: &str = "decimal";
pub const DATE_FORMAT: &str = "iso";

/// Settings for one ingestion run, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// `None` when `ODDS_API_KEY` is unset or blank.
    pub odds_api_key: Option<String>,
    pub api_base_url: String,
    pub sport_key: String,
    pub regions: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: non_blank("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            odds_api_key: non_blank("ODDS_API_KEY"),
            api_base_url: non_blank("ODDS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            sport_key: non_blank("ODDS_SPORT").unwrap_or_else(|| DEFAULT_SPORT.to_string()),
            regions: non_blank("ODDS_REGIONS").unwrap_or_else(|| DEFAULT_REGIONS.to_string()),
            request_timeout: Duration::from_secs(
                non_blank("ODDS_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    /// Full odds endpoint for the configured sport.
    pub fn odds_url(&self) -> String {
        format!(
            "{}/sports/{}/odds",
            self.api_base_url.trim_end_matches('/'),
            self.sport_key
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            odds_api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            sport_key: DEFAULT_SPORT.to_string(),
            regions: DEFAULT_REGIONS.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn non_blank(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
