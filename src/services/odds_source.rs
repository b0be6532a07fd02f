//! Where a run's events come from: The Odds API, or a built-in fallback batch.
//!
//! The provider is chosen once from configuration. A live provider that comes
//! back empty (no key, network trouble, bad response) hands over to the
//! fallback batch; the only thing the ingestor learns about provenance is
//! [`OddsBatch::used_fallback`].

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, DATE_FORMAT, MARKETS, ODDS_FORMAT};
use crate::models::{Bookmaker, Event, Market, Outcome};

/// Source label for live bookmakers with neither title nor key.
pub const LIVE_SOURCE_DEFAULT: &str = "real_api";
/// Source label for fallback bookmakers with neither title nor key.
pub const FALLBACK_SOURCE_DEFAULT: &str = "mockbook";

/// Events for one run plus whether they are the fallback set.
#[derive(Debug, Clone)]
pub struct OddsBatch {
    pub events: Vec<Event>,
    pub used_fallback: bool,
}

impl OddsBatch {
    pub fn default_source(&self) -> &'static str {
        if self.used_fallback {
            FALLBACK_SOURCE_DEFAULT
        } else {
            LIVE_SOURCE_DEFAULT
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ODDS_API_KEY not set")]
    MissingCredential,

    #[error("Odds API: invalid API key (401)")]
    Unauthorized,

    #[error("Odds API HTTP {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Odds API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Odds API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

pub enum OddsSource {
    Live(LiveFeed),
    Fallback,
}

impl OddsSource {
    /// Live when a credential is configured and fallback is not forced.
    pub fn from_config(config: &Config, force_fallback: bool) -> Self {
        if force_fallback || config.odds_api_key.is_none() {
            OddsSource::Fallback
        } else {
            OddsSource::Live(LiveFeed::new(config))
        }
    }

    pub async fn load(&self) -> OddsBatch {
        if let OddsSource::Live(feed) = self {
            let events = feed.fetch_live().await;
            if !events.is_empty() {
                return OddsBatch { events, used_fallback: false };
            }
            tracing::info!("Live feed returned no events, using fallback batch");
        }
        OddsBatch {
            events: fallback_batch(Utc::now()),
            used_fallback: true,
        }
    }
}

pub struct LiveFeed {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    regions: String,
    timeout: std::time::Duration,
}

impl LiveFeed {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.odds_url(),
            api_key: config.odds_api_key.clone(),
            regions: config.regions.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Upcoming events, or an empty list on any failure (logged as a warning).
    /// A missing credential is not a failure and is not logged.
    pub async fn fetch_live(&self) -> Vec<Event> {
        match self.try_fetch().await {
            Ok(events) => {
                tracing::info!("Odds API: {} events received", events.len());
                events
            }
            Err(FetchError::MissingCredential) => Vec::new(),
            Err(e) => {
                tracing::warn!("Odds API failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<Event>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingCredential)?;

        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("apiKey", api_key),
                ("regions", self.regions.as_str()),
                ("markets", MARKETS),
                ("oddsFormat", ODDS_FORMAT),
                ("dateFormat", DATE_FORMAT),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let raw: Vec<Value> = resp.json().await.map_err(FetchError::Decode)?;
        Ok(decode_events(raw))
    }
}

/// Decode each element on its own; an element that does not fit the event
/// shape is logged and dropped without affecting its neighbours.
pub fn decode_events(raw: Vec<Value>) -> Vec<Event> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<Event>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Odds API: skipping undecodable event #{}: {}", i, e);
                None
            }
        })
        .collect()
}

/// One Newcastle United vs Arsenal event from "Mock Book", kicking off three
/// days after `now`, with every supported market priced.
pub fn fallback_batch(now: DateTime<Utc>) -> Vec<Event> {
    let now = now.trunc_subsecs(0);
    let kickoff = now + Duration::days(3);

    let outcome = |name: &str, price: f64| Outcome {
        name: name.to_string(),
        price: Value::from(price),
        ..Default::default()
    };
    let market = |key: &str, outcomes: Vec<Outcome>| Market {
        key: key.to_string(),
        outcomes,
        ..Default::default()
    };

    vec![Event {
        id: "mock-001".to_string(),
        commence_time: Some(kickoff.to_rfc3339()),
        home_team: Some("Newcastle United".to_string()),
        away_team: Some("Arsenal".to_string()),
        bookmakers: vec![Bookmaker {
            key: Some(FALLBACK_SOURCE_DEFAULT.to_string()),
            title: Some("Mock Book".to_string()),
            last_update: Some(now.to_rfc3339()),
            markets: vec![
                market(
                    "h2h",
                    vec![
                        outcome("Newcastle United", 2.20),
                        outcome("Arsenal", 3.10),
                        outcome("Draw", 3.45),
                    ],
                ),
                market("btts", vec![outcome("Yes", 1.70), outcome("No", 2.10)]),
                market("totals", vec![outcome("Over 2.5", 1.95), outcome("Under 2.5", 1.85)]),
            ],
        }],
    }]
}
