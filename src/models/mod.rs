use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::utils::{names_equal, parse_price};

// ── Odds feed shapes ──────────────────────────────────────────────────────────
//
// Every field defaults, and an explicit `null` counts as missing, so a partly
// shaped event still decodes; validation happens later in the ingestor.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub commence_time: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bookmakers: Vec<Bookmaker>,
}

impl Event {
    /// Home and away names, if both are present and non-blank.
    pub fn teams(&self) -> Option<(&str, &str)> {
        let home = self.home_team.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let away = self.away_team.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((home, away))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bookmaker {
    pub key: Option<String>,
    pub title: Option<String>,
    pub last_update: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub markets: Vec<Market>,
}

impl Bookmaker {
    /// Title, then key, then the batch default.
    pub fn source_label(&self, default: &str) -> String {
        [self.title.as_deref(), self.key.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Market {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub outcomes: Vec<Outcome>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Market {
    pub fn kind(&self) -> MarketKind {
        MarketKind::from_key(&self.key)
    }

    /// Price of the first outcome whose name matches `name`, ignoring case.
    /// A matching outcome with an unusable price yields `None`.
    pub fn price_of(&self, name: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|o| names_equal(&o.name, name))
            .and_then(Outcome::decimal_price)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Outcome {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub price: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Outcome {
    pub fn decimal_price(&self) -> Option<f64> {
        parse_price(&self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketKind {
    HeadToHead,
    BothTeamsToScore,
    Totals,
    Unknown,
}

impl MarketKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "h2h" => MarketKind::HeadToHead,
            "btts" => MarketKind::BothTeamsToScore,
            "totals" => MarketKind::Totals,
            _ => MarketKind::Unknown,
        }
    }
}

// ── Normalized output ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPrices {
    pub ml_home: Option<f64>,
    pub ml_draw: Option<f64>,
    pub ml_away: Option<f64>,
    pub btts_yes: Option<f64>,
    pub btts_no: Option<f64>,
    pub ou_2_5_over: Option<f64>,
    pub ou_2_5_under: Option<f64>,
}

/// One row ready for the `odds` table. `captured_at` is left to the database.
#[derive(Debug, Clone, Serialize)]
pub struct NewOddsRow {
    pub fixture_id: i64,
    pub source: String,
    pub prices: NormalizedPrices,
    pub meta: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOdds {
    pub odds_id: i64,
    pub fixture_id: i64,
    pub source: String,
    pub captured_at: String,
    pub prices: NormalizedPrices,
    pub meta: Value,
}

// ── Fixtures (read-only from the pipeline's point of view) ────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub match_date: DateTime<Utc>,
}
