//! One ingestion run: resolve each event to a fixture, then append one
//! normalized row per bookmaker.
//!
//! Events and bookmakers are handled strictly in input order and every row is
//! committed on its own. A failed insert is recorded in the report and the run
//! moves on; rows already written stay written.

use serde_json::json;
use sqlx::SqlitePool;

use crate::db::insert_odds;
use crate::models::{Bookmaker, Event, NewOddsRow};
use crate::services::fixture_resolver::FixtureResolver;
use crate::services::normalizer::normalize_markets;
use crate::services::odds_source::OddsBatch;

#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub event_id: String,
    /// `None` when the event failed before any bookmaker was reached.
    pub source: Option<String>,
    pub reason: String,
}

/// Why an event produced no rows without counting as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTeams,
    NoBookmakers,
    NoFixture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub event_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: Vec<SkippedEvent>,
    pub failures: Vec<RowFailure>,
    pub used_fallback: bool,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn skip(&mut self, event: &Event, reason: SkipReason) {
        self.skipped.push(SkippedEvent {
            event_id: event.id.clone(),
            reason,
        });
    }
}

pub struct OddsIngestor<'a> {
    pool: &'a SqlitePool,
    resolver: FixtureResolver<'a>,
}

impl<'a> OddsIngestor<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            resolver: FixtureResolver::new(pool),
        }
    }

    pub async fn run(&self, batch: &OddsBatch) -> IngestReport {
        let mut report = IngestReport {
            used_fallback: batch.used_fallback,
            ..Default::default()
        };
        let default_source = batch.default_source();

        for event in &batch.events {
            self.ingest_event(event, default_source, &mut report).await;
        }

        tracing::info!(
            "Ingestion finished: {} inserted, {} skipped, {} failed",
            report.inserted,
            report.skipped.len(),
            report.failures.len()
        );
        report
    }

    async fn ingest_event(&self, event: &Event, default_source: &str, report: &mut IngestReport) {
        let Some((home, away)) = event.teams() else {
            tracing::info!("Event {} is missing team names, skipping", event.id);
            report.skip(event, SkipReason::MissingTeams);
            return;
        };
        if event.bookmakers.is_empty() {
            tracing::info!("Event {} ({} vs {}) has no bookmakers, skipping", event.id, home, away);
            report.skip(event, SkipReason::NoBookmakers);
            return;
        }

        let kickoff = event.commence_time.as_deref();
        let fixture_id = match self.resolver.resolve(home, away, kickoff).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::info!(
                    "No fixture match for {} vs {} @ {}, skipping odds insert.",
                    home,
                    away,
                    kickoff.unwrap_or("-")
                );
                report.skip(event, SkipReason::NoFixture);
                return;
            }
            Err(e) => {
                tracing::error!("Fixture lookup failed for event {}: {}", event.id, e);
                report.failures.push(RowFailure {
                    event_id: event.id.clone(),
                    source: None,
                    reason: e.to_string(),
                });
                return;
            }
        };

        for bookmaker in &event.bookmakers {
            let row = build_row(fixture_id, bookmaker, home, away, default_source);
            let inserted = insert_odds(self.pool, &row).await;
            match inserted {
                Ok(odds_id) => {
                    tracing::debug!("Stored odds {} for fixture {} from {}", odds_id, fixture_id, row.source);
                    report.inserted += 1;
                }
                Err(e) => {
                    tracing::error!("Odds insert failed for fixture {} from {}: {}", fixture_id, row.source, e);
                    report.failures.push(RowFailure {
                        event_id: event.id.clone(),
                        source: Some(row.source),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Normalize one bookmaker into a row. `meta` keeps the bookmaker payload as
/// received plus the event's team names.
pub fn build_row(
    fixture_id: i64,
    bookmaker: &Bookmaker,
    home: &str,
    away: &str,
    default_source: &str,
) -> NewOddsRow {
    NewOddsRow {
        fixture_id,
        source: bookmaker.source_label(default_source),
        prices: normalize_markets(&bookmaker.markets, home, away),
        meta: json!({
            "key": bookmaker.key,
            "title": bookmaker.title,
            "last_update": bookmaker.last_update,
            "markets": bookmaker.markets,
            "home_team": home,
            "away_team": away,
        }),
    }
}
