pub mod seed;
pub use seed::seed_demo_fixtures;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::str::FromStr;

use crate::models::*;
use crate::utils::parse_timestamp;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Create the teams / fixtures / odds tables if they do not exist yet.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            team_id INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fixtures (
            fixture_id   INTEGER PRIMARY KEY,
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NOT NULL,
            match_date   TEXT NOT NULL,
            FOREIGN KEY (home_team_id) REFERENCES teams (team_id),
            FOREIGN KEY (away_team_id) REFERENCES teams (team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // odds: append-only, one row per bookmaker per fixture per run
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS odds (
            odds_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            fixture_id   INTEGER NOT NULL,
            source       TEXT NOT NULL,
            captured_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            ml_home      REAL,
            ml_draw      REAL,
            ml_away      REAL,
            btts_yes     REAL,
            btts_no      REAL,
            ou_2_5_over  REAL,
            ou_2_5_under REAL,
            meta         TEXT NOT NULL,
            FOREIGN KEY (fixture_id) REFERENCES fixtures (fixture_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_name ON teams(LOWER(name))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_fixtures_teams ON fixtures(home_team_id, away_team_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_odds_fixture ON odds(fixture_id, captured_at)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

// Team / fixture operations

pub async fn insert_team(pool: &SqlitePool, team: &Team) -> Result<()> {
    sqlx::query(
        "INSERT INTO teams (team_id, name) VALUES (?, ?) \
         ON CONFLICT(team_id) DO UPDATE SET name = excluded.name",
    )
    .bind(team.team_id)
    .bind(&team.name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_fixture(pool: &SqlitePool, fixture: &Fixture) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO fixtures (fixture_id, home_team_id, away_team_id, match_date)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(fixture_id) DO UPDATE SET
            home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id,
            match_date   = excluded.match_date
        "#,
    )
    .bind(fixture.fixture_id)
    .bind(fixture.home_team_id)
    .bind(fixture.away_team_id)
    .bind(fixture.match_date.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// A fixture whose team names matched, with its kickoff.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCandidate {
    pub fixture_id: i64,
    pub match_date: DateTime<Utc>,
}

/// All fixtures for `home` vs `away` (case-insensitive), ordered by fixture id.
/// Rows whose `match_date` cannot be read are skipped with a warning.
pub async fn find_fixture_candidates(
    pool: &SqlitePool,
    home: &str,
    away: &str,
) -> Result<Vec<FixtureCandidate>> {
    let rows = sqlx::query(
        r#"
        SELECT f.fixture_id, f.match_date
        FROM fixtures f
        JOIN teams ht ON ht.team_id = f.home_team_id
        JOIN teams at ON at.team_id = f.away_team_id
        WHERE LOWER(ht.name) = LOWER(?)
          AND LOWER(at.name) = LOWER(?)
        ORDER BY f.fixture_id
        "#,
    )
    .bind(home)
    .bind(away)
    .fetch_all(pool)
    .await?;

    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        let fixture_id: i64 = row.get("fixture_id");
        let raw_date: String = row.get("match_date");
        match parse_timestamp(&raw_date) {
            Some(match_date) => candidates.push(FixtureCandidate { fixture_id, match_date }),
            None => tracing::warn!(
                "Fixture {} has unreadable match_date '{}', ignoring it",
                fixture_id,
                raw_date
            ),
        }
    }
    Ok(candidates)
}

// Odds operations

/// Append one normalized row. Returns the new `odds_id`.
pub async fn insert_odds(pool: &SqlitePool, row: &NewOddsRow) -> Result<i64> {
    let p = &row.prices;
    let result = sqlx::query(
        r#"
        INSERT INTO odds
          (fixture_id, source, ml_home, ml_draw, ml_away,
           btts_yes, btts_no, ou_2_5_over, ou_2_5_under, meta)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(row.fixture_id)
    .bind(&row.source)
    .bind(p.ml_home)
    .bind(p.ml_draw)
    .bind(p.ml_away)
    .bind(p.btts_yes)
    .bind(p.btts_no)
    .bind(p.ou_2_5_over)
    .bind(p.ou_2_5_under)
    .bind(serde_json::to_string(&row.meta)?)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_odds_for_fixture(pool: &SqlitePool, fixture_id: i64) -> Result<Vec<StoredOdds>> {
    let rows = sqlx::query(
        "SELECT * FROM odds WHERE fixture_id = ? ORDER BY captured_at DESC, odds_id DESC",
    )
    .bind(fixture_id)
    .fetch_all(pool)
    .await?;

    let mut odds = Vec::new();
    for row in rows {
        odds.push(StoredOdds {
            odds_id: row.get("odds_id"),
            fixture_id: row.get("fixture_id"),
            source: row.get("source"),
            captured_at: row.get("captured_at"),
            prices: NormalizedPrices {
                ml_home: row.get("ml_home"),
                ml_draw: row.get("ml_draw"),
                ml_away: row.get("ml_away"),
                btts_yes: row.get("btts_yes"),
                btts_no: row.get("btts_no"),
                ou_2_5_over: row.get("ou_2_5_over"),
                ou_2_5_under: row.get("ou_2_5_under"),
            },
            meta: serde_json::from_str(&row.get::<String, _>("meta"))?,
        });
    }
    Ok(odds)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[tokio::test]
    async fn test_candidates_match_case_insensitively_in_id_order() {
        let pool = memory_pool().await;
        let t = Utc.with_ymd_and_hms(2026, 11, 1, 15, 0, 0).unwrap();
        add_fixture(&pool, 20, (1, "Newcastle United"), (2, "Arsenal"), t).await;
        add_fixture(&pool, 10, (1, "Newcastle United"), (2, "Arsenal"), t).await;
        add_fixture(&pool, 30, (2, "Arsenal"), (1, "Newcastle United"), t).await;

        let found = find_fixture_candidates(&pool, "newcastle united", "ARSENAL").await.unwrap();
        let ids: Vec<i64> = found.iter().map(|c| c.fixture_id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(found[0].match_date, t);
    }

    #[tokio::test]
    async fn test_candidates_accept_sqlite_dates_and_skip_unreadable_ones() {
        let pool = memory_pool().await;
        let t = Utc.with_ymd_and_hms(2026, 11, 1, 15, 0, 0).unwrap();
        add_fixture(&pool, 1, (1, "Chelsea"), (2, "Fulham"), t).await;
        for (fixture_id, match_date) in [(2, "2026-12-01 15:00:00"), (3, "sometime in spring")] {
            sqlx::query("INSERT INTO fixtures (fixture_id, home_team_id, away_team_id, match_date) VALUES (?, 1, 2, ?)")
                .bind(fixture_id)
                .bind(match_date)
                .execute(&pool)
                .await
                .unwrap();
        }

        let found = find_fixture_candidates(&pool, "Chelsea", "Fulham").await.unwrap();
        assert_eq!(
            found,
            vec![
                FixtureCandidate { fixture_id: 1, match_date: t },
                FixtureCandidate {
                    fixture_id: 2,
                    match_date: Utc.with_ymd_and_hms(2026, 12, 1, 15, 0, 0).unwrap(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_odds_assigns_capture_time_and_keeps_nulls() {
        let pool = memory_pool().await;
        let t = Utc.with_ymd_and_hms(2026, 11, 1, 15, 0, 0).unwrap();
        add_fixture(&pool, 1, (1, "Home"), (2, "Away"), t).await;

        let row = NewOddsRow {
            fixture_id: 1,
            source: "Mock Book".into(),
            prices: NormalizedPrices { ml_draw: Some(3.4), ..Default::default() },
            meta: json!({ "home_team": "Home", "away_team": "Away", "markets": [] }),
        };
        let first = insert_odds(&pool, &row).await.unwrap();
        let second = insert_odds(&pool, &row).await.unwrap();
        assert!(second > first);

        let stored = get_odds_for_fixture(&pool, 1).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].prices.ml_draw, Some(3.4));
        assert_eq!(stored[0].prices.ml_home, None);
        assert!(!stored[0].captured_at.is_empty());
        assert_eq!(stored[0].meta["home_team"], json!("Home"));
    }

    #[tokio::test]
    async fn test_insert_odds_rejects_unknown_fixture() {
        let pool = memory_pool().await;
        let row = NewOddsRow {
            fixture_id: 999,
            source: "x".into(),
            prices: NormalizedPrices::default(),
            meta: json!({}),
        };
        assert!(insert_odds(&pool, &row).await.is_err());
    }
}
