use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::db::{insert_fixture, insert_team};
use crate::models::{Fixture, Team};

/// Seed a handful of EPL teams and upcoming fixtures relative to `now`.
///
/// Newcastle United vs Arsenal is placed exactly where the fallback batch puts
/// its kickoff, so a fallback run against a seeded database inserts one row.
pub async fn seed_demo_fixtures(pool: &SqlitePool, now: DateTime<Utc>) -> Result<usize> {
    let teams: [(i64, &str); 8] = [
        (1, "Arsenal"),
        (2, "Liverpool"),
        (3, "Manchester City"),
        (4, "Chelsea"),
        (5, "Aston Villa"),
        (6, "Tottenham Hotspur"),
        (7, "Newcastle United"),
        (8, "Brighton"),
    ];

    for (team_id, name) in teams {
        insert_team(pool, &Team { team_id, name: name.to_string() }).await?;
    }

    // (fixture_id, home, away, days from now)
    let fixtures: [(i64, i64, i64, i64); 4] = [
        (1001, 7, 1, 3),
        (1002, 2, 3, 4),
        (1003, 4, 5, 5),
        (1004, 6, 8, 10),
    ];

    for (fixture_id, home_team_id, away_team_id, days) in fixtures {
        insert_fixture(
            pool,
            &Fixture {
                fixture_id,
                home_team_id,
                away_team_id,
                match_date: now + Duration::days(days),
            },
        )
        .await?;
    }

    tracing::info!("Seeded {} teams and {} fixtures", teams.len(), fixtures.len());
    Ok(fixtures.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::find_fixture_candidates;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let pool = memory_pool().await;
        let now = Utc::now();
        seed_demo_fixtures(&pool, now).await.unwrap();
        seed_demo_fixtures(&pool, now).await.unwrap();

        let found = find_fixture_candidates(&pool, "Newcastle United", "Arsenal").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fixture_id, 1001);
    }
}
