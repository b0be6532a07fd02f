//! Resolves an odds event (home, away, kickoff) to an internal fixture id.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::db::{find_fixture_candidates, FixtureCandidate};
use crate::utils::parse_timestamp;

/// Half-width of the kickoff window, inclusive.
pub const KICKOFF_WINDOW_DAYS: i64 = 2;

pub struct FixtureResolver<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FixtureResolver<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the fixture for `home` vs `away`. `Ok(None)` means no match.
    ///
    /// A kickoff that is absent or does not parse disables the time window.
    pub async fn resolve(&self, home: &str, away: &str, kickoff: Option<&str>) -> Result<Option<i64>> {
        let candidates = find_fixture_candidates(self.pool, home, away).await?;
        let kickoff = kickoff.and_then(parse_timestamp);
        Ok(pick_fixture(&candidates, kickoff))
    }
}

/// Choose among name-matched candidates.
///
/// With a kickoff: only fixtures within ±2 days qualify, the closest wins and
/// equal distances go to the lower fixture id. Without one: the lowest id.
pub fn pick_fixture(candidates: &[FixtureCandidate], kickoff: Option<DateTime<Utc>>) -> Option<i64> {
    match kickoff {
        Some(kickoff) => {
            let window = Duration::days(KICKOFF_WINDOW_DAYS).num_milliseconds();
            candidates
                .iter()
                .map(|c| ((c.match_date - kickoff).num_milliseconds().abs(), c.fixture_id))
                .filter(|(distance, _)| *distance <= window)
                .min()
                .map(|(_, fixture_id)| fixture_id)
        }
        None => candidates.iter().map(|c| c.fixture_id).min(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{add_fixture, memory_pool};
    use chrono::TimeZone;

    fn candidate(fixture_id: i64, match_date: DateTime<Utc>) -> FixtureCandidate {
        FixtureCandidate { fixture_id, match_date }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 11, 1, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_closest_candidate_wins() {
        let c = vec![candidate(1, t0() - Duration::days(1)), candidate(2, t0() + Duration::hours(3))];
        assert_eq!(pick_fixture(&c, Some(t0())), Some(2));
    }

    #[test]
    fn test_equidistant_tie_goes_to_lower_id() {
        let c = vec![candidate(9, t0() + Duration::days(1)), candidate(4, t0())];
        let kickoff = Some(t0() + Duration::hours(12));
        for _ in 0..5 {
            assert_eq!(pick_fixture(&c, kickoff), Some(4));
        }
        let reversed: Vec<_> = c.iter().rev().cloned().collect();
        assert_eq!(pick_fixture(&reversed, kickoff), Some(4));
    }

    #[test]
    fn test_window_is_inclusive_at_two_days() {
        let c = vec![candidate(1, t0() + Duration::days(2))];
        assert_eq!(pick_fixture(&c, Some(t0())), Some(1));
        let c = vec![candidate(1, t0() + Duration::days(2) + Duration::seconds(1))];
        assert_eq!(pick_fixture(&c, Some(t0())), None);
    }

    #[test]
    fn test_no_kickoff_picks_lowest_id() {
        let c = vec![candidate(7, t0()), candidate(3, t0() + Duration::days(30))];
        assert_eq!(pick_fixture(&c, None), Some(3));
        assert_eq!(pick_fixture(&[], None), None);
    }

    #[tokio::test]
    async fn test_resolve_against_database() {
        let pool = memory_pool().await;
        add_fixture(&pool, 1, (1, "Newcastle United"), (2, "Arsenal"), t0()).await;
        let resolver = FixtureResolver::new(&pool);

        let kickoff = (t0() + Duration::days(1)).to_rfc3339();
        assert_eq!(resolver.resolve("NEWCASTLE UNITED", "arsenal", Some(&kickoff)).await.unwrap(), Some(1));

        let far = (t0() + Duration::days(3)).to_rfc3339();
        assert_eq!(resolver.resolve("Newcastle United", "Arsenal", Some(&far)).await.unwrap(), None);

        // unparsable kickoff drops the window entirely
        assert_eq!(resolver.resolve("Newcastle United", "Arsenal", Some("soon")).await.unwrap(), Some(1));
        assert_eq!(resolver.resolve("Newcastle United", "Arsenal", None).await.unwrap(), Some(1));

        assert_eq!(resolver.resolve("Arsenal", "Newcastle United", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_tolerates_sqlite_formatted_fixture_dates() {
        let pool = memory_pool().await;
        add_fixture(&pool, 1, (1, "Chelsea"), (2, "Fulham"), t0()).await;
        sqlx::query(
            "INSERT INTO fixtures (fixture_id, home_team_id, away_team_id, match_date) VALUES (2, 1, 2, '2026-12-01 15:00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let resolver = FixtureResolver::new(&pool);

        let kickoff = t0().to_rfc3339();
        assert_eq!(resolver.resolve("Chelsea", "Fulham", Some(&kickoff)).await.unwrap(), Some(1));
        assert_eq!(
            resolver.resolve("Chelsea", "Fulham", Some("2026-12-01T15:00:00Z")).await.unwrap(),
            Some(2)
        );
    }
}
