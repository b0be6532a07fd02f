use anyhow::{bail, Result};
use chrono::Utc;

use crate::config::Config;
use crate::db::{create_pool, get_odds_for_fixture, init_database_with_pool, seed_demo_fixtures};
use crate::services::{OddsIngestor, OddsSource};

/// One ingestion run. Fails (non-zero exit) when any row could not be stored.
pub async fn ingest(config: &Config, force_fallback: bool) -> Result<()> {
    let pool = create_pool(&config.database_url).await?;

    let source = OddsSource::from_config(config, force_fallback);
    let batch = source.load().await;

    let report = OddsIngestor::new(&pool).run(&batch).await;
    pool.close().await;

    if report.used_fallback {
        println!("Inserted {} odds rows (fallback data).", report.inserted);
    } else {
        println!("Inserted {} odds rows.", report.inserted);
    }

    if !report.is_clean() {
        println!("{} rows failed:", report.failures.len());
        for failure in &report.failures {
            println!(
                "   • event {} ({}): {}",
                failure.event_id,
                failure.source.as_deref().unwrap_or("fixture lookup"),
                failure.reason
            );
        }
        bail!("{} odds rows could not be stored", report.failures.len());
    }

    Ok(())
}

pub async fn init_db(config: &Config) -> Result<()> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn seed(config: &Config) -> Result<()> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;
    let fixtures = seed_demo_fixtures(&pool, Utc::now()).await?;
    pool.close().await;

    println!("Seeded {} demo fixtures.", fixtures);
    Ok(())
}

pub async fn show_odds(config: &Config, fixture_id: i64) -> Result<()> {
    let pool = create_pool(&config.database_url).await?;
    let rows = get_odds_for_fixture(&pool, fixture_id).await?;
    pool.close().await;

    if rows.is_empty() {
        println!("No odds stored for fixture {}.", fixture_id);
        return Ok(());
    }

    let fmt = |p: Option<f64>| p.map_or("-".to_string(), |v| format!("{:.2}", v));

    println!("Odds for fixture {} ({} rows):\n", fixture_id, rows.len());
    for row in rows {
        let p = &row.prices;
        println!("{} [{}]", row.source, row.captured_at);
        println!(
            "   1X2: {} | {} | {}",
            fmt(p.ml_home),
            fmt(p.ml_draw),
            fmt(p.ml_away)
        );
        println!("   BTTS: yes {} | no {}", fmt(p.btts_yes), fmt(p.btts_no));
        println!(
            "   O/U 2.5: over {} | under {}\n",
            fmt(p.ou_2_5_over),
            fmt(p.ou_2_5_under)
        );
    }

    Ok(())
}
