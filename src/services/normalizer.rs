//! Maps a bookmaker's market list onto the fixed seven price columns.

use crate::models::{Market, MarketKind, NormalizedPrices};

const TOTALS_OVER: &str = "over 2.5";
const TOTALS_UNDER: &str = "under 2.5";

/// Normalize one bookmaker's markets for an event between `home_team` and `away_team`.
///
/// Missing outcomes and unusable prices leave the field `None`. Unknown market
/// keys contribute nothing. When a market key repeats, the later one wins.
pub fn normalize_markets(markets: &[Market], home_team: &str, away_team: &str) -> NormalizedPrices {
    let mut prices = NormalizedPrices::default();

    for market in markets {
        match market.kind() {
            MarketKind::HeadToHead => {
                prices.ml_home = market.price_of("home").or_else(|| market.price_of(home_team));
                prices.ml_away = market.price_of("away").or_else(|| market.price_of(away_team));
                prices.ml_draw = market.price_of("draw");
            }
            MarketKind::BothTeamsToScore => {
                prices.btts_yes = market.price_of("yes");
                prices.btts_no = market.price_of("no");
            }
            MarketKind::Totals => {
                prices.ou_2_5_over = market.price_of(TOTALS_OVER);
                prices.ou_2_5_under = market.price_of(TOTALS_UNDER);
            }
            MarketKind::Unknown => {}
        }
    }

    prices
}
