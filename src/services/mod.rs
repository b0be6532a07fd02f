pub mod fixture_resolver;
pub mod ingestor;
pub mod normalizer;
pub mod odds_source;

pub use ingestor::OddsIngestor;
pub use odds_source::OddsSource;
