// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod candle;  // Chandelles OHLCV + timeframe API
pub mod coin;    // Résumés de coins pour les listes
pub mod options; // Options de rendu du graphique

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use candlestick::models::candle::Candle;
// On peut faire : use candlestick::models::Candle;
pub use candle::{Candle, Timeframe};
pub use coin::CoinSummary;
pub use options::{ChartOptions, TimeZoneMode, DEFAULT_HEIGHT, DEFAULT_WIDTH};
