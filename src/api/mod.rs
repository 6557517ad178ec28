// ============================================================================
// Module : api
// ============================================================================
// Clients API pour récupérer les données de marché
// ============================================================================

pub mod cryptocompare; // Client API CryptoCompare

// Re-export du client principal
pub use cryptocompare::{CryptoCompareClient, DEFAULT_TOP_LIMIT};
