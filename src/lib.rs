// ============================================================================
// candlestick - Library
// ============================================================================
// Expose le moteur de rendu et les couches autour pour le binaire et les tests
// ============================================================================

pub mod api;    // API CryptoCompare
pub mod app;    // État du navigateur de coins
pub mod chart;  // Moteur de rendu (tendance, grille, stats)
pub mod cli;    // Flags de la ligne de commande
pub mod models; // Structures de données
pub mod ui;     // Interface terminal
