// ============================================================================
// Module : chart
// ============================================================================
// Moteur de rendu des chandeliers : aucune I/O, aucun état partagé
//
// Flux : trend → { grid, stats → table } → composer
// ============================================================================

pub mod composer; // Assemblage titre + grille + stats
pub mod error;    // Erreurs d'entrée invalide
pub mod grid;     // Grille de caractères (chandelles, tendance, axes)
pub mod stats;    // Statistiques de la série
pub mod table;    // Tableaux box-drawing + légende
pub mod theme;    // Glyphes et couleurs
pub mod trend;    // Régression linéaire

pub use composer::{render_chart, RenderedChart};
pub use error::ChartError;
pub use grid::{Grid, GridRenderer};
pub use stats::{calculate_stats, Stats};
pub use table::StatsRenderer;
pub use theme::{Role, Theme};
pub use trend::{calculate_trend_line, TrendDirection};
