// ============================================================================
// Module : ui
// ============================================================================
// Interface terminal du navigateur de coins (--list, --toplist)
// ============================================================================

pub mod coin_browser; // Liste paginée (ratatui)
pub mod events;       // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use coin_browser::{format_plain_list, render, run_browser};
pub use events::{Event, EventHandler};
