// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les redimensionnements du pager
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : une fonction helper par action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements du pager
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Terminal redimensionné (colonnes, lignes)
    Resize(u16, u16),

    /// Rien reçu pendant le timeout
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un timeout de 250ms
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus `timeout`
    /// - Sans événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.timeout)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(cols, rows) => Ok(Event::Resize(cols, rows)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Extrait le KeyCode d'un événement clavier
fn key_code(event: &Event) -> Option<KeyCode> {
    if let Event::Key(key) = event {
        Some(key.code)
    } else {
        None
    }
}

/// 'q' ou Échap : quitter
pub fn is_quit_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
    )
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    )
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    )
}

/// Flèche droite, 'l' ou 'n' : page suivante
pub fn is_next_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::PageDown)
    )
}

/// Flèche gauche, 'h' ou 'p' : page précédente
pub fn is_previous_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::PageUp)
    )
}

// ============================================================================
// Tests
// ============================================================================
