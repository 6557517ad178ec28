// ============================================================================
// Structure : App
// ============================================================================
// État du navigateur de coins (--list, --toplist)
//
// CONCEPTS RUST :
// 1. State Management : tout l'état du pager dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Slices : la page courante est une vue &[CoinSummary], sans copie
//
// PATTERN : "Application State"
// - L'UI lit depuis App
// - Les touches passent par les méthodes de App
// - La sélection reste toujours dans la page courante
// ============================================================================

use crate::models::CoinSummary;

/// Taille de page minimale (terminal très petit)
const MIN_PAGE_SIZE: usize = 1;

/// État principal du navigateur
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Titre affiché en haut (ex: "Available coins")
    pub title: String,

    /// Tous les coins, dans l'ordre d'affichage
    pub coins: Vec<CoinSummary>,

    /// Index de la page courante (0-based)
    pub page: usize,

    /// Nombre de coins par page
    pub page_size: usize,

    /// Index sélectionné DANS la page courante
    pub selected_index: usize,
}

impl App {
    /// Crée le navigateur sur la première page
    pub fn new(title: impl Into<String>, coins: Vec<CoinSummary>, page_size: usize) -> Self {
        Self {
            running: true,
            title: title.into(),
            coins,
            page: 0,
            page_size: page_size.max(MIN_PAGE_SIZE),
            selected_index: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Nombre de pages (au moins 1, même sans coin)
    pub fn page_count(&self) -> usize {
        self.coins.len().div_ceil(self.page_size).max(1)
    }

    /// Coins de la page courante
    ///
    /// CONCEPT RUST : Slice
    /// - Vue sur une partie du Vec, aucune allocation
    pub fn current_page_items(&self) -> &[CoinSummary] {
        let start = (self.page * self.page_size).min(self.coins.len());
        let end = (start + self.page_size).min(self.coins.len());
        &self.coins[start..end]
    }

    /// Index global du premier coin de la page
    pub fn page_offset(&self) -> usize {
        self.page * self.page_size
    }

    /// Page suivante (reste sur la dernière)
    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.selected_index = 0;
        }
    }

    /// Page précédente (reste sur la première)
    pub fn previous_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.selected_index = 0;
        }
    }

    /// Déplace la sélection vers le haut
    ///
    /// CONCEPT RUST : saturating_sub
    /// - Empêche l'underflow : 0 - 1 = 0 au lieu de paniquer
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Déplace la sélection vers le bas (limité à la page)
    pub fn navigate_down(&mut self) {
        let max_index = self.current_page_items().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Coin sélectionné
    pub fn selected_coin(&self) -> Option<&CoinSummary> {
        self.current_page_items().get(self.selected_index)
    }

    /// Change la taille de page (redimensionnement du terminal)
    ///
    /// Le coin sélectionné reste visible : on recalcule sa page.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(MIN_PAGE_SIZE);
        if page_size == self.page_size {
            return;
        }

        let global_index = self.page_offset() + self.selected_index;
        self.page_size = page_size;
        self.page = global_index / page_size;
        self.selected_index = global_index % page_size;
    }

    /// Label "Page 2/5"
    pub fn page_label(&self) -> String {
        format!("Page {}/{}", self.page + 1, self.page_count())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
