// ============================================================================
// Structure : CoinSummary
// ============================================================================
// Représente une crypto-monnaie dans les listes (--list, --toplist)
//
// CONCEPT RUST : Option<T> pour les champs que toutes les sources n'ont pas
// - /all/coinlist : symbole + nom seulement
// - /top/mktcapfull : symbole + nom + prix + market cap + variation 24h
// ============================================================================

use serde::{Deserialize, Serialize};

/// Résumé d'un coin pour le navigateur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    /// Symbole (ex: "BTC")
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Prix actuel en USD
    pub price: Option<f64>,

    /// Capitalisation en USD
    pub market_cap: Option<f64>,

    /// Variation sur 24h en pourcentage
    pub change_24h: Option<f64>,
}

impl CoinSummary {
    /// Crée un coin sans données de marché
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price: None,
            market_cap: None,
            change_24h: None,
        }
    }

    /// Ajoute les données de marché (builder)
    pub fn with_market(mut self, price: f64, market_cap: f64, change_24h: Option<f64>) -> Self {
        self.price = Some(price);
        self.market_cap = Some(market_cap);
        self.change_24h = change_24h;
        self
    }

    /// Vrai si la variation 24h est positive ou nulle
    pub fn is_positive(&self) -> bool {
        self.change_24h.map(|c| c >= 0.0).unwrap_or(true)
    }

    /// Formatte le coin sur une ligne (mode --plain)
    pub fn display(&self) -> String {
        match self.price {
            Some(price) => {
                let change_str = match self.change_24h {
                    Some(change) => {
                        let arrow = if change >= 0.0 { "↑" } else { "↓" };
                        format!("  {} {:.2}%", arrow, change.abs())
                    }
                    None => String::new(),
                };
                format!("{} - {} - ${:.2}{}", self.symbol.to_uppercase(), self.name, price, change_str)
            }
            None => format!("{} - {}", self.symbol.to_uppercase(), self.name),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_display_without_market() {
        let coin = CoinSummary::new("eth", "Ethereum");
        assert_eq!(coin.display(), "ETH - Ethereum");
        assert!(coin.is_positive());
    }

    #[test]
    fn test_coin_display_with_market() {
        let coin = CoinSummary::new("BTC", "Bitcoin").with_market(45000.0, 8e11, Some(-2.5));
        assert_eq!(coin.display(), "BTC - Bitcoin - $45000.00  ↓ 2.50%");
        assert!(!coin.is_positive());
    }
}
