// ============================================================================
// Structure : ChartOptions
// ============================================================================
// Options d'affichage du graphique (taille, bornes de prix, légende, ...)
//
// CONCEPT RUST : Option<T> pour les surcharges facultatives
// - None : la valeur est calculée depuis les données
// - Some(v) : l'utilisateur impose la valeur
// ============================================================================

use serde::{Deserialize, Serialize};

/// Largeur par défaut du graphique (colonnes)
pub const DEFAULT_WIDTH: usize = 120;

/// Hauteur par défaut du graphique (lignes)
pub const DEFAULT_HEIGHT: usize = 30;

/// Fuseau horaire utilisé pour les labels de l'axe du temps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeZoneMode {
    /// Heure locale de la machine (comportement par défaut du CLI)
    #[default]
    Local,
    /// UTC : rendu indépendant de la machine (tests, logs)
    Utc,
}

/// Options de rendu du graphique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    /// Largeur totale de la grille (axes compris)
    pub width: usize,

    /// Hauteur totale de la grille (axes compris)
    pub height: usize,

    /// Borne basse imposée de l'échelle des prix
    #[serde(rename = "min")]
    pub min_price: Option<f64>,

    /// Borne haute imposée de l'échelle des prix
    #[serde(rename = "max")]
    pub max_price: Option<f64>,

    /// Écart minimal entre min et max (recentré sur le milieu)
    pub min_range: Option<f64>,

    /// Masque les tableaux de statistiques
    pub disable_legend: bool,

    /// Paire affichée dans le titre et les tableaux (ex: "BTC-USD")
    pub pair_label: Option<String>,

    /// Dessine l'axe des prix (gauche) et l'axe du temps (bas)
    pub show_axes: bool,

    /// Fuseau des labels de temps
    pub time_zone: TimeZoneMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_price: None,
            max_price: None,
            min_range: None,
            disable_legend: false,
            pair_label: None,
            show_axes: true,
            time_zone: TimeZoneMode::Local,
        }
    }
}

impl ChartOptions {
    /// Options par défaut avec une taille donnée
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Ajoute le label de la paire (builder)
    pub fn pair(mut self, label: impl Into<String>) -> Self {
        self.pair_label = Some(label.into());
        self
    }

    /// Impose les bornes de prix (builder)
    pub fn price_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    /// Active/désactive les axes (builder)
    pub fn axes(mut self, show: bool) -> Self {
        self.show_axes = show;
        self
    }

    /// Active/désactive la légende (builder)
    pub fn legend(mut self, show: bool) -> Self {
        self.disable_legend = !show;
        self
    }

    /// Choisit le fuseau des labels de temps (builder)
    pub fn time_zone(mut self, time_zone: TimeZoneMode) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Vérifie la cohérence des options
    ///
    /// Retourne un message décrivant le premier problème trouvé.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "chart size must be positive (got {}x{})",
                self.width, self.height
            ));
        }

        for (name, value) in [("min", self.min_price), ("max", self.max_price)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{} price must be finite (got {})", name, v));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(format!("min price {} is greater than max price {}", min, max));
            }
        }

        if let Some(range) = self.min_range {
            if !range.is_finite() || range < 0.0 {
                return Err(format!("min range must be a non-negative number (got {})", range));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ChartOptions::default();
        assert_eq!(options.width, 120);
        assert_eq!(options.height, 30);
        assert!(options.show_axes);
        assert!(!options.disable_legend);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_options() {
        assert!(ChartOptions::with_size(0, 10).validate().is_err());
        assert!(ChartOptions::default().price_bounds(20.0, 10.0).validate().is_err());

        let mut options = ChartOptions::default();
        options.min_range = Some(-1.0);
        assert!(options.validate().is_err());

        options.min_range = Some(f64::NAN);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_deserialize_cli_shape() {
        let json = r#"{ "width": 80, "max": 20.5, "minRange": 3, "disableLegend": true, "pairLabel": "ETH-USD" }"#;
        let options: ChartOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.width, 80);
        assert_eq!(options.height, DEFAULT_HEIGHT);
        assert_eq!(options.max_price, Some(20.5));
        assert_eq!(options.min_range, Some(3.0));
        assert!(options.disable_legend);
        assert_eq!(options.pair_label.as_deref(), Some("ETH-USD"));
    }
}
