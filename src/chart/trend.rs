// ============================================================================
// Ligne de tendance : régression linéaire (moindres carrés)
// ============================================================================
// Ajuste close = slope * i + intercept sur les index 0..n-1
//
// CONCEPTS RUST :
// 1. Iterator fold : toutes les sommes en une seule passe
// 2. f64::EPSILON : garde contre un dénominateur nul (n = 1)
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Candle;

/// Direction de la tendance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// Label affiché dans la légende
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "Up",
            TrendDirection::Down => "Down",
        }
    }
}

/// Coefficients de la droite ajustée
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Calcule la régression sur les prix de clôture
    ///
    /// Retourne None pour une série vide. Si le dénominateur est (quasi) nul,
    /// la droite est plate au niveau de la moyenne des clôtures.
    pub fn from_closes(candles: &[Candle]) -> Option<Self> {
        if candles.is_empty() {
            return None;
        }

        let n = candles.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_xx) = candles.iter().enumerate().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sxx), (i, candle)| {
                let x = i as f64;
                (sx + x, sy + candle.close, sxy + x * candle.close, sxx + x * x)
            },
        );

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < f64::EPSILON {
            return Some(Self {
                slope: 0.0,
                intercept: sum_y / n,
            });
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Some(Self { slope, intercept })
    }

    /// Valeur de la droite à l'index i
    pub fn at(&self, i: usize) -> f64 {
        self.slope * i as f64 + self.intercept
    }
}

/// Calcule la ligne de tendance : une valeur par chandelle
pub fn calculate_trend_line(candles: &[Candle]) -> Vec<f64> {
    match LinearFit::from_closes(candles) {
        Some(fit) => (0..candles.len()).map(|i| fit.at(i)).collect(),
        None => Vec::new(),
    }
}

/// Up si la fin de la tendance est strictement au-dessus du début
pub fn trend_direction(trend: &[f64]) -> TrendDirection {
    match (trend.first(), trend.last()) {
        (Some(start), Some(end)) if end > start => TrendDirection::Up,
        _ => TrendDirection::Down,
    }
}

/// Pente de la tendance en % du point de départ (valeur absolue)
pub fn trend_strength(trend: &[f64]) -> f64 {
    match (trend.first(), trend.last()) {
        (Some(&start), Some(&end)) if start != 0.0 => ((end - start) / start * 100.0).abs(),
        _ => 0.0,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
