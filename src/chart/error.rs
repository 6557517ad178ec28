// ============================================================================
// Erreurs du moteur de rendu
// ============================================================================
// Seules les entrées invalides remontent comme erreur. Les séries dégénérées
// (une seule chandelle, écart de prix nul) et les chandelles mal formées sont
// absorbées par le moteur.
// ============================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("invalid input: the candle series is empty")]
    EmptySeries,

    #[error("invalid input: candle #{index} has a non-finite {field}")]
    NonFiniteValue { index: usize, field: &'static str },

    #[error("invalid chart options: {0}")]
    InvalidOptions(String),
}

impl ChartError {
    /// Toutes les variantes relèvent d'une entrée invalide
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ChartError::EmptySeries
                | ChartError::NonFiniteValue { .. }
                | ChartError::InvalidOptions(_)
        )
    }
}
