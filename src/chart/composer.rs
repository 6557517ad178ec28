// ============================================================================
// Assemblage du graphique complet
// ============================================================================
// Pipeline : validation → nettoyage → tendance → grille → stats → texte
//
//   {pair} Price Chart        (titre centré, optionnel)
//
//   <grille width × height>
//
//   <tableaux de stats>       (sauf disable_legend)
//
// Fonction pure : mêmes chandelles + mêmes options = même texte.
// ============================================================================

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::chart::error::ChartError;
use crate::chart::grid::GridRenderer;
use crate::chart::stats::calculate_stats;
use crate::chart::table::StatsRenderer;
use crate::chart::theme::{Role, Theme};
use crate::chart::trend::calculate_trend_line;
use crate::models::{Candle, ChartOptions};

/// Résultat d'un rendu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    /// Texte final (avec codes ANSI si le thème est coloré)
    pub text: String,
    /// Nombre de chandelles dont high/low ont été élargis
    pub clipped_candles: usize,
}

impl fmt::Display for RenderedChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Vérifie options et chandelles avant tout calcul
fn validate(candles: &[Candle], options: &ChartOptions) -> Result<(), ChartError> {
    options.validate().map_err(ChartError::InvalidOptions)?;

    if candles.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    for (index, candle) in candles.iter().enumerate() {
        if let Some(field) = candle.first_non_finite_field() {
            return Err(ChartError::NonFiniteValue { index, field });
        }
    }

    Ok(())
}

/// Titre centré sur la largeur du graphique
fn title_line(pair: &str, width: usize, theme: &Theme) -> String {
    let title = format!("{} Price Chart", pair);
    let padding = width.saturating_sub(title.chars().count()) / 2;
    format!("{}{}", " ".repeat(padding), theme.paint(&title, Role::Title))
}

/// Rend une série de chandelles en texte
///
/// # Erreurs
/// - `InvalidOptions` : taille nulle, min > max, min_range négatif
/// - `EmptySeries` : aucune chandelle
/// - `NonFiniteValue` : NaN ou infini dans une chandelle
///
/// Les chandelles mal formées (high/low n'encadrant pas le corps) ne sont
/// pas des erreurs : elles sont élargies et comptées dans `clipped_candles`.
#[instrument(skip(candles, options, theme), fields(candles = candles.len()))]
pub fn render_chart(candles: &[Candle], options: &ChartOptions, theme: &Theme) -> Result<RenderedChart, ChartError> {
    validate(candles, options)?;

    let clipped_candles = candles.iter().filter(|c| !c.is_well_formed()).count();
    if clipped_candles > 0 {
        warn!(count = clipped_candles, "Malformed candles widened to cover their body");
    }
    let candles: Vec<Candle> = candles.iter().map(Candle::clipped).collect();

    let trend = calculate_trend_line(&candles);
    let grid = GridRenderer::new(&candles, &trend, options, theme).render();

    let mut sections = Vec::with_capacity(3);

    if let Some(pair) = options.pair_label.as_deref() {
        sections.push(title_line(pair, options.width, theme));
    }

    sections.push(grid.render(theme));

    if !options.disable_legend {
        if let Some(stats) = calculate_stats(&candles, &trend) {
            sections.push(StatsRenderer::new(&stats, options.pair_label.as_deref(), theme).render());
        }
    }

    let mut text = sections.join("\n\n");
    text.push('\n');

    debug!(bytes = text.len(), clipped_candles, "Chart composed");

    Ok(RenderedChart { text, clipped_candles })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeZoneMode;

    fn sample_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.2;
                Candle::new(1_700_000_000 + i as i64 * 60, base, base + 1.5, base - 1.5, base + 0.5)
                    .with_volumes(10.0, 1000.0)
            })
            .collect()
    }

    fn plain_options(width: usize, height: usize) -> ChartOptions {
        ChartOptions::with_size(width, height).time_zone(TimeZoneMode::Utc)
    }

    #[test]
    fn test_empty_series_is_invalid_input() {
        let err = render_chart(&[], &ChartOptions::default(), &Theme::plain()).unwrap_err();
        assert_eq!(err, ChartError::EmptySeries);
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let mut candles = sample_candles(5);
        candles[3].low = f64::NAN;
        let err = render_chart(&candles, &ChartOptions::default(), &Theme::plain()).unwrap_err();
        assert_eq!(err, ChartError::NonFiniteValue { index: 3, field: "low" });
    }

    #[test]
    fn test_inconsistent_options_are_rejected() {
        let candles = sample_candles(5);
        let options = ChartOptions::default().price_bounds(20.0, 10.0);
        let err = render_chart(&candles, &options, &Theme::plain()).unwrap_err();
        assert!(matches!(err, ChartError::InvalidOptions(_)));

        let err = render_chart(&candles, &ChartOptions::with_size(0, 10), &Theme::plain()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_grid_only_output_has_exact_size() {
        let candles = sample_candles(50);
        let options = plain_options(60, 15).legend(false);
        let chart = render_chart(&candles, &options, &Theme::plain()).unwrap();

        assert!(chart.text.ends_with('\n'));
        let lines: Vec<&str> = chart.text.lines().collect();
        assert_eq!(lines.len(), 15);
        assert!(lines.iter().all(|l| l.chars().count() == 60));
    }

    #[test]
    fn test_default_size() {
        let candles = sample_candles(200);
        let options = ChartOptions::default().legend(false).time_zone(TimeZoneMode::Utc);
        let chart = render_chart(&candles, &options, &Theme::plain()).unwrap();

        let lines: Vec<&str> = chart.text.lines().collect();
        assert_eq!(lines.len(), 30);
        assert!(lines.iter().all(|l| l.chars().count() == 120));
    }

    #[test]
    fn test_title_and_sections() {
        let candles = sample_candles(30);
        let options = plain_options(40, 12).pair("BTC-USD");
        let chart = render_chart(&candles, &options, &Theme::plain()).unwrap();

        // "BTC-USD Price Chart" = 19 caractères → padding (40 - 19) / 2 = 10
        assert!(chart.text.starts_with("          BTC-USD Price Chart\n\n"));
        assert!(chart.text.contains("\n\nChart stats\n"));
        assert!(chart.text.contains("Legend"));
        assert!(chart.text.ends_with(")\n"));
        assert!(!chart.text.contains("\n\n\n"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let candles = sample_candles(80);
        let options = plain_options(70, 20).pair("ETH-USD");

        let first = render_chart(&candles, &options, &Theme::colored()).unwrap();
        let second = render_chart(&candles, &options, &Theme::colored()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), first.text);
    }

    #[test]
    fn test_single_and_flat_series() {
        let single = vec![Candle::new(0, 100.0, 100.0, 100.0, 100.0)];
        let chart = render_chart(&single, &plain_options(30, 10), &Theme::plain()).unwrap();
        assert!(chart.text.contains("Trend: Down (0.00% slope)"));

        let flat = vec![Candle::new(0, 100.0, 100.0, 100.0, 100.0); 20];
        let chart = render_chart(&flat, &plain_options(30, 10), &Theme::plain()).unwrap();
        assert!(chart.text.contains("+0.00%"));
        assert!(!chart.text.contains("-0.00%"));
    }

    #[test]
    fn test_malformed_candles_are_counted() {
        let mut candles = sample_candles(10);
        candles[2].high = candles[2].body_top() - 1.0;
        candles[7].low = candles[7].body_bottom() + 1.0;

        let chart = render_chart(&candles, &plain_options(40, 12), &Theme::plain()).unwrap();
        assert_eq!(chart.clipped_candles, 2);
    }
}
