// ============================================================================
// Tableaux de statistiques (box drawing)
// ============================================================================
// Rend les Stats sous forme de tableaux encadrés :
//
//   Chart stats
//   ┌─────────┬─────────┬─────┐
//   │ pair    │ current │ ... │
//   ├─────────┼─────────┼─────┤
//   │ BTC-USD │ $42.00  │ ... │
//   └─────────┴─────────┴─────┘
//
// CONCEPT : tabled::builder::Builder
// - Colonnes dynamiques (une par fenêtre de variation)
// - Style::modern() pour les bordures ┌─┬─┐ ├─┼─┤ └─┴─┘
// - Les codes ANSI ne comptent pas dans l'alignement (feature "ansi")
// ============================================================================

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::chart::stats::{Stats, TradeSide};
use crate::chart::theme::{Role, Theme};

/// Label affiché quand la paire n'est pas connue
const MISSING_PAIR: &str = "-";

// ============================================================================
// Helpers de formatage
// ============================================================================

/// Prix : "$1234.56"
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Pourcentage signé : "+1.23%" / "-4.56%"
pub fn format_percent(value: f64) -> String {
    if value < 0.0 {
        format!("-{:.2}%", value.abs())
    } else {
        format!("+{:.2}%", value)
    }
}

/// Rôle selon le signe d'une variation
fn sign_role(value: f64) -> Role {
    if value < 0.0 {
        Role::Negative
    } else {
        Role::Positive
    }
}

// ============================================================================
// Tableau encadré (tabled)
// ============================================================================

/// Titre + tableau encadré d'une ligne d'en-têtes et d'une ligne de valeurs
///
/// Les cellules arrivent déjà stylées ; avec la feature "ansi" de tabled,
/// les largeurs de colonnes ignorent les codes d'échappement.
pub fn boxed_table(theme: &Theme, title: &str, headers: &[String], row: Vec<String>) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| theme.paint(h, Role::Header)));
    builder.push_record(row);

    let mut table = builder.build();
    table.with(Style::modern());

    format!("{}\n{}", theme.paint(title, Role::Title), table)
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

// ============================================================================
// Renderer des statistiques
// ============================================================================

/// Rend les Stats en trois tableaux + légende
pub struct StatsRenderer<'a> {
    stats: &'a Stats,
    pair: &'a str,
    theme: &'a Theme,
}

impl<'a> StatsRenderer<'a> {
    pub fn new(stats: &'a Stats, pair_label: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            stats,
            pair: pair_label.unwrap_or(MISSING_PAIR),
            theme,
        }
    }

    /// Prix courant, bornes, moyenne et écart à la moyenne
    pub fn summary_table(&self) -> String {
        let stats = self.stats;
        let theme = self.theme;
        boxed_table(
            theme,
            "Chart stats",
            &headers(&["pair", "current", "low", "high", "average", "% of average"]),
            vec![
                self.pair.to_string(),
                format_price(stats.current),
                format_price(stats.min),
                format_price(stats.max),
                format_price(stats.avg),
                theme.paint(&format_percent(stats.pct_from_avg), sign_role(stats.pct_from_avg)),
            ],
        )
    }

    /// Variations sur chaque fenêtre, colorées selon le signe
    pub fn change_table(&self) -> String {
        let theme = self.theme;
        let changes = &self.stats.changes;

        let names: Vec<String> = std::iter::once("pair".to_string())
            .chain(changes.iter().map(|c| format!("{}:", c.label)))
            .collect();
        let row = std::iter::once(self.pair.to_string())
            .chain(
                changes
                    .iter()
                    .map(|c| theme.paint(&format_percent(c.percent), sign_role(c.percent))),
            )
            .collect();

        boxed_table(theme, "Change", &names, row)
    }

    /// Trades estimés depuis le volume (pas un flux réel)
    pub fn trades_table(&self) -> String {
        let trades = &self.stats.trades;
        let theme = self.theme;
        let side_role = match trades.side {
            TradeSide::Buy => Role::Positive,
            TradeSide::Sell => Role::Negative,
        };

        boxed_table(
            theme,
            "Live trades & running totals (approximation)",
            &headers(&["pair", "last", "side", "size", "coins bought", "coins sold", "buys", "sells"]),
            vec![
                self.pair.to_string(),
                format_price(trades.last),
                theme.paint(trades.side.label(), side_role),
                format!("{:.4}", trades.size),
                format!("{:.2}", trades.coins_bought),
                format!("{:.2}", trades.coins_sold),
                trades.buys.to_string(),
                trades.sells.to_string(),
            ],
        )
    }

    /// Légende des glyphes + direction de la tendance
    pub fn legend(&self) -> String {
        let theme = self.theme;
        let glyphs = format!(
            "{} Bullish   {} Bearish   {} Trend line",
            theme.paint(&theme.bullish_glyph.to_string(), Role::Bullish),
            theme.paint(&theme.bearish_glyph.to_string(), Role::Bearish),
            theme.paint(&theme.trend_glyph.to_string(), Role::Trend),
        );
        let trend = format!(
            "Trend: {} ({:.2}% slope)",
            self.stats.trend_direction.label(),
            self.stats.trend_strength
        );

        [theme.paint("Legend", Role::Title), glyphs, trend].join("\n")
    }

    /// Tous les blocs, séparés par une ligne vide
    pub fn render(&self) -> String {
        [
            self.summary_table(),
            self.change_table(),
            self.trades_table(),
            self.legend(),
        ]
        .join("\n\n")
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::stats::calculate_stats;
    use crate::chart::trend::calculate_trend_line;
    use crate::models::Candle;

    fn sample_stats() -> Stats {
        let candles: Vec<Candle> = (0..10)
            .map(|i| {
                let c = 100.0 + i as f64;
                Candle::new(i * 60, c, c + 2.0, c - 2.0, c).with_volumes(1.0, 5000.0)
            })
            .collect();
        let trend = calculate_trend_line(&candles);
        calculate_stats(&candles, &trend).unwrap()
    }

    /// Retire les séquences ESC [ ... m
    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\u{1b}' {
                for next in chars.by_ref() {
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_price(42.0), "$42.00");
        assert_eq!(format_percent(1.234), "+1.23%");
        assert_eq!(format_percent(-0.5), "-0.50%");
        assert_eq!(format_percent(0.0), "+0.00%");
    }

    #[test]
    fn test_table_rows_are_aligned() {
        let theme = Theme::plain();
        let rendered = boxed_table(
            &theme,
            "Test",
            &headers(&["a", "long header"]),
            vec!["wide value".to_string(), "x".to_string()],
        );

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Test");
        let width = lines[1].chars().count();
        assert!(lines[1..].iter().all(|l| l.chars().count() == width));
        assert_eq!(lines[1], "┌────────────┬─────────────┐");
        assert_eq!(lines[2], "│ a          │ long header │");
        assert_eq!(lines[3], "├────────────┼─────────────┤");
        assert_eq!(lines[4], "│ wide value │ x           │");
        assert_eq!(lines[5], "└────────────┴─────────────┘");
    }

    #[test]
    fn test_colored_cells_keep_alignment() {
        let theme = Theme::colored();
        let rendered = boxed_table(
            &theme,
            "Change",
            &headers(&["pair", "5m:"]),
            vec!["BTC-USD".to_string(), theme.paint("-1.25%", Role::Negative)],
        );

        let plain = strip_ansi(&rendered);
        let lines: Vec<&str> = plain.lines().skip(1).collect();
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        assert!(plain.contains("│ BTC-USD │ -1.25% │"));
    }

    #[test]
    fn test_colored_alignment_matches_plain() {
        let stats = sample_stats();
        let plain_theme = Theme::plain();
        let colored_theme = Theme::colored();
        let plain = StatsRenderer::new(&stats, Some("BTC-USD"), &plain_theme);
        let colored = StatsRenderer::new(&stats, Some("BTC-USD"), &colored_theme);

        // Les tableaux n'utilisent pas les glyphes : seul le style diffère
        for (plain_text, colored_text) in [
            (plain.summary_table(), colored.summary_table()),
            (plain.change_table(), colored.change_table()),
            (plain.trades_table(), colored.trades_table()),
        ] {
            assert_ne!(plain_text, colored_text);
            assert_eq!(strip_ansi(&colored_text), plain_text);
        }
    }

    #[test]
    fn test_stats_tables_content() {
        let stats = sample_stats();
        let text = StatsRenderer::new(&stats, Some("ETH-EUR"), &Theme::plain()).render();

        assert!(text.starts_with("Chart stats\n"));
        assert!(text.contains("│ ETH-EUR │ $109.00 │ $98.00 │ $111.00 │ $104.50 │"));
        assert!(text.contains("\n\nChange\n"));
        assert!(text.contains("5m:"));
        assert!(text.contains("1d:"));
        assert!(text.contains("Live trades & running totals (approximation)"));
        assert!(text.contains("BUY"));
        assert!(text.contains("50.0000"));
        assert!(text.contains("Trend: Up ("));
        assert!(text.contains("█ Bullish   ░ Bearish   ─ Trend line"));
    }

    #[test]
    fn test_missing_pair_renders_dash() {
        let stats = sample_stats();
        let table = StatsRenderer::new(&stats, None, &Theme::plain()).summary_table();
        assert!(table.contains("│ -    │"));
    }
}
