// ============================================================================
// Statistiques de la série
// ============================================================================
// Résumé scalaire d'une série de chandelles :
// - prix courant, min, max, moyenne, écart à la moyenne
// - variations sur fenêtres fixes (5m, 30m, 1h, 12h, 1d)
// - direction et force de la tendance
// - répartition des trades : APPROXIMATION dérivée du volume, pas un flux réel
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::chart::trend::{trend_direction, trend_strength, TrendDirection};
use crate::models::Candle;

/// Fenêtres de variation : (label, nombre d'échantillons)
///
/// Les fenêtres comptent des chandelles, pas des minutes : "1d" = 1440
/// échantillons quel que soit l'intervalle de la série.
pub const CHANGE_WINDOWS: [(&str, usize); 5] = [
    ("5m", 5),
    ("30m", 30),
    ("1h", 60),
    ("12h", 720),
    ("1d", 1440),
];

/// Variation en % sur une fenêtre
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowChange {
    pub label: &'static str,
    pub period: usize,
    pub percent: f64,
}

/// Côté du dernier trade estimé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// Activité de trading estimée depuis le volume de la dernière chandelle
///
/// Les ratios sont fixes : ce ne sont PAS des données de marché.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEstimate {
    pub last: f64,
    pub side: TradeSide,
    pub size: f64,
    pub coins_bought: f64,
    pub coins_sold: f64,
    pub buys: u64,
    pub sells: u64,
}

impl TradeEstimate {
    /// Dérive les estimations du volume et de la tendance
    pub fn from_volume(last: f64, volume: f64, direction: TrendDirection) -> Self {
        let side = match direction {
            TrendDirection::Up => TradeSide::Buy,
            TrendDirection::Down => TradeSide::Sell,
        };

        Self {
            last,
            side,
            size: volume * 0.01,
            coins_bought: volume * 0.1,
            coins_sold: volume * 0.05,
            buys: (volume * 0.001).floor().max(0.0) as u64,
            sells: (volume * 0.0005).floor().max(0.0) as u64,
        }
    }
}

/// Statistiques complètes d'une série
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub pct_from_avg: f64,
    pub changes: Vec<WindowChange>,
    pub trend_direction: TrendDirection,
    pub trend_strength: f64,
    pub volume: f64,
    pub trades: TradeEstimate,
}

impl Stats {
    /// Variation pour un label de fenêtre ("5m", "1d"...)
    pub fn change(&self, label: &str) -> Option<f64> {
        self.changes
            .iter()
            .find(|change| change.label == label)
            .map(|change| change.percent)
    }
}

/// Variation en % entre la clôture courante et celle d'il y a `period` échantillons
///
/// 0 si la série est trop courte ou si la clôture de base est nulle.
fn percent_change(candles: &[Candle], period: usize, current: f64) -> f64 {
    let n = candles.len();
    if period == 0 || n < period {
        return 0.0;
    }

    let base = candles[n - period].close;
    if base == 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

/// Calcule les statistiques ; None pour une série vide
pub fn calculate_stats(candles: &[Candle], trend: &[f64]) -> Option<Stats> {
    let last = candles.last()?;
    let current = last.close;

    let min = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let max = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let avg = candles.iter().map(|c| c.close).sum::<f64>() / candles.len() as f64;

    let pct_from_avg = if avg == 0.0 {
        0.0
    } else {
        (current - avg) / avg * 100.0
    };

    let changes = CHANGE_WINDOWS
        .iter()
        .map(|&(label, period)| WindowChange {
            label,
            period,
            percent: percent_change(candles, period, current),
        })
        .collect();

    let direction = trend_direction(trend);
    let volume = last.volume_to;

    Some(Stats {
        current,
        min,
        max,
        avg,
        pct_from_avg,
        changes,
        trend_direction: direction,
        trend_strength: trend_strength(trend),
        volume,
        trades: TradeEstimate::from_volume(current, volume, direction),
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::trend::calculate_trend_line;

    fn series(closes: impl IntoIterator<Item = f64>) -> Vec<Candle> {
        closes
            .into_iter()
            .enumerate()
            .map(|(i, c)| Candle::new(i as i64 * 60, c, c + 1.0, c - 1.0, c))
            .collect()
    }

    #[test]
    fn test_basic_summary() {
        let candles = series([10.0, 20.0, 30.0]);
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        assert_eq!(stats.current, 30.0);
        assert_eq!(stats.min, 9.0);
        assert_eq!(stats.max, 31.0);
        assert_eq!(stats.avg, 20.0);
        assert!((stats.pct_from_avg - 50.0).abs() < 1e-9);
        assert_eq!(stats.trend_direction, TrendDirection::Up);
    }

    #[test]
    fn test_short_series_changes_are_zero() {
        let candles = series([10.0, 11.0, 12.0]);
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        assert_eq!(stats.changes.len(), 5);
        assert!(stats.changes.iter().all(|change| change.percent == 0.0));
    }

    #[test]
    fn test_five_sample_window() {
        let candles = series([100.0, 200.0, 100.0, 100.0, 100.0, 150.0]);
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        // Base = candles[6 - 5] = 200
        assert!((stats.change("5m").unwrap() + 25.0).abs() < 1e-9);
        assert_eq!(stats.change("30m"), Some(0.0));
        assert_eq!(stats.change("2w"), None);
    }

    #[test]
    fn test_full_day_window() {
        let candles = series((0..1440).map(|i| 100.0 + i as f64));
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        assert!((stats.change("1d").unwrap() - 1439.0).abs() < 1e-9);
        assert!((stats.change("1h").unwrap() - (1539.0 - 1480.0) / 1480.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series() {
        let candles = vec![Candle::new(0, 100.0, 100.0, 100.0, 100.0); 1500];
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        assert!(stats.changes.iter().all(|change| change.percent == 0.0));
        assert_eq!(stats.pct_from_avg, 0.0);
        assert_eq!(stats.trend_direction, TrendDirection::Down);
        assert_eq!(stats.trend_strength, 0.0);
    }

    #[test]
    fn test_zero_base_close_does_not_divide() {
        let mut candles = series([1.0; 6]);
        candles[1].close = 0.0;
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();
        assert_eq!(stats.change("5m"), Some(0.0));
    }

    #[test]
    fn test_trade_estimate_from_volume() {
        let candles = vec![Candle::new(0, 10.0, 12.0, 9.0, 11.0).with_volumes(50.0, 20_000.0)];
        let trend = calculate_trend_line(&candles);
        let stats = calculate_stats(&candles, &trend).unwrap();

        assert_eq!(stats.volume, 20_000.0);
        let trades = &stats.trades;
        assert_eq!(trades.last, 11.0);
        // Une seule chandelle : tendance plate → Down → SELL
        assert_eq!(trades.side, TradeSide::Sell);
        assert!((trades.size - 200.0).abs() < 1e-9);
        assert!((trades.coins_bought - 2000.0).abs() < 1e-9);
        assert!((trades.coins_sold - 1000.0).abs() < 1e-9);
        assert_eq!(trades.buys, 20);
        assert_eq!(trades.sells, 10);
    }

    #[test]
    fn test_empty_series_has_no_stats() {
        assert!(calculate_stats(&[], &[]).is_none());
    }
}
