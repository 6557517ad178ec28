// ============================================================================
// Ligne de commande
// ============================================================================
// Flags du binaire `candlestick`, parsés avec clap (derive)
//
// Exemples :
//   candlestick -c ETH --currency EUR --hours 48
//   candlestick -c BTC --mins 90 -w 100 -H 25 --no-color
//   candlestick --toplist 20
//   candlestick --list --plain
// ============================================================================

use clap::Parser;

use crate::chart::Theme;
use crate::models::{ChartOptions, Timeframe, TimeZoneMode, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Nombre de coins par défaut pour `--toplist` sans valeur
const DEFAULT_TOPLIST: &str = "10";

/// Terminal candlestick charts for crypto pairs (CryptoCompare data)
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "candlestick", version)]
#[command(about = "Render crypto candlestick charts in the terminal")]
pub struct Cli {
    /// Coin symbol (e.g., BTC, ETH)
    #[arg(short, long, default_value = "BTC")]
    pub coin: String,

    /// Quote currency (e.g., USD, EUR)
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Number of daily candles
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Number of hourly candles
    #[arg(long)]
    pub hours: Option<u32>,

    /// Number of one-minute candles
    #[arg(long)]
    pub mins: Option<u32>,

    /// Chart width in columns
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Chart height in rows
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Upper price bound of the chart
    #[arg(long)]
    pub max: Option<f64>,

    /// Lower price bound of the chart
    #[arg(long)]
    pub min: Option<f64>,

    /// Minimum price span shown on the chart
    #[arg(long)]
    pub min_range: Option<f64>,

    /// Hide the stats tables and legend
    #[arg(long)]
    pub disable_legend: bool,

    /// Hide the price and time axes
    #[arg(long)]
    pub no_axes: bool,

    /// Plain characters, no ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Time labels in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// List all available coins
    #[arg(short, long)]
    pub list: bool,

    /// List the top N coins by market cap
    #[arg(short, long, value_name = "N", num_args = 0..=1, default_missing_value = DEFAULT_TOPLIST)]
    pub toplist: Option<usize>,

    /// Print lists as plain text instead of the interactive browser
    #[arg(long)]
    pub plain: bool,

    /// Technical indicator (accepted for compatibility, not rendered)
    #[arg(long = "technical-indicator", visible_alias = "ti", value_name = "NAME")]
    pub technical_indicators: Vec<String>,
}

/// Action demandée par la ligne de commande
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Liste de tous les coins
    List,
    /// Top N par capitalisation
    TopList(usize),
    /// Graphique de la paire
    Chart,
}

impl Cli {
    /// --toplist l'emporte sur --list, sinon graphique
    pub fn command(&self) -> Command {
        match (self.toplist, self.list) {
            (Some(limit), _) => Command::TopList(limit.max(1)),
            (None, true) => Command::List,
            (None, false) => Command::Chart,
        }
    }

    /// Timeframe depuis --mins / --hours / --days
    pub fn timeframe(&self) -> Timeframe {
        Timeframe::from_flags(self.days, self.hours, self.mins)
    }

    /// Label de la paire : "BTC-USD"
    pub fn pair_label(&self) -> String {
        format!("{}-{}", self.coin.to_uppercase(), self.currency.to_uppercase())
    }

    /// Options de rendu correspondant aux flags
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
            min_price: self.min,
            max_price: self.max,
            min_range: self.min_range,
            disable_legend: self.disable_legend,
            pair_label: Some(self.pair_label()),
            show_axes: !self.no_axes,
            time_zone: if self.utc { TimeZoneMode::Utc } else { TimeZoneMode::Local },
        }
    }

    /// Thème selon --no-color
    pub fn theme(&self) -> Theme {
        if self.no_color {
            Theme::plain()
        } else {
            Theme::colored()
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
