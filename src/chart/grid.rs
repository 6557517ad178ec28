// ============================================================================
// Grille de rendu : chandeliers + tendance + axes
// ============================================================================
// Transforme une série de chandelles en grille de caractères width × height
//
// ALGORITHME :
// - Échelle de prix : bornes calculées (ou imposées), recentrage min_range
// - Colonne : floor(i * largeur_utile / n) + marge gauche
// - Ligne : round((max - prix) / (max - min) * (hauteur_utile - 1))
// - Couches : tendance d'abord, puis mèches et corps par-dessus
//
// CONCEPT : Arena
// - Une seule allocation Vec<Cell> de width * height
// - Index = row * width + col
// - Pas de Vec<Vec<_>>, meilleure localité mémoire
//
// ZONES (avec axes) :
//   col 0..9   : labels de prix + axe vertical (col 9)
//   col 10..   : zone de tracé
//   avant-dernière ligne : axe du temps (─ ┴ └)
//   dernière ligne : labels HH:MM
// ============================================================================

use chrono::{DateTime, Local};
use tracing::trace;

use crate::chart::theme::{Role, Theme};
use crate::models::{Candle, ChartOptions, TimeZoneMode};

/// Largeur réservée à l'axe des prix (labels + trait vertical)
pub const PRICE_AXIS_WIDTH: usize = 10;

/// Hauteur réservée à l'axe du temps (trait + labels)
pub const TIME_AXIS_HEIGHT: usize = 2;

/// Nombre approximatif de labels sur chaque axe
const AXIS_LABEL_COUNT: usize = 4;

// ============================================================================
// Cellule et grille
// ============================================================================

/// Une cellule : caractère + rôle optionnel (pour le style)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub role: Option<Role>,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', role: None };
}

/// Matrice width × height stockée à plat
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grille remplie d'espaces
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cellule en (row, col), None hors grille
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.height && col < self.width {
            self.cells.get(row * self.width + col)
        } else {
            None
        }
    }

    /// Écrit une cellule ; les coordonnées hors grille sont ignorées
    ///
    /// CONCEPT : Coordonnées signées
    /// - Les arrondis aux bords produisent des -1 ou des width
    /// - i64 permet de les tester sans underflow
    pub fn set(&mut self, row: i64, col: i64, ch: char, role: Option<Role>) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return false;
        }
        self.cells[row * self.width + col] = Cell { ch, role };
        true
    }

    /// Itère sur les positions (row, col) des cellules d'un rôle donné
    pub fn positions_of(&self, role: Role) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| cell.role == Some(role))
            .map(move |(index, _)| (index / width, index % width))
    }

    /// Texte brut d'une ligne (sans style)
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        let start = row * self.width;
        self.cells[start..start + self.width].iter().map(|c| c.ch).collect()
    }

    /// Sérialise la grille avec le thème
    ///
    /// Les cellules consécutives de même rôle forment un seul segment stylé,
    /// ce qui limite le nombre de séquences ANSI.
    pub fn render(&self, theme: &Theme) -> String {
        let mut rows = Vec::with_capacity(self.height);

        for row in 0..self.height {
            let start = row * self.width;
            let cells = &self.cells[start..start + self.width];

            let mut line = String::with_capacity(self.width * 4);
            let mut run = String::new();
            let mut run_role: Option<Role> = None;

            for cell in cells {
                if cell.role != run_role && !run.is_empty() {
                    line.push_str(&theme.paint_opt(&run, run_role));
                    run.clear();
                }
                run_role = cell.role;
                run.push(cell.ch);
            }
            if !run.is_empty() {
                line.push_str(&theme.paint_opt(&run, run_role));
            }

            rows.push(line);
        }

        rows.join("\n")
    }
}

// ============================================================================
// Échelle des prix
// ============================================================================

/// Bornes de prix effectives et correspondance prix → ligne
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min: f64,
    pub max: f64,
    /// Nombre de lignes de la zone de tracé
    pub rows: usize,
}

impl PriceScale {
    /// Calcule les bornes depuis les données et les options
    ///
    /// - max = options.max ?? max(highs, tendance)
    /// - min = options.min ?? min(lows, tendance)
    /// - min_range : recentre sur le milieu si l'écart est trop petit
    pub fn from_data(candles: &[Candle], trend: &[f64], options: &ChartOptions, rows: usize) -> Self {
        let data_max = candles
            .iter()
            .map(|c| c.high)
            .chain(trend.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        let data_min = candles
            .iter()
            .map(|c| c.low)
            .chain(trend.iter().copied())
            .fold(f64::INFINITY, f64::min);

        let mut max = options.max_price.unwrap_or(data_max);
        let mut min = options.min_price.unwrap_or(data_min);

        // Une seule borne imposée peut passer de l'autre côté des données :
        // on garde l'amplitude des données, qui sortent alors de la zone
        if min > max {
            let span = if data_max > data_min { data_max - data_min } else { 1.0 };
            if options.max_price.is_some() {
                min = max - span;
            } else {
                max = min + span;
            }
        }

        if let Some(min_range) = options.min_range {
            if max - min < min_range {
                let middle = (max + min) / 2.0;
                min = middle - min_range / 2.0;
                max = middle + min_range / 2.0;
            }
        }

        Self { min, max, rows }
    }

    /// Vrai si l'écart de prix est nul (série plate)
    pub fn is_flat(&self) -> bool {
        self.max == self.min
    }

    /// Prix → ligne (0 = haut). Peut sortir de [0, rows) : l'appelant clippe.
    pub fn row_of(&self, price: f64) -> i64 {
        let last_row = self.rows.saturating_sub(1) as f64;
        if self.is_flat() {
            return (self.rows.saturating_sub(1) / 2) as i64;
        }
        ((self.max - price) / (self.max - self.min) * last_row).round() as i64
    }

    /// Ligne → prix (inverse de row_of, pour les labels)
    pub fn price_at_row(&self, row: usize) -> f64 {
        if self.rows <= 1 || self.is_flat() {
            return self.max;
        }
        self.max - (row as f64 / (self.rows - 1) as f64) * (self.max - self.min)
    }
}

// ============================================================================
// Formatage des labels
// ============================================================================

/// Label compact pour l'axe des prix
///
/// - >= 1000 : "45.2k"
/// - < 1 : 4 décimales ("0.0123")
/// - sinon : 2 décimales ("123.45")
pub fn format_axis_price(price: f64) -> String {
    if price >= 1000.0 {
        format!("{:.1}k", price / 1000.0)
    } else if price < 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// Label de prix limité à `width` caractères
///
/// Réduit la précision avant de couper : "1700000.0k" → "1700000k" → "1700M".
pub fn fit_axis_price(price: f64, width: usize) -> String {
    let label = format_axis_price(price);
    if label.chars().count() <= width {
        return label;
    }

    let shorter = if price >= 1000.0 {
        vec![format!("{:.0}k", price / 1e3), format!("{:.0}M", price / 1e6), format!("{:.0}B", price / 1e9)]
    } else {
        Vec::new()
    };
    shorter
        .into_iter()
        .find(|candidate| candidate.chars().count() <= width)
        .unwrap_or_else(|| label.chars().take(width).collect())
}

/// Label HH:MM pour l'axe du temps
pub fn format_axis_time(timestamp: i64, time_zone: TimeZoneMode) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => match time_zone {
            TimeZoneMode::Utc => utc.format("%H:%M").to_string(),
            TimeZoneMode::Local => utc.with_timezone(&Local).format("%H:%M").to_string(),
        },
        None => "--:--".to_string(),
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Zone de tracé dans la grille
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    /// Première colonne de la zone de tracé
    pub left: usize,
    /// Nombre de colonnes utiles
    pub width: usize,
    /// Nombre de lignes utiles
    pub height: usize,
    /// Vrai si les marges des axes sont réservées
    pub axes: bool,
}

impl PlotArea {
    /// Réserve les marges si les axes sont demandés et si la grille est assez grande
    pub fn for_options(options: &ChartOptions) -> Self {
        let fits = options.width > PRICE_AXIS_WIDTH && options.height > TIME_AXIS_HEIGHT;
        if options.show_axes && fits {
            Self {
                left: PRICE_AXIS_WIDTH,
                width: options.width - PRICE_AXIS_WIDTH,
                height: options.height - TIME_AXIS_HEIGHT,
                axes: true,
            }
        } else {
            Self {
                left: 0,
                width: options.width,
                height: options.height,
                axes: false,
            }
        }
    }

    /// Vrai si (row, col) est dans la zone de tracé
    fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0
            && (row as usize) < self.height
            && col >= self.left as i64
            && (col as usize) < self.left + self.width
    }
}

/// Renderer de la grille pour une série donnée
pub struct GridRenderer<'a> {
    candles: &'a [Candle],
    trend: &'a [f64],
    options: &'a ChartOptions,
    theme: &'a Theme,
    area: PlotArea,
    scale: PriceScale,
}

impl<'a> GridRenderer<'a> {
    /// Prépare le rendu : zone de tracé + échelle de prix
    pub fn new(candles: &'a [Candle], trend: &'a [f64], options: &'a ChartOptions, theme: &'a Theme) -> Self {
        let area = PlotArea::for_options(options);
        let scale = PriceScale::from_data(candles, trend, options, area.height);

        Self {
            candles,
            trend,
            options,
            theme,
            area,
            scale,
        }
    }

    pub fn scale(&self) -> &PriceScale {
        &self.scale
    }

    pub fn area(&self) -> &PlotArea {
        &self.area
    }

    /// Index de chandelle → colonne absolue dans la grille
    ///
    /// CONCEPT : Calcul depuis l'index (pas d'accumulation)
    /// - Arithmétique entière : floor(i * largeur / n) exact
    pub fn column_of(&self, index: usize) -> i64 {
        let n = self.candles.len().max(1);
        (index * self.area.width / n + self.area.left) as i64
    }

    /// Dessine toute la grille
    pub fn render(&self) -> Grid {
        let mut grid = Grid::new(self.options.width, self.options.height);

        // L'ordre des couches compte : la tendance passe sous les chandelles
        self.draw_trend(&mut grid);
        self.draw_candles(&mut grid);

        if self.area.axes {
            self.draw_price_axis(&mut grid);
            self.draw_time_axis(&mut grid);
        }

        trace!(
            width = grid.width(),
            height = grid.height(),
            min = self.scale.min,
            max = self.scale.max,
            "Grid rendered"
        );
        grid
    }

    /// Écrit dans la zone de tracé uniquement
    fn plot(&self, grid: &mut Grid, row: i64, col: i64, ch: char, role: Role) {
        if self.area.contains(row, col) {
            grid.set(row, col, ch, Some(role));
        }
    }

    fn draw_trend(&self, grid: &mut Grid) {
        for (i, &price) in self.trend.iter().enumerate() {
            let col = self.column_of(i);
            let row = self.scale.row_of(price);
            self.plot(grid, row, col, self.theme.trend_glyph, Role::Trend);
        }
    }

    fn draw_candles(&self, grid: &mut Grid) {
        for (i, raw) in self.candles.iter().enumerate() {
            let candle = raw.clipped();
            let col = self.column_of(i);

            // Mèche : de high à low
            let high_row = self.scale.row_of(candle.high);
            let low_row = self.scale.row_of(candle.low);
            for row in high_row.min(low_row)..=high_row.max(low_row) {
                self.plot(grid, row, col, self.theme.wick_glyph, Role::Wick);
            }

            // Corps : d'open à close, par-dessus la mèche
            let open_row = self.scale.row_of(candle.open);
            let close_row = self.scale.row_of(candle.close);
            let bullish = candle.is_bullish();
            let role = if bullish { Role::Bullish } else { Role::Bearish };
            for row in open_row.min(close_row)..=open_row.max(close_row) {
                self.plot(grid, row, col, self.theme.body_glyph(bullish), role);
            }
        }
    }

    /// Axe vertical + labels de prix tous les height/4 lignes
    fn draw_price_axis(&self, grid: &mut Grid) {
        let axis_col = (self.area.left - 1) as i64;
        let step = (self.area.height / AXIS_LABEL_COUNT).max(1);

        for y in 0..self.area.height {
            grid.set(y as i64, axis_col, self.theme.axis_vertical, Some(Role::Axis));

            if y % step == 0 {
                // Aligné à droite, deux colonnes avant l'axe
                let end = self.area.left - 2;
                let label = fit_axis_price(self.scale.price_at_row(y), end);
                let start = end - label.chars().count();
                for (offset, ch) in label.chars().enumerate() {
                    grid.set(y as i64, (start + offset) as i64, ch, Some(Role::Label));
                }
            }
        }
    }

    /// Axe horizontal, ticks et labels HH:MM sous ~4 chandelles
    fn draw_time_axis(&self, grid: &mut Grid) {
        let axis_row = self.area.height as i64;
        let label_row = axis_row + 1;

        for col in self.area.left..self.options.width {
            grid.set(axis_row, col as i64, self.theme.axis_horizontal, Some(Role::Axis));
        }
        grid.set(axis_row, (self.area.left - 1) as i64, self.theme.axis_corner, Some(Role::Axis));

        let n = self.candles.len();
        let step = (n / AXIS_LABEL_COUNT).max(1);

        for i in (0..n).step_by(step) {
            let col = self.column_of(i);
            if col as usize >= self.options.width {
                continue;
            }
            grid.set(axis_row, col, self.theme.axis_tick, Some(Role::Axis));

            let label = format_axis_time(self.candles[i].time, self.options.time_zone);
            let start = col - (label.chars().count() / 2) as i64;
            for (offset, ch) in label.chars().enumerate() {
                grid.set(label_row, start + offset as i64, ch, Some(Role::Label));
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
