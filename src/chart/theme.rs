// ============================================================================
// Thème : glyphes et couleurs du graphique
// ============================================================================
// Toutes les constantes visuelles passent par une valeur Theme injectée dans
// la grille et les tableaux, au lieu de globales.
//
// CONCEPTS :
// - Theme::colored() : rendu ANSI pour le terminal (défaut)
// - Theme::plain() : caractères seuls (tests, --no-color, sortie redirigée)
// - crossterm::style::ContentStyle : couleur + attributs appliqués à un texte
// ============================================================================

use crossterm::style::{Attribute, Color, ContentStyle};

/// Rôle d'un élément affiché (cellule de la grille ou texte des tableaux)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Corps d'une chandelle haussière
    Bullish,
    /// Corps d'une chandelle baissière
    Bearish,
    /// Ligne de tendance
    Trend,
    /// Mèche
    Wick,
    /// Traits des axes
    Axis,
    /// Labels de prix et de temps
    Label,
    /// Titre du graphique et des tableaux
    Title,
    /// En-têtes des tableaux
    Header,
    /// Valeur positive (variation, achats)
    Positive,
    /// Valeur négative (variation, ventes)
    Negative,
}

/// Glyphes et styles utilisés par le rendu
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bullish_glyph: char,
    pub bearish_glyph: char,
    pub trend_glyph: char,
    pub wick_glyph: char,
    pub axis_vertical: char,
    pub axis_horizontal: char,
    pub axis_corner: char,
    pub axis_tick: char,

    /// Faux : aucun code ANSI n'est émis
    pub colored: bool,

    bullish: ContentStyle,
    bearish: ContentStyle,
    trend: ContentStyle,
    wick: ContentStyle,
    axis: ContentStyle,
    label: ContentStyle,
    title: ContentStyle,
    header: ContentStyle,
    positive: ContentStyle,
    negative: ContentStyle,
}

/// Construit un style couleur (+ gras optionnel)
fn style(color: Option<Color>, bold: bool) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = color;
    if bold {
        style.attributes.set(Attribute::Bold);
    }
    style
}

impl Theme {
    /// Thème du terminal : vert/rouge pour les corps, jaune pour la tendance
    pub fn colored() -> Self {
        Self {
            bullish_glyph: '█',
            bearish_glyph: '█',
            trend_glyph: '─',
            wick_glyph: '│',
            axis_vertical: '│',
            axis_horizontal: '─',
            axis_corner: '└',
            axis_tick: '┴',
            colored: true,
            bullish: style(Some(Color::Green), true),
            bearish: style(Some(Color::Red), true),
            trend: style(Some(Color::Yellow), true),
            wick: style(Some(Color::DarkGrey), false),
            axis: style(Some(Color::DarkGrey), false),
            label: style(Some(Color::DarkGrey), false),
            title: style(None, true),
            header: style(Some(Color::DarkGrey), false),
            positive: style(Some(Color::Green), false),
            negative: style(Some(Color::Red), false),
        }
    }

    /// Mêmes glyphes, sans couleur
    ///
    /// Les corps haussiers et baissiers restent distinguables sans couleur :
    /// '█' pour haussier, '░' pour baissier.
    pub fn plain() -> Self {
        Self {
            bearish_glyph: '░',
            colored: false,
            ..Self::colored()
        }
    }

    /// Glyphe du corps selon la direction de la chandelle
    pub fn body_glyph(&self, bullish: bool) -> char {
        if bullish {
            self.bullish_glyph
        } else {
            self.bearish_glyph
        }
    }

    /// Style associé à un rôle
    pub fn style_for(&self, role: Role) -> ContentStyle {
        match role {
            Role::Bullish => self.bullish,
            Role::Bearish => self.bearish,
            Role::Trend => self.trend,
            Role::Wick => self.wick,
            Role::Axis => self.axis,
            Role::Label => self.label,
            Role::Title => self.title,
            Role::Header => self.header,
            Role::Positive => self.positive,
            Role::Negative => self.negative,
        }
    }

    /// Applique le style d'un rôle à un texte
    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.colored || text.is_empty() {
            return text.to_string();
        }
        self.style_for(role).apply(text).to_string()
    }

    /// Variante : rôle optionnel (None = texte brut)
    pub fn paint_opt(&self, text: &str, role: Option<Role>) -> String {
        match role {
            Some(role) => self.paint(text, role),
            None => text.to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_emits_no_escape_codes() {
        let theme = Theme::plain();
        assert_eq!(theme.paint("█", Role::Bullish), "█");
        assert_eq!(theme.paint("+1.00%", Role::Positive), "+1.00%");
        assert_ne!(theme.body_glyph(true), theme.body_glyph(false));
    }

    #[test]
    fn test_colored_theme_wraps_text() {
        let theme = Theme::colored();
        let painted = theme.paint("─", Role::Trend);
        assert!(painted.contains('─'));
        assert!(painted.starts_with('\u{1b}'));
        assert_eq!(theme.body_glyph(true), theme.body_glyph(false));
    }

    #[test]
    fn test_paint_empty_text_is_noop() {
        assert_eq!(Theme::colored().paint("", Role::Title), "");
        assert_eq!(Theme::colored().paint_opt("x", None), "x");
    }
}
