// ============================================================================
// Structure : Candle (Open, High, Low, Close + volumes)
// ============================================================================
// Représente une chandelle japonaise telle que renvoyée par CryptoCompare
//
// CONCEPTS RUST :
// 1. i64 : timestamp Unix en secondes (peut être négatif en théorie)
// 2. f64 : prix et volumes (les volumes crypto sont fractionnaires)
// 3. #[serde(rename)] : les champs JSON sont "volumefrom" / "volumeto"
// ============================================================================

use serde::{Deserialize, Serialize};

/// Période de temps demandée à l'API
///
/// CONCEPT : Une seule granularité à la fois
/// - Minutes(n) : n chandelles d'une minute
/// - Hours(n) : n chandelles d'une heure
/// - Days(n) : n chandelles d'un jour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Minutes(u32),
    Hours(u32),
    Days(u32),
}

/// Limite maximale de points acceptée par l'API
pub const MAX_API_LIMIT: u32 = 2000;

impl Timeframe {
    /// Construit le timeframe depuis les flags CLI
    ///
    /// Priorité : minutes, puis heures, puis jours.
    /// Sans aucun flag (ou avec des zéros), on affiche les dernières 24 heures.
    pub fn from_flags(days: Option<u32>, hours: Option<u32>, mins: Option<u32>) -> Self {
        match (mins, hours, days) {
            (Some(m), _, _) if m > 0 => Timeframe::Minutes(m),
            (_, Some(h), _) if h > 0 => Timeframe::Hours(h),
            (_, _, Some(d)) if d > 0 => Timeframe::Days(d),
            _ => Timeframe::default(),
        }
    }

    /// Endpoint CryptoCompare correspondant
    pub fn endpoint(&self) -> &'static str {
        match self {
            Timeframe::Minutes(_) => "/v2/histominute",
            Timeframe::Hours(_) => "/v2/histohour",
            Timeframe::Days(_) => "/v2/histoday",
        }
    }

    /// Nombre de points demandés, plafonné à la limite de l'API
    pub fn limit(&self) -> u32 {
        let raw = match *self {
            Timeframe::Minutes(n) | Timeframe::Hours(n) | Timeframe::Days(n) => n,
        };
        raw.min(MAX_API_LIMIT)
    }

    /// Label court pour les logs et l'affichage
    pub fn label(&self) -> String {
        match self {
            Timeframe::Minutes(n) => format!("{}m", n),
            Timeframe::Hours(n) => format!("{}h", n),
            Timeframe::Days(n) => format!("{}d", n),
        }
    }
}

impl Default for Timeframe {
    /// 24 heures par défaut
    fn default() -> Self {
        Timeframe::Hours(24)
    }
}

/// Une chandelle OHLCV
///
/// Les champs supplémentaires du payload (conversionType, ...) sont ignorés
/// par serde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Timestamp Unix (secondes) du début de l'intervalle
    pub time: i64,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé en devise de base
    #[serde(rename = "volumefrom", default)]
    pub volume_from: f64,

    /// Volume échangé en devise de cotation
    #[serde(rename = "volumeto", default)]
    pub volume_to: f64,
}

impl Candle {
    /// Constructeur sans volumes
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume_from: 0.0,
            volume_to: 0.0,
        }
    }

    /// Ajoute les volumes (builder)
    pub fn with_volumes(mut self, volume_from: f64, volume_to: f64) -> Self {
        self.volume_from = volume_from;
        self.volume_to = volume_to;
        self
    }

    /// Haussière si close >= open (l'égalité compte comme haussière)
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Haut du corps
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Bas du corps
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Vérifie que high/low encadrent bien le corps
    pub fn is_well_formed(&self) -> bool {
        self.high >= self.body_top() && self.low <= self.body_bottom()
    }

    /// Retourne une copie dont high/low couvrent le corps
    ///
    /// CONCEPT : Tolérance aux données sales
    /// - Les données amont ne garantissent pas high >= max(open, close)
    /// - On élargit la mèche plutôt que d'échouer
    pub fn clipped(&self) -> Candle {
        Candle {
            high: self.high.max(self.body_top()),
            low: self.low.min(self.body_bottom()),
            ..*self
        }
    }

    /// Retourne le nom du premier champ non fini (NaN ou infini)
    pub fn first_non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volumefrom", self.volume_from),
            ("volumeto", self.volume_to),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
