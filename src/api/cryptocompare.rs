// ============================================================================
// API Client : CryptoCompare
// ============================================================================
// Récupère l'historique des prix et les listes de coins depuis
// https://min-api.cryptocompare.com/data
//
// ENDPOINTS :
// - /v2/histominute, /v2/histohour, /v2/histoday : chandelles OHLCV
// - /all/coinlist : tous les coins (symbole + nom)
// - /top/mktcapfull : top coins par capitalisation
//
// CONCEPTS RUST :
// 1. async/await : requêtes HTTP non-bloquantes (reqwest)
// 2. Parsing séparé du transport : les fonctions parse_* prennent un &str
//    et sont testées avec des fixtures JSON, sans réseau
// 3. Retry sur HTTP 429 avec tokio::time::sleep
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Candle, CoinSummary, Timeframe};

/// URL de base de l'API
pub const BASE_URL: &str = "https://min-api.cryptocompare.com/data";

/// Variable d'environnement contenant la clé API (optionnelle)
pub const API_KEY_ENV: &str = "CRYPTOCOMPARE_API_KEY";

/// Nombre de coins par défaut pour --toplist
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Nombre maximum de tentatives (rate limit)
const MAX_ATTEMPTS: u32 = 3;

/// Attente après un HTTP 429
const RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Message quand l'API ne renvoie aucune chandelle
const NO_DATA_MESSAGE: &str = "No price data available for the specified timeframe.";

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================
// Toutes les réponses partagent une enveloppe :
// { "Response": "Success" | "Error", "Message": "...", "Data": ... }
// ============================================================================

/// Enveloppe commune ; Data est gardé brut et parsé selon l'endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Option<String>,

    #[serde(rename = "Message")]
    message: Option<String>,

    #[serde(rename = "Data", default)]
    data: serde_json::Value,
}

impl Envelope {
    /// Transforme `"Response": "Error"` en erreur avec le message de l'API
    fn into_data(self) -> Result<serde_json::Value> {
        if self.response.as_deref() == Some("Error") {
            let message = self.message.unwrap_or_else(|| "unknown API error".to_string());
            error!(message = %message, "CryptoCompare returned an error response");
            bail!("{}", message);
        }
        Ok(self.data)
    }
}

/// Data des endpoints /v2/histo* : { "Data": [ ...chandelles ] }
#[derive(Debug, Deserialize)]
struct HistoData {
    #[serde(rename = "Data", default)]
    data: Vec<Candle>,
}

/// Entrée de /all/coinlist
#[derive(Debug, Deserialize)]
struct RawCoin {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,

    #[serde(rename = "CoinName")]
    coin_name: Option<String>,
}

/// Entrée de /top/mktcapfull
#[derive(Debug, Deserialize)]
struct RawTopCoin {
    #[serde(rename = "CoinInfo")]
    coin_info: Option<CoinInfo>,

    #[serde(rename = "RAW")]
    raw: Option<BTreeMap<String, RawMarket>>,
}

#[derive(Debug, Deserialize)]
struct CoinInfo {
    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "FullName")]
    full_name: String,
}

/// Données de marché (section RAW.USD)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct RawMarket {
    price: Option<f64>,
    mktcap: Option<f64>,
    changepct24hour: Option<f64>,
}

// ============================================================================
// Parsing (sans réseau)
// ============================================================================

/// Parse la réponse d'un endpoint /v2/histo*
pub fn parse_candles(body: &str) -> Result<Vec<Candle>> {
    let envelope: Envelope = serde_json::from_str(body).context("Invalid JSON in price history response")?;
    let data = envelope.into_data()?;

    if data.is_null() {
        bail!(NO_DATA_MESSAGE);
    }

    let histo: HistoData = serde_json::from_value(data).context("Unexpected price history payload")?;
    if histo.data.is_empty() {
        bail!(NO_DATA_MESSAGE);
    }

    debug!(candles = histo.data.len(), "Parsed price history");
    Ok(histo.data)
}

/// Parse /all/coinlist : map symbole → entrée, trié par symbole
///
/// Les entrées sans Symbol ou CoinName sont ignorées (avec un warning).
pub fn parse_coin_list(body: &str) -> Result<Vec<CoinSummary>> {
    let envelope: Envelope = serde_json::from_str(body).context("Invalid JSON in coin list response")?;
    let data = envelope.into_data()?;

    let entries: BTreeMap<String, serde_json::Value> =
        serde_json::from_value(data).context("Unexpected coin list payload")?;

    let mut skipped = 0;
    let mut coins = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        match serde_json::from_value::<RawCoin>(value) {
            Ok(RawCoin {
                symbol: Some(symbol),
                coin_name: Some(name),
            }) => coins.push(CoinSummary::new(symbol, name)),
            _ => {
                warn!(key = %key, "Skipping invalid coin entry");
                skipped += 1;
            }
        }
    }

    coins.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    debug!(coins = coins.len(), skipped, "Parsed coin list");
    Ok(coins)
}

/// Parse /top/mktcapfull ; l'ordre de l'API (capitalisation) est conservé
pub fn parse_top_coins(body: &str, currency: &str) -> Result<Vec<CoinSummary>> {
    let envelope: Envelope = serde_json::from_str(body).context("Invalid JSON in top coins response")?;
    let data = envelope.into_data()?;

    let entries: Vec<serde_json::Value> = serde_json::from_value(data).context("Unexpected top coins payload")?;

    let mut coins = Vec::with_capacity(entries.len());
    for (rank, value) in entries.into_iter().enumerate() {
        let raw = match serde_json::from_value::<RawTopCoin>(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(rank, error = %e, "Skipping unreadable top coin entry");
                continue;
            }
        };

        let Some(info) = raw.coin_info else {
            warn!(rank, "Skipping top coin entry without CoinInfo");
            continue;
        };

        let mut coin = CoinSummary::new(info.name, info.full_name);
        if let Some(market) = raw.raw.as_ref().and_then(|m| m.get(currency)) {
            coin = coin.with_market(
                market.price.unwrap_or(0.0),
                market.mktcap.unwrap_or(0.0),
                market.changepct24hour,
            );
        }
        coins.push(coin);
    }

    debug!(coins = coins.len(), "Parsed top coins");
    Ok(coins)
}

/// Paramètres de requête pour l'historique
fn candle_query(coin: &str, currency: &str, timeframe: Timeframe) -> Vec<(&'static str, String)> {
    vec![
        ("fsym", coin.to_uppercase()),
        ("tsym", currency.to_uppercase()),
        ("limit", timeframe.limit().to_string()),
        ("aggregate", "1".to_string()),
    ]
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client CryptoCompare
///
/// CONCEPT RUST : reqwest::Client
/// - Réutilise le pool de connexions entre requêtes
/// - Clone bon marché (Arc interne)
#[derive(Debug, Clone)]
pub struct CryptoCompareClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limit_wait: Duration,
}

impl CryptoCompareClient {
    /// Client vers l'API publique ; clé lue depuis CRYPTOCOMPARE_API_KEY
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Client vers une URL de base arbitraire
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("candlestick/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        if api_key.is_none() {
            debug!("No API key set, using anonymous CryptoCompare access");
        }

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            rate_limit_wait: RATE_LIMIT_WAIT,
        })
    }

    /// Change l'attente après un HTTP 429 (builder)
    pub fn rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    /// GET avec retry sur HTTP 429 ; retourne le corps de la réponse
    async fn get(&self, path: &str, mut query: Vec<(&'static str, String)>) -> Result<String> {
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }
        let url = format!("{}{}", self.base_url, path);

        for attempt in 1..=MAX_ATTEMPTS {
            debug!(url = %url, attempt, "Sending HTTP request to CryptoCompare");
            let response = self
                .http
                .get(&url)
                .query(&query)
                .send()
                .await
                .with_context(|| format!("HTTP request to {} failed", path))?;

            let status = response.status();
            debug!(status = %status, "Received HTTP response");

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < MAX_ATTEMPTS {
                    warn!(
                        attempt,
                        wait_secs = self.rate_limit_wait.as_secs(),
                        "Rate limited by CryptoCompare, retrying"
                    );
                    tokio::time::sleep(self.rate_limit_wait).await;
                    continue;
                }
                error!(attempts = MAX_ATTEMPTS, "Rate limit persisted, giving up");
                bail!("CryptoCompare rate limit exceeded after {} attempts", MAX_ATTEMPTS);
            }

            if !status.is_success() {
                error!(status = %status, "CryptoCompare returned error status");
                bail!("CryptoCompare returned HTTP {}", status);
            }

            return response.text().await.context("Failed to read response body");
        }

        bail!("CryptoCompare request to {} was not attempted", path)
    }

    /// Historique OHLCV d'une paire sur un timeframe
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Les logs de la requête portent coin, currency et timeframe
    #[instrument(skip(self, timeframe), fields(timeframe = %timeframe.label()))]
    pub async fn fetch_candles(&self, coin: &str, currency: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let body = self
            .get(timeframe.endpoint(), candle_query(coin, currency, timeframe))
            .await?;
        let candles = parse_candles(&body)
            .with_context(|| format!("Failed to load {}-{} prices", coin.to_uppercase(), currency.to_uppercase()))?;

        info!(candles = candles.len(), "Successfully fetched price history");
        Ok(candles)
    }

    /// Liste de tous les coins connus
    #[instrument(skip(self))]
    pub async fn fetch_coin_list(&self) -> Result<Vec<CoinSummary>> {
        let body = self.get("/all/coinlist", Vec::new()).await?;
        let coins = parse_coin_list(&body)?;

        info!(coins = coins.len(), "Successfully fetched coin list");
        Ok(coins)
    }

    /// Top coins par capitalisation (prix en USD)
    #[instrument(skip(self))]
    pub async fn fetch_top_coins(&self, limit: usize) -> Result<Vec<CoinSummary>> {
        let query = vec![("limit", limit.to_string()), ("tsym", "USD".to_string())];
        let body = self.get("/top/mktcapfull", query).await?;
        let coins = parse_top_coins(&body, "USD")?;

        info!(coins = coins.len(), "Successfully fetched top coins");
        Ok(coins)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HISTO_OK: &str = r#"{
        "Response": "Success",
        "Message": "",
        "Data": {
            "Aggregated": false,
            "TimeFrom": 1700000000,
            "TimeTo": 1700003600,
            "Data": [
                {"time": 1700000000, "high": 37200.5, "low": 36900.1, "open": 37000.0,
                 "volumefrom": 120.5, "volumeto": 4460000.0, "close": 37100.2,
                 "conversionType": "direct", "conversionSymbol": ""},
                {"time": 1700003600, "high": 37300.0, "low": 37050.0, "open": 37100.2,
                 "volumefrom": 98.1, "volumeto": 3650000.0, "close": 37250.0,
                 "conversionType": "direct", "conversionSymbol": ""}
            ]
        }
    }"#;

    #[test]
    fn test_parse_candles_success() {
        let candles = parse_candles(HISTO_OK).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000);
        assert_eq!(candles[0].open, 37000.0);
        assert_eq!(candles[1].close, 37250.0);
        assert_eq!(candles[1].volume_to, 3_650_000.0);
    }

    #[test]
    fn test_parse_candles_api_error() {
        let body = r#"{"Response": "Error", "Message": "fsym param is invalid", "Data": {}}"#;
        let err = parse_candles(body).unwrap_err();
        assert_eq!(err.to_string(), "fsym param is invalid");
    }

    #[test]
    fn test_parse_candles_empty_data() {
        let body = r#"{"Response": "Success", "Data": {"Data": []}}"#;
        let err = parse_candles(body).unwrap_err();
        assert_eq!(err.to_string(), NO_DATA_MESSAGE);

        let body = r#"{"Response": "Success"}"#;
        assert_eq!(parse_candles(body).unwrap_err().to_string(), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_parse_coin_list_sorts_and_skips_invalid() {
        let body = r#"{
            "Response": "Success",
            "Data": {
                "ETH": {"Symbol": "ETH", "CoinName": "Ethereum", "Id": "7605"},
                "BTC": {"Symbol": "BTC", "CoinName": "Bitcoin", "Id": "1182"},
                "BROKEN": {"Id": "42"},
                "ADA": {"Symbol": "ADA", "CoinName": "Cardano"},
                "WEIRD": "not an object"
            }
        }"#;
        let coins = parse_coin_list(body).unwrap();
        let symbols: Vec<&str> = coins.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ADA", "BTC", "ETH"]);
        assert_eq!(coins[1].name, "Bitcoin");
        assert!(coins.iter().all(|c| c.price.is_none()));
    }

    #[test]
    fn test_parse_top_coins() {
        let body = r#"{
            "Message": "Success",
            "Data": [
                {"CoinInfo": {"Name": "BTC", "FullName": "Bitcoin"},
                 "RAW": {"USD": {"PRICE": 45000.0, "MKTCAP": 880000000000.0, "CHANGEPCT24HOUR": -2.5}}},
                {"RAW": {"USD": {"PRICE": 1.0}}},
                {"CoinInfo": {"Name": "ETH", "FullName": "Ethereum"}}
            ]
        }"#;
        let coins = parse_top_coins(body, "USD").unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].symbol, "BTC");
        assert_eq!(coins[0].price, Some(45000.0));
        assert_eq!(coins[0].market_cap, Some(880_000_000_000.0));
        assert_eq!(coins[0].change_24h, Some(-2.5));
        assert_eq!(coins[1].symbol, "ETH");
        assert_eq!(coins[1].price, None);
    }

    #[test]
    fn test_candle_query_params() {
        let query = candle_query("btc", "eur", Timeframe::Minutes(5000));
        assert!(query.contains(&("fsym", "BTC".to_string())));
        assert!(query.contains(&("tsym", "EUR".to_string())));
        assert!(query.contains(&("limit", "2000".to_string())));
        assert!(query.contains(&("aggregate", "1".to_string())));
    }

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(Timeframe::Minutes(30).endpoint(), "/v2/histominute");
        assert_eq!(Timeframe::Hours(12).endpoint(), "/v2/histohour");
        assert_eq!(Timeframe::Days(7).endpoint(), "/v2/histoday");
        assert_eq!(Timeframe::default().endpoint(), "/v2/histohour");
    }

    /// Serveur HTTP local : une connexion par statut, dans l'ordre
    ///
    /// Retourne l'URL de base et le nombre de requêtes servies.
    async fn scripted_server(statuses: Vec<u16>) -> (String, tokio::task::JoinHandle<usize>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut served = 0;
            for status in statuses {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let body = if status == 200 { HISTO_OK } else { "" };
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
                served += 1;
            }
            served
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_succeeds() {
        let (base_url, server) = scripted_server(vec![429, 429, 200]).await;
        let client = CryptoCompareClient::with_base_url(base_url)
            .unwrap()
            .rate_limit_wait(Duration::ZERO);

        let candles = client.fetch_candles("BTC", "USD", Timeframe::Hours(2)).await.unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(server.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_three_attempts() {
        let (base_url, server) = scripted_server(vec![429, 429, 429]).await;
        let client = CryptoCompareClient::with_base_url(base_url)
            .unwrap()
            .rate_limit_wait(Duration::ZERO);

        let err = client.fetch_coin_list().await.unwrap_err();
        assert!(format!("{:#}", err).contains("rate limit exceeded after 3 attempts"));
        assert_eq!(server.await.unwrap(), 3);
    }

    // CONCEPT RUST : #[tokio::test]
    // - Runtime tokio dédié au test, permet .await
    #[tokio::test]
    async fn test_unreachable_host_returns_error() {
        let client = CryptoCompareClient::with_base_url("http://127.0.0.1:9").unwrap();
        let result = client.fetch_candles("BTC", "USD", Timeframe::Hours(1)).await;
        assert!(result.is_err());
    }
}
