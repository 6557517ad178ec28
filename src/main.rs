// ============================================================================
// candlestick - Graphiques en chandeliers dans le terminal
// ============================================================================
// Flags → récupération CryptoCompare → moteur de rendu → stdout
//
// CONCEPTS RUST CLÉS :
// 1. #[tokio::main] : runtime async pour les appels HTTP
// 2. anyhow : erreurs avec contexte jusqu'au main
// 3. tracing : logs vers fichier, stdout reste réservé au graphique
// ============================================================================

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};

use candlestick::api::{CryptoCompareClient, DEFAULT_TOP_LIMIT};
use candlestick::chart::render_chart;
use candlestick::cli::{Cli, Command};
use candlestick::ui::{format_plain_list, run_browser};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging hors de stdout
// - Le graphique est écrit sur stdout (redirigeable, pipeable)
// - Les logs vont dans un fichier à rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/candlestick/logs/candlestick.log
/// - macOS : ~/Library/Application Support/candlestick/logs/candlestick.log
/// - Windows : C:\Users\<user>\AppData\Local\candlestick\logs\candlestick.log
/// - À défaut : ./logs
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/candlestick/logs/candlestick.log
/// RUST_LOG=candlestick=trace candlestick -c ETH
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("candlestick").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "candlestick.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG=debug, RUST_LOG=candlestick=trace, ...
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candlestick=debug,info".into()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Si le logging échoue, on continue sans
    if let Err(e) = init_logging() {
        eprintln!("Warning: failed to initialize logging: {:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "candlestick exited with error");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Exécute la commande demandée
async fn run(cli: Cli) -> Result<()> {
    info!(command = ?cli.command(), "candlestick starting up");

    if !cli.technical_indicators.is_empty() {
        warn!(indicators = ?cli.technical_indicators, "Technical indicators are not supported and will be ignored");
        eprintln!(
            "Warning: technical indicators are not supported, ignoring: {}",
            cli.technical_indicators.join(", ")
        );
    }

    let client = CryptoCompareClient::new()?;

    match cli.command() {
        Command::List => {
            let coins = client.fetch_coin_list().await?;
            show_coins(&cli, "Available coins", coins)
        }
        Command::TopList(limit) => {
            let coins = client.fetch_top_coins(limit).await?;
            let title = if limit == DEFAULT_TOP_LIMIT {
                "Top cryptocurrencies".to_string()
            } else {
                format!("Top {} cryptocurrencies", limit)
            };
            show_coins(&cli, &title, coins)
        }
        Command::Chart => draw_chart(&cli, &client).await,
    }
}

/// Liste de coins : navigateur interactif ou texte brut (--plain)
fn show_coins(cli: &Cli, title: &str, coins: Vec<candlestick::models::CoinSummary>) -> Result<()> {
    if cli.plain {
        print!("{}", format_plain_list(title, &coins));
        return Ok(());
    }
    run_browser(title, coins)
}

/// Récupère l'historique et affiche le graphique
async fn draw_chart(cli: &Cli, client: &CryptoCompareClient) -> Result<()> {
    let timeframe = cli.timeframe();
    let candles = client
        .fetch_candles(&cli.coin, &cli.currency, timeframe)
        .await?;

    let options = cli.chart_options();
    debug!(?options, candles = candles.len(), "Rendering chart");

    let chart = render_chart(&candles, &options, &cli.theme())
        .with_context(|| format!("Failed to render {} chart", cli.pair_label()))?;

    print!("{}", chart);
    info!(clipped = chart.clipped_candles, "Chart printed");
    Ok(())
}
