// ============================================================================
// Coin browser - Liste paginée des coins
// ============================================================================
// Dessine la liste de coins (--list, --toplist) avec ratatui
//
//   ┌──────────── Top coins ─────────────┐
//   │          Page 1/3 · 120 coins      │
//   └────────────────────────────────────┘
//   ┌────────────────────────────────────┐
//   │  1. BTC   Bitcoin     $45000.00 ▼  │
//   │  2. ETH   Ethereum     $2400.00 ▲  │
//   └────────────────────────────────────┘
//   ┌────────────────────────────────────┐
//   │ [←→ / h l] Page  [↑↓ / j k] ...    │
//   └────────────────────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Layout : header / liste / footer
// 2. List + ListItem : une ligne par coin
// 3. Style : vert/rouge selon la variation 24h
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, error, info};

use crate::app::App;
use crate::models::CoinSummary;
use crate::ui::events::{
    is_down_event, is_next_page_event, is_previous_page_event, is_quit_event, is_up_event, Event,
    EventHandler,
};

/// Lignes prises par le header (3), le footer (3) et les bordures de la liste (2)
const CHROME_HEIGHT: u16 = 8;

/// Nombre de coins visibles pour une hauteur de terminal donnée
pub fn page_size_for_height(rows: u16) -> usize {
    rows.saturating_sub(CHROME_HEIGHT).max(1) as usize
}

// ============================================================================
// Formatage d'une ligne
// ============================================================================

/// Ligne d'un coin : rang, symbole, nom, prix, variation, capitalisation
pub fn format_coin_line(rank: usize, coin: &CoinSummary) -> String {
    let mut line = format!("{:>4}. {:<8} {:<24}", rank, coin.symbol.to_uppercase(), coin.name);

    if let Some(price) = coin.price {
        line.push_str(&format!(" {:>14}", format!("${:.2}", price)));
    }
    if let Some(change) = coin.change_24h {
        let arrow = if change >= 0.0 { "▲" } else { "▼" };
        line.push_str(&format!("  {} {:>6.2}%", arrow, change.abs()));
    }
    if let Some(cap) = coin.market_cap {
        line.push_str(&format!("  cap ${:.1}B", cap / 1e9));
    }

    line
}

/// Rendu texte de toute la liste (mode --plain, sortie non-interactive)
pub fn format_plain_list(title: &str, coins: &[CoinSummary]) -> String {
    let mut out = format!("{}:\n", title);
    for (index, coin) in coins.iter().enumerate() {
        out.push_str(&format!("{:>4}. {}\n", index + 1, coin.display()));
    }
    out
}

// ============================================================================
// Rendu
// ============================================================================

/// Dessine le navigateur complet
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Liste
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.title))
        .title_alignment(Alignment::Center);

    let text = Line::from(vec![
        Span::styled(
            app.page_label(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" · {} coins", app.coins.len())),
    ]);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.coins.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No coins to display",
            Style::default().fg(Color::Gray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let offset = app.page_offset();
    let items: Vec<ListItem> = app
        .current_page_items()
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let style = match coin.change_24h {
                Some(_) if coin.is_positive() => Style::default().fg(Color::Green),
                Some(_) => Style::default().fg(Color::Red),
                None => Style::default(),
            };

            let item = ListItem::new(format_coin_line(offset + index + 1, coin));
            if index == app.selected_index {
                item.style(style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED))
            } else {
                item.style(style)
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let shortcuts = Line::from(vec![
        Span::styled("[←→ / h l]", key_style),
        Span::raw(" Page  "),
        Span::styled("[↑↓ / j k]", key_style),
        Span::raw(" Select  "),
        Span::styled("[q]", key_style),
        Span::raw(" Quit"),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(shortcuts).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Boucle d'événements
// ============================================================================

/// Applique un événement à l'état du navigateur
pub fn handle_event(app: &mut App, event: &Event) {
    match event {
        Event::Resize(_, rows) => app.set_page_size(page_size_for_height(*rows)),
        Event::Key(_) if is_quit_event(event) => app.quit(),
        Event::Key(_) if is_next_page_event(event) => app.next_page(),
        Event::Key(_) if is_previous_page_event(event) => app.previous_page(),
        Event::Key(_) if is_up_event(event) => app.navigate_up(),
        Event::Key(_) if is_down_event(event) => app.navigate_down(),
        _ => {}
    }
}

/// Lance le navigateur interactif jusqu'à 'q' / Échap
///
/// Le terminal est restauré même si la boucle échoue.
pub fn run_browser(title: &str, coins: Vec<CoinSummary>) -> Result<()> {
    let mut terminal = setup_terminal()?;

    let rows = terminal.size().map(|area| area.height).unwrap_or(24);
    let mut app = App::new(title, coins, page_size_for_height(rows));
    info!(coins = app.coins.len(), pages = app.page_count(), "Starting coin browser");

    let result = run(&mut terminal, &mut app);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Coin browser exited normally"),
        Err(e) => error!(error = ?e, "Coin browser exited with error"),
    }
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let events = EventHandler::new();

    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;
        let event = events.next()?;
        handle_event(app, &event);
    }

    Ok(())
}

/// Raw mode + écran alternatif
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    undo_on_error(enter_alternate_screen(), disable_raw_mode)
}

fn enter_alternate_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Si l'initialisation échoue après le raw mode, on le désactive
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce() -> io::Result<()>) -> Result<T> {
    if let Err(e) = &result {
        error!(error = ?e, "Terminal setup failed, leaving raw mode");
        if let Err(undo_err) = undo() {
            error!(error = %undo_err, "Failed to disable raw mode");
        }
    }
    result
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================
