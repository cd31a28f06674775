use crate::market::catalog::Asset;
use crate::market::indicators::HistorySummary;
use crate::market::signals::{recommendation, SignalKind};
use crate::ui::core::format::{format_change, format_grouped, format_money};
use crate::ui::core::state::{AppState, DashboardView};
use chrono::Local;
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use rand::rngs::StdRng;
use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

type DynError = Box<dyn Error + Send + Sync>;

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut io::stdout()) {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Leaves raw mode, the alternate screen and the hidden cursor behind.
/// The screen is restored even when raw mode could not be reset.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(out, LeaveAlternateScreen, Show)?;
    raw
}

pub struct Dashboard {
    state: AppState,
    rng: StdRng,
    tick_rate: Duration,
}

impl Dashboard {
    pub fn new(state: AppState, rng: StdRng, tick_rate: Duration) -> Self {
        Self {
            state,
            rng,
            tick_rate,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<(), DynError> {
        // Restored on every exit path once raw mode is on
        enable_raw_mode()?;
        let _guard = TerminalGuard;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.event_loop(&mut terminal).await
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), DynError> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick_rate);

        while self.state.running {
            // Redraw every tick and after every key
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                _ = ticker.tick() => {}
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key_input(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
            }
        }
        log::info!("Dashboard loop finished");
        Ok(())
    }

    pub fn handle_key_input(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.running = false;
            return;
        }

        // Alerts view routes text keys to the price input
        let in_alerts = self.state.view == DashboardView::Alerts;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.running = false,
            KeyCode::Tab => self.state.view = self.state.view.next(),
            KeyCode::BackTab => self.state.view = self.state.view.previous(),
            KeyCode::Char('m') => self.state.view = DashboardView::Markets,
            KeyCode::Char('s') => self.state.view = DashboardView::Signals,
            KeyCode::Char('a') => self.state.view = DashboardView::Alerts,
            KeyCode::Char('r') => {
                if let Err(e) = self.state.regenerate_histories(&mut self.rng) {
                    log::error!("Failed to regenerate histories: {}", e);
                }
            }
            KeyCode::Up if in_alerts => self.state.alert_cursor_previous(),
            KeyCode::Down if in_alerts => self.state.alert_cursor_next(),
            KeyCode::Up => self.state.select_previous(),
            KeyCode::Down => self.state.select_next(),
            KeyCode::Char(' ') if in_alerts => {
                self.state.toggle_alert_at_cursor();
            }
            KeyCode::Enter if in_alerts => {
                if let Err(e) = self.state.add_alert_for_selected() {
                    log::warn!("Alert not added: {}", e);
                }
            }
            KeyCode::Backspace if in_alerts => self.state.pop_input(),
            KeyCode::Char(c) if in_alerts => self.state.push_input(c),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Err(e) = self.state.select(&c.to_string()) {
                    log::debug!("{}", e);
                }
            }
            _ => (),
        }
    }

    pub fn draw<B: Backend>(&self, f: &mut Frame<B>) {
        // Header, tabs, view, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(f.size());

        self.render_header(f, chunks[0]);
        self.render_tabs(f, chunks[1]);
        self.render_main_content(f, chunks[2]);
        self.render_footer(f, chunks[3]);
    }

    fn render_header<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let selected = match self.state.selected_asset() {
            Some(asset) => Span::styled(
                format!("{} {}", asset.symbol, format_money(asset.price)),
                Style::default().fg(change_color(asset.change_24h)),
            ),
            None => Span::styled("no asset", Style::default().fg(Color::Red)),
        };

        let header = Paragraph::new(Text::from(vec![
            Line::from(vec![
                Span::styled(
                    "CRYPTOBOARD ",
                    Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD),
                ),
                selected,
            ]),
            Line::from(Span::styled(
                format!(
                    "Trading signals and market monitoring | {} | Alerts: {}",
                    Local::now().format("%H:%M:%S"),
                    self.state.alerts().len()
                ),
                Style::default().fg(Color::Gray),
            )),
        ]))
        .block(Block::default().borders(Borders::BOTTOM));

        f.render_widget(header, area);
    }

    fn render_tabs<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let titles: Vec<Line> = DashboardView::ALL
            .iter()
            .map(|v| Line::from(v.title()))
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.state.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_widget(tabs, area);
    }

    fn render_main_content<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        match self.state.view {
            DashboardView::Markets => self.render_markets_view(f, area),
            DashboardView::Signals => self.render_signals_view(f, area),
            DashboardView::Alerts => self.render_alerts_view(f, area),
        }
    }

    fn render_markets_view<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.state.catalog().len() as u16 + 3),
                Constraint::Min(8),
            ])
            .split(area);

        // Asset table
        let selected = self.state.selected_index();
        let rows = self
            .state
            .catalog()
            .assets()
            .iter()
            .enumerate()
            .map(|(i, asset)| {
                Row::new(vec![
                    Cell::from(asset.name.as_str()),
                    Cell::from(asset.symbol.as_str()),
                    Cell::from(format_money(asset.price)),
                    Cell::from(Span::styled(
                        format_change(asset.change_24h),
                        Style::default().fg(change_color(asset.change_24h)),
                    )),
                    Cell::from(format_money(asset.volume)),
                    Cell::from(format_money(asset.market_cap)),
                ])
                .style(if i == selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                })
            });

        let table = Table::new(rows)
            .header(
                Row::new(vec!["Name", "Symbol", "Price", "24h", "Volume 24h", "Market Cap"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title("Markets"))
            .widths(&[
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Length(12),
            ]);

        f.render_widget(table, chunks[0]);

        // Chart and details for the selected asset
        if self.state.catalog().is_empty() {
            let message = Paragraph::new("No assets loaded")
                .block(Block::default().borders(Borders::ALL).title("Chart"));
            f.render_widget(message, chunks[1]);
            return;
        }
        if let Some(asset) = self.state.selected_asset() {
            self.render_asset_detail(f, chunks[1], asset);
        }
    }

    fn render_asset_detail<B: Backend>(&self, f: &mut Frame<B>, area: Rect, asset: &Asset) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(34)])
            .split(area);

        self.render_price_chart(f, chunks[0], asset);

        let details = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                format!("{} ({})", asset.name, asset.symbol),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw("Price: "),
                Span::styled(format_money(asset.price), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(vec![
                Span::raw("24h: "),
                Span::styled(
                    format_change(asset.change_24h),
                    Style::default().fg(change_color(asset.change_24h)),
                ),
            ]),
            Line::from(""),
            Line::from("Volume 24h"),
            Line::from(format_grouped(asset.volume)),
            Line::from("Market cap"),
            Line::from(format_grouped(asset.market_cap)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Details"));

        f.render_widget(details, chunks[1]);
    }

    fn render_price_chart<B: Backend>(&self, f: &mut Frame<B>, area: Rect, asset: &Asset) {
        let history = &asset.price_history;
        if history.len() < 2 {
            let message = Paragraph::new("Insufficient data for chart")
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(message, area);
            return;
        }

        // Index on x, price on y
        let points: Vec<(f64, f64)> = history
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect();

        let min_price = history.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max_price = history
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);
        // Keep a flat line off the chart border
        let pad = ((max_price - min_price) * 0.05).max(0.01);
        let (low, high) = (min_price - pad, max_price + pad);
        let last_x = (history.len() - 1) as f64;

        let first_label = history.first().map(|p| p.time.clone()).unwrap_or_default();
        let last_label = history.last().map(|p| p.time.clone()).unwrap_or_default();

        let datasets = vec![Dataset::default()
            .name(asset.symbol.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(change_color(asset.change_24h)))
            .data(&points)];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} Price History (24h)", asset.symbol)),
            )
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, last_x])
                    .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([low, high])
                    .labels(vec![
                        Span::raw(format!("{:.2}", min_price)),
                        Span::raw(format!("{:.2}", max_price)),
                    ]),
            );

        f.render_widget(chart, area);
    }

    fn render_signals_view<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let symbol = self
            .state
            .selected_asset()
            .map(|a| a.symbol.as_str())
            .unwrap_or("-");
        let signals = self.state.signals();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(signals.len() as u16 * 2 + 2),
                Constraint::Length(7),
                Constraint::Min(3),
            ])
            .split(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Trading signals for {}", symbol));
        let inner_area = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);

        // Static signals
        if !signals.is_empty() {
            self.render_signal_rows(f, inner_area);
        }

        // Indicators over the synthetic history
        self.render_history_indicators(f, chunks[1]);

        // Recommendation

        let advice = Paragraph::new(recommendation(signals))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Overall recommendation"),
            );
        f.render_widget(advice, chunks[2]);
    }

    fn render_signal_rows<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let signals = self.state.signals();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(2); signals.len()])
            .split(area);

        for (signal, row) in signals.iter().zip(rows.iter()) {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(1)])
                .split(*row);

            let color = kind_color(signal.kind);
            let text = Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("{} ", kind_arrow(signal.kind)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<18}", signal.indicator),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<14}", signal.kind.description()),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(format!("{:.2}", signal.value), Style::default().fg(color)),
            ]));
            f.render_widget(text, parts[0]);

            // Strength bar
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
                .percent(u16::from(signal.strength.min(100)))
                .label(format!("Strength {}%", signal.strength));
            f.render_widget(gauge, parts[1]);
        }
    }

    fn render_history_indicators<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Indicators over 24h history");

        let summary = match self.state.selected_asset() {
            Some(asset) => HistorySummary::from_history(&asset.price_history),
            None => Ok(None),
        };

        let summary = match summary {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                f.render_widget(Paragraph::new("No history").block(block), area);
                return;
            }
            Err(e) => {
                log::error!("Indicator calculation failed: {}", e);
                f.render_widget(Paragraph::new(e.to_string()).block(block), area);
                return;
            }
        };

        let rows = summary.readings().into_iter().map(|(name, reading, kind)| {
            Row::new(vec![
                Cell::from(name),
                Cell::from(reading),
                Cell::from(Span::styled(
                    kind.description(),
                    Style::default().fg(kind_color(kind)),
                )),
            ])
        });

        let table = Table::new(rows)
            .header(
                Row::new(vec!["Indicator", "Reading", "Reading says"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block)
            .widths(&[
                Constraint::Length(20),
                Constraint::Length(22),
                Constraint::Length(14),
            ]);

        f.render_widget(table, area);
    }

    fn render_alerts_view<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let symbol = self
            .state
            .selected_asset()
            .map(|a| a.symbol.as_str())
            .unwrap_or("-");

        // Price input
        let input = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Price for {}: ", symbol),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!("{}_", self.state.price_input),
                Style::default().fg(Color::Yellow),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("New alert (Enter to add)"),
        );
        f.render_widget(input, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title("Price alerts");

        if self.state.alerts().is_empty() {
            let message = Paragraph::new("No active alerts").block(block);
            f.render_widget(message, chunks[1]);
            return;
        }

        // Alert list
        let cursor = self.state.alert_cursor();
        let rows = self.state.alerts().alerts().iter().enumerate().map(|(i, alert)| {
            let status = if alert.active {
                Span::styled("Active", Style::default().fg(Color::Green))
            } else {
                Span::styled("Disabled", Style::default().fg(Color::DarkGray))
            };

            Row::new(vec![
                Cell::from(alert.symbol.as_str()),
                Cell::from(format!("{} {}", alert.condition.label(), format_money(alert.price))),
                Cell::from(status),
            ])
            .style(if i == cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            })
        });

        let table = Table::new(rows)
            .header(
                Row::new(vec!["Symbol", "Condition", "Status"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block)
            .widths(&[
                Constraint::Length(10),
                Constraint::Length(22),
                Constraint::Length(10),
            ]);

        f.render_widget(table, chunks[1]);
    }

    fn render_footer<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));

        let mut controls = vec![Span::raw("Controls: "), key("Tab"), Span::raw(" View  ")];
        match self.state.view {
            DashboardView::Markets | DashboardView::Signals => controls.extend([
                key("↑/↓"),
                Span::raw(" Select asset  "),
                key("1-9"),
                Span::raw(" Asset by id  "),
                key("r"),
                Span::raw(" Regenerate  "),
                key("m/s/a"),
                Span::raw(" Jump  "),
            ]),
            DashboardView::Alerts => controls.extend([
                key("↑/↓"),
                Span::raw(" Move  "),
                key("Space"),
                Span::raw(" Toggle  "),
                key("0-9 . -"),
                Span::raw(" Price  "),
                key("Enter"),
                Span::raw(" Add  "),
            ]),
        }
        controls.extend([key("q"), Span::raw(" Quit")]);

        let footer = Paragraph::new(Line::from(controls))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::TOP));

        f.render_widget(footer, area);
    }
}

fn change_color(change: f64) -> Color {
    if change < 0.0 {
        Color::Red
    } else {
        Color::Green
    }
}

fn kind_color(kind: SignalKind) -> Color {
    match kind {
        SignalKind::Buy => Color::Green,
        SignalKind::Sell => Color::Red,
        SignalKind::Neutral => Color::Gray,
    }
}

fn kind_arrow(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Buy => "▲",
        SignalKind::Sell => "▼",
        SignalKind::Neutral => "■",
    }
}
