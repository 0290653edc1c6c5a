//! Ratatui-based terminal UI.
//!
//! The TUI is a pricing form: one stone (or two in recut mode) with its grades,
//! discount control and optional price overrides. Every change re-runs the
//! shared quote pipeline and the results panel is redrawn from the report
//! formatters.

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::pipeline::{Pricer, QuoteOutcome, StoneRequest};
use crate::cli::TuiArgs;
use crate::data::{RateCache, RateSource};
use crate::domain::{self, ComparisonResult, DiscountToggle, PriceInputs, Shape, StoneSpec};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::pricing::PriceTable;
use crate::report::{fmt_usd, format_comparison, format_last_updated, format_outcome};

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Load before touching the terminal so data errors print normally.
    let table = crate::io::load_price_table(&args.source.paths())?;
    let source = crate::app::rate_source(&args.rate)?;
    let rates = crate::app::rate_cache(&args.rate);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(table, source, rates, args.recut);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Weight,
    Shape,
    Color,
    Clarity,
    Direction,
    Discount,
    PricePerCt,
    Total,
    BulkTier,
}

const FIELDS: [Field; 9] = [
    Field::Weight,
    Field::Shape,
    Field::Color,
    Field::Clarity,
    Field::Direction,
    Field::Discount,
    Field::PricePerCt,
    Field::Total,
    Field::BulkTier,
];

impl Field {
    fn is_text(self) -> bool {
        matches!(self, Field::Weight | Field::Discount | Field::PricePerCt | Field::Total)
    }
}

/// Editable state for one stone.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StoneForm {
    weight: f64,
    shape: Shape,
    color: domain::Color,
    clarity: domain::Clarity,
    toggle: DiscountToggle,
    inputs: PriceInputs,
}

impl Default for StoneForm {
    fn default() -> Self {
        Self {
            weight: 1.0,
            shape: Shape::Round,
            color: domain::Color::D,
            clarity: domain::Clarity::If,
            toggle: DiscountToggle::default(),
            inputs: PriceInputs::default(),
        }
    }
}

impl StoneForm {
    fn request(&self, use_bulk_weight_tier: bool) -> StoneRequest {
        StoneRequest {
            stone: StoneSpec {
                weight: self.weight,
                shape: self.shape,
                color: self.color,
                clarity: self.clarity,
                use_bulk_weight_tier,
            },
            toggle: self.toggle,
            inputs: self.inputs,
        }
    }
}

struct App {
    table: PriceTable,
    source: Box<dyn RateSource>,
    rates: RateCache,
    recut: bool,
    /// Shared by both stones.
    bulk_tier: bool,
    stones: [StoneForm; 2],
    active_stone: usize,
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    status: String,
    outcomes: [Option<QuoteOutcome>; 2],
    comparison: Option<ComparisonResult>,
}

impl App {
    fn new(table: PriceTable, source: Box<dyn RateSource>, rates: RateCache, recut: bool) -> Self {
        let mut app = Self {
            table,
            source,
            rates,
            recut,
            bulk_tier: false,
            stones: [StoneForm::default(); 2],
            active_stone: 0,
            selected_field: 0,
            editing: false,
            edit_buffer: String::new(),
            status: String::new(),
            outcomes: [None, None],
            comparison: None,
        };
        app.recompute();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn field(&self) -> Field {
        FIELDS[self.selected_field]
    }

    fn stone_mut(&mut self) -> &mut StoneForm {
        &mut self.stones[self.active_stone]
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_text_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELDS.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if self.field().is_text() {
                    self.edit_buffer = self.field_text(self.field());
                    self.editing = true;
                    self.status = "Editing. Enter to apply, Esc to cancel (empty clears an override).".to_string();
                } else {
                    self.adjust_field(1);
                }
            }
            KeyCode::Tab => {
                if self.recut {
                    self.active_stone = 1 - self.active_stone;
                    self.status = format!("Editing {}", stone_label(self.recut, self.active_stone));
                }
            }
            KeyCode::Char('m') => {
                self.recut = !self.recut;
                if !self.recut {
                    self.active_stone = 0;
                }
                self.recompute();
            }
            KeyCode::Char('x') => {
                self.stone_mut().inputs = PriceInputs::default();
                self.recompute();
            }
            KeyCode::Char('u') => {
                self.rates.invalidate();
                self.recompute();
            }
            _ => {}
        }

        false
    }

    fn handle_text_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_text_input();
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_text_input(&mut self) {
        let field = self.field();
        let raw = self.edit_buffer.trim().to_string();

        if raw.is_empty() {
            match field {
                Field::PricePerCt => self.stone_mut().inputs.price_per_unit = None,
                Field::Total => self.stone_mut().inputs.total = None,
                _ => {
                    self.status = "A value is required.".to_string();
                    return;
                }
            }
            self.recompute();
            return;
        }

        let value: f64 = match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                self.status = format!("Invalid number '{raw}'");
                return;
            }
        };

        match field {
            Field::Weight if value >= 0.01 => {
                self.stone_mut().weight = value;
                self.stone_mut().inputs = PriceInputs::default();
            }
            Field::Weight => {
                self.status = "Weight must be at least 0.01ct.".to_string();
                return;
            }
            Field::Discount if value <= 100.0 => {
                self.stone_mut().toggle.magnitude = value;
                self.stone_mut().inputs = PriceInputs::default();
            }
            Field::Discount => {
                self.status = "Discount must be between 0 and 100.".to_string();
                return;
            }
            Field::PricePerCt => {
                self.stone_mut().inputs = PriceInputs {
                    price_per_unit: Some(value),
                    total: None,
                };
            }
            Field::Total => {
                self.stone_mut().inputs = PriceInputs {
                    price_per_unit: None,
                    total: Some(value),
                };
            }
            _ => return,
        }
        self.recompute();
    }

    fn adjust_field(&mut self, delta: i32) {
        let forward = delta >= 0;
        let field = self.field();
        match field {
            Field::PricePerCt | Field::Total => return,
            Field::BulkTier => {
                self.bulk_tier = !self.bulk_tier;
                self.recompute();
                return;
            }
            _ => {}
        }

        let stone = self.stone_mut();

        match field {
            Field::Weight => {
                let step = if forward { 0.01 } else { -0.01 };
                stone.weight = ((stone.weight + step) * 100.0).round().max(1.0) / 100.0;
            }
            Field::Shape => stone.shape = if forward { stone.shape.next() } else { stone.shape.prev() },
            Field::Color => stone.color = if forward { stone.color.next() } else { stone.color.prev() },
            Field::Clarity => {
                stone.clarity = if forward {
                    stone.clarity.next()
                } else {
                    stone.clarity.prev()
                }
            }
            Field::Direction => stone.toggle.direction = stone.toggle.direction.toggled(),
            Field::Discount => {
                let step = if forward { 0.5 } else { -0.5 };
                stone.toggle.magnitude = (stone.toggle.magnitude + step).clamp(0.0, 100.0);
            }
            Field::PricePerCt | Field::Total | Field::BulkTier => {}
        }

        // A change to the stone or the discount hands control back to the discount.
        stone.inputs = PriceInputs::default();
        self.recompute();
    }

    fn recompute(&mut self) {
        let now = Utc::now();
        let a = self.stones[0].request(self.bulk_tier);
        let b = self.stones[1].request(self.bulk_tier);

        let mut pricer = Pricer::new(&self.table, &mut self.rates, self.source.as_ref());
        if self.recut {
            let out = pricer.recut(&a, &b, now);
            self.outcomes = [Some(out.a), Some(out.b)];
            self.comparison = out.comparison;
        } else {
            self.outcomes = [Some(pricer.quote(&a, now)), None];
            self.comparison = None;
        }

        self.status = self.outcome_status();
    }

    fn outcome_status(&self) -> String {
        let outcomes = self.outcomes.iter().flatten();
        for outcome in outcomes.clone() {
            if let QuoteOutcome::NoMatch(no_match) = outcome {
                return no_match.to_string();
            }
        }
        for outcome in outcomes {
            if let Some(warning) = outcome.priced().and_then(|q| q.rate.warning.as_ref()) {
                return warning.clone();
            }
        }
        "Priced.".to_string()
    }

    /// Current text for a text field (override, or the computed value).
    fn field_text(&self, field: Field) -> String {
        let stone = &self.stones[self.active_stone];
        let quote = self.outcomes[self.active_stone]
            .as_ref()
            .and_then(QuoteOutcome::priced)
            .map(|q| q.quote);
        match field {
            Field::Weight => format!("{:.2}", stone.weight),
            Field::Discount => format!("{:.2}", stone.toggle.magnitude),
            Field::PricePerCt => quote.map(|q| format!("{:.2}", q.price_per_unit_final)).unwrap_or_default(),
            Field::Total => quote
                .map(|q| format!("{:.2}", q.total_price_source_currency))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn field_line(&self, field: Field) -> String {
        let stone = &self.stones[self.active_stone];
        let quote = self.outcomes[self.active_stone]
            .as_ref()
            .and_then(QuoteOutcome::priced)
            .map(|q| q.quote);
        let computed = |v: Option<f64>| v.map(fmt_usd).unwrap_or_else(|| "-".to_string());

        match field {
            Field::Weight => format!("Weight (ct): {:.2}", stone.weight),
            Field::Shape => format!("Shape: {}", stone.shape.display_name()),
            Field::Color => format!("Color: {}", stone.color.code()),
            Field::Clarity => format!("Clarity: {}", stone.clarity.code()),
            Field::Direction => format!("Direction: {} {:?}", stone.toggle.direction.symbol(), stone.toggle.direction),
            Field::Discount => format!("Discount %: {:.2}", stone.toggle.magnitude),
            Field::PricePerCt => match stone.inputs.price_per_unit {
                Some(v) => format!("Price/ct (USD): {} (entered)", fmt_usd(v)),
                None => format!("Price/ct (USD): {}", computed(quote.map(|q| q.price_per_unit_final))),
            },
            Field::Total => match stone.inputs.total {
                Some(v) => format!("Total (USD): {} (entered)", fmt_usd(v)),
                None => format!("Total (USD): {}", computed(quote.map(|q| q.total_price_source_currency))),
            },
            Field::BulkTier => format!("Use 5ct tier for 5ct+: {}", if self.bulk_tier { "yes" } else { "no" }),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mode = if self.recut { "recut (A → B)" } else { "single stone" };
        let mut lines: Vec<Line> = vec![Line::from(vec![
            Span::styled("dpx", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" diamond price calculator | mode: {mode}")),
        ])];

        let updated = format_last_updated(self.table.latest_as_of()).unwrap_or_else(|| "Last updated: -".to_string());
        let rate = self
            .rates
            .cached()
            .map(|r| format!("USD→INR ₹{:.2} ({:?})", r.rate, r.origin))
            .unwrap_or_else(|| "USD→INR -".to_string());
        lines.push(Line::from(Span::styled(
            format!("{updated} | {rate}"),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_results(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FIELDS
            .iter()
            .map(|&field| ListItem::new(self.field_line(field)))
            .collect();

        let title = stone_label(self.recut, self.active_stone);
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new(format!("> {}", self.edit_buffer))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut text = String::new();
        for (idx, outcome) in self.outcomes.iter().enumerate() {
            if let Some(outcome) = outcome {
                text.push_str(&format_outcome(stone_label(self.recut, idx), outcome));
                text.push('\n');
            }
        }
        if let Some(cmp) = &self.comparison {
            text.push_str(&format_comparison(cmp));
        }

        let lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Quote").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  Tab stone  m mode  x clear  u rate  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn stone_label(recut: bool, idx: usize) -> &'static str {
    match (recut, idx) {
        (false, _) => "Diamond",
        (true, 0) => "Diamond A",
        (true, _) => "Diamond B",
    }
}
