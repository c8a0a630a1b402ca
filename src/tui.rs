use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing_subscriber::fmt::MakeWriter;

use crate::diagnostics::DiagnosticSink;
use crate::error::KiraError;
use crate::loader::StudySource;
use crate::locale::NumberLocale;
use crate::render::{ContextCard, Fragment, LinkEntry, Overview, RowVariant, TaxonRow};
use crate::view::StudyViewer;

const LOGS_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Cards,
    Logs,
    Help,
}

/// Log pane buffer for the interactive view.
///
/// It is both the view's diagnostic sink and the `tracing` writer while the
/// alternate screen is up, so nothing is printed over the frame.
#[derive(Clone, Default)]
pub struct TuiSink {
    logs: Arc<Mutex<VecDeque<String>>>,
}

impl TuiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        if let Ok(mut logs) = self.logs.lock() {
            push_log(&mut logs, format!("[{}] {}", timestamp(), message.into()));
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.logs
            .lock()
            .map(|logs| logs.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for TuiSink {
    fn record_failure(&self, source: &str, error: &KiraError) {
        self.push(format!("load failed ({}) {source}: {error}", error.kind()));
    }
}

/// One formatted `tracing` event, flushed into the log pane on drop.
pub struct TuiLogWriter {
    sink: TuiSink,
    buf: Vec<u8>,
}

impl io::Write for TuiLogWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TuiLogWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines().map(str::trim_end).filter(|line| !line.is_empty()) {
            self.sink.push(line);
        }
    }
}

impl<'a> MakeWriter<'a> for TuiSink {
    type Writer = TuiLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TuiLogWriter {
            sink: self.clone(),
            buf: Vec::new(),
        }
    }
}

pub struct Tui {
    locale: NumberLocale,
    view: View,
    selected: usize,
    scroll: u16,
    log_scroll: u16,
    sink: TuiSink,
}

impl Tui {
    pub fn new(locale: NumberLocale) -> Self {
        Self::with_sink(locale, TuiSink::new())
    }

    /// Uses `sink` for the log pane, typically the same buffer the `tracing`
    /// subscriber writes to.
    pub fn with_sink(locale: NumberLocale, sink: TuiSink) -> Self {
        Self {
            locale,
            view: View::Cards,
            selected: 0,
            scroll: 0,
            log_scroll: 0,
            sink,
        }
    }

    /// Mounts the viewer, drives it until the user quits and restores the
    /// terminal on the way out.
    pub fn run<S: StudySource + 'static>(&mut self, source: S) -> miette::Result<()> {
        self.sink.push(format!("mount {}", source.describe()));
        let mut viewer = StudyViewer::mount(source, self.sink.clone());

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal, &mut viewer);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        viewer: &mut StudyViewer<TuiSink>,
    ) -> miette::Result<()> {
        loop {
            if viewer.pump() && viewer.state().metadata().is_some() {
                self.sink.push("study metadata loaded");
            }
            let fragments = viewer.render(self.locale);
            let logs = self.sink.snapshot();
            let tui: &Tui = self;
            terminal
                .draw(|frame| draw_ui(frame, tui, viewer.source(), &fragments, &logs))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key, viewer, &fragments) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        viewer: &mut StudyViewer<TuiSink>,
        fragments: &[Fragment],
    ) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.view == View::Cards {
                    return true;
                }
                self.view = View::Cards;
            }
            KeyCode::F(1) | KeyCode::Char('?') => self.view = View::Help,
            KeyCode::F(3) => self.view = View::Cards,
            KeyCode::F(4) => self.view = View::Logs,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let count = row_count(fragments);
                if count > 0 {
                    self.selected = (self.selected + 1).min(count - 1);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(name) = row_name(fragments, self.selected) {
                    viewer.toggle_group(name);
                }
            }
            KeyCode::PageUp => self.scroll_by(-5),
            KeyCode::PageDown => self.scroll_by(5),
            _ => {}
        }
        false
    }

    fn scroll_by(&mut self, delta: i16) {
        let target = if self.view == View::Logs {
            &mut self.log_scroll
        } else {
            &mut self.scroll
        };
        *target = (*target as i16 + delta).max(0) as u16;
    }
}

fn row_count(fragments: &[Fragment]) -> usize {
    fragments
        .iter()
        .find_map(|fragment| match fragment {
            Fragment::Taxa { rows } => Some(rows.len()),
            _ => None,
        })
        .unwrap_or(0)
}

fn row_name(fragments: &[Fragment], index: usize) -> Option<&str> {
    fragments.iter().find_map(|fragment| match fragment {
        Fragment::Taxa { rows } => rows.get(index).map(|row| row.name.as_str()),
        _ => None,
    })
}

fn draw_ui(
    frame: &mut ratatui::Frame,
    tui: &Tui,
    source: &str,
    fragments: &[Fragment],
    logs: &[String],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(source), chunks[0]);
    match tui.view {
        View::Cards => {
            let lines = card_lines(fragments, tui.selected);
            let body = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((tui.scroll, 0));
            frame.render_widget(body, chunks[1]);
        }
        View::Logs => frame.render_widget(draw_logs_view(logs, tui.log_scroll), chunks[1]),
        View::Help => draw_help(frame, chunks[1]),
    }
    frame.render_widget(draw_footer(tui.view), chunks[2]);
}

fn draw_header(source: &str) -> Paragraph<'static> {
    let line = Line::from(vec![
        Span::styled(
            "KIRA-SV",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::raw("   Source: "),
        Span::styled(source.to_string(), Style::default().fg(Color::Gray)),
    ]);
    Paragraph::new(vec![line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_footer(view: View) -> Paragraph<'static> {
    let hint = match view {
        View::Cards => "↑/↓ select group  Enter toggle  PgUp/PgDn scroll  F4 logs  ? help  q quit",
        View::Logs => "PgUp/PgDn scroll  Esc back  q quit",
        View::Help => "Esc back  q quit",
    };
    Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::TOP))
}

fn draw_help(frame: &mut ratatui::Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Help");
    let lines = vec![
        Line::from("Up/Down moves the group cursor; Enter or Space expands or collapses it."),
        Line::from("Only one group is expanded at a time."),
        Line::from("F3 cards  F4 logs  F1/? help"),
        Line::from("Use `kira-sv export --out study.html` for clickable NCBI links."),
    ];
    let view = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(view, area);
}

fn draw_logs_view(logs: &[String], scroll: u16) -> Paragraph<'static> {
    let visible = 20usize;
    let start = logs.len().saturating_sub(scroll as usize + visible);
    let mut lines = Vec::with_capacity(visible + 1);
    lines.push(Line::from(section_title("LOGS (scrollable)")));
    for line in logs.iter().skip(start).take(visible) {
        lines.push(Line::from(line.clone()));
    }
    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn card_lines(fragments: &[Fragment], selected: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for fragment in fragments {
        match fragment {
            Fragment::Overview(overview) => overview_lines(&mut lines, overview),
            Fragment::Links { entries } => link_lines(&mut lines, entries),
            Fragment::Taxa { rows } => taxa_lines(&mut lines, rows, selected),
            Fragment::EcologicalContext(card) => context_lines(&mut lines, card),
        }
        lines.push(Line::from(""));
    }
    lines
}

fn section_title(title: &str) -> Span<'static> {
    Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn labelled(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::raw(value.to_string()),
    ])
}

fn overview_lines(lines: &mut Vec<Line<'static>>, overview: &Overview) {
    lines.push(Line::from(Span::styled(
        overview.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(overview.abstract_text.clone()));
    let mut badges = Vec::new();
    for badge in &overview.badges {
        badges.push(Span::styled(
            format!(" {} ", badge.text),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
        badges.push(Span::raw(" "));
    }
    lines.push(Line::from(badges));
    for tile in &overview.tiles {
        lines.push(Line::from(vec![
            Span::styled(
                tile.primary.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", tile.secondary),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }
}

fn link_lines(lines: &mut Vec<Line<'static>>, entries: &[LinkEntry]) {
    lines.push(Line::from(section_title("NCBI DATABASE LINKS")));
    for entry in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<15}", entry.label), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:<16}", entry.identifier),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                entry.href.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
}

fn variant_style(variant: RowVariant) -> (&'static str, Color) {
    match variant {
        RowVariant::Primary => ("◆", Color::Cyan),
        RowVariant::Secondary => ("●", Color::Green),
        RowVariant::Tertiary => ("▲", Color::Yellow),
    }
}

fn taxa_lines(lines: &mut Vec<Line<'static>>, rows: &[TaxonRow], selected: usize) {
    lines.push(Line::from(section_title("IDENTIFIED TAXA")));
    for row in rows {
        let (icon, color) = variant_style(row.variant);
        let cursor = if row.index == selected { ">" } else { " " };
        let toggle = if row.expanded { "▾" } else { "▸" };
        let mut name_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if row.index == selected {
            name_style = name_style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::raw(format!("{cursor}{toggle} ")),
            Span::styled(format!("{icon} "), Style::default().fg(color)),
            Span::styled(row.name.clone(), name_style),
            Span::styled(
                format!("   {} ASVs · {}", row.asv_count, row.share),
                Style::default().fg(Color::Gray),
            ),
        ]));
        lines.push(Line::from(format!("     {}", row.description)));
        if let Some(detail) = &row.detail {
            lines.push(Line::from(vec![
                Span::raw("     "),
                Span::styled("Role: ", Style::default().fg(Color::Gray)),
                Span::raw(detail.ecological_role.clone()),
            ]));
            let mut chips = vec![Span::raw("     ")];
            for member in &detail.members {
                chips.push(Span::styled(
                    format!("[{member}]"),
                    Style::default().fg(color),
                ));
                chips.push(Span::raw(" "));
            }
            lines.push(Line::from(chips));
        }
    }
}

fn context_lines(lines: &mut Vec<Line<'static>>, card: &ContextCard) {
    lines.push(Line::from(section_title("ECOLOGICAL CONTEXT")));
    lines.push(labelled("Habitat", &card.habitat));
    lines.push(labelled("Depth Range", &card.depth_range));
    lines.push(labelled("Environmental Factors", &card.environmental_factors));
    lines.push(labelled("Study Focus", &card.study_focus));
}

fn push_log(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > LOGS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
