// TUI module - interactive profile dashboard
use crate::ascii_charts::parse_hex;
use crate::cli_output::{describe, format_updated};
use crate::client::{AnalysisClient, FetchError};
use crate::models::{AnalysisRecord, MAX_CATEGORY_SCORE, MAX_TOTAL_SCORE};
use crate::session::{Phase, Session, Ticket};
use crate::view_model::ViewModel;
use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::warn;

const TAB_COUNT: usize = 3;

type Outcome = (Ticket, Result<AnalysisRecord, FetchError>);

/// What the event loop should do after a key press
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Fetch(Ticket),
    Open(String),
}

/// App state for the TUI
pub struct App {
    session: Session,
    pub input: String,
    pub selected_tab: usize,
    pub selected_row: usize,
    pub status_message: String,
    started: Instant,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            input: String::new(),
            selected_tab: 0,
            selected_row: 0,
            status_message: "Enter a GitHub username or profile URL".to_string(),
            started: Instant::now(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn submit(&mut self) -> Option<Ticket> {
        let ticket = self.session.submit(&self.input)?;
        self.started = Instant::now();
        self.selected_tab = 0;
        self.selected_row = 0;
        self.status_message = format!("Analyzing {}...", ticket.handle());
        Some(ticket)
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: Result<AnalysisRecord, FetchError>) {
        if !self.session.complete(ticket, outcome) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        self.status_message = match self.session.phase() {
            Phase::Loaded(record) => format!("Analyzed {} in {:.1}s", record.handle, elapsed),
            Phase::Failed { message } => message.clone(),
            _ => self.status_message.clone(),
        };
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.selected_tab = 0;
        self.selected_row = 0;
        self.status_message = "Enter a GitHub username or profile URL".to_string();
    }

    pub fn next_tab(&mut self) {
        self.selected_tab = (self.selected_tab + 1) % TAB_COUNT;
        self.selected_row = 0;
    }

    pub fn prev_tab(&mut self) {
        self.selected_tab = if self.selected_tab == 0 {
            TAB_COUNT - 1
        } else {
            self.selected_tab - 1
        };
        self.selected_row = 0;
    }

    fn repo_count(&self) -> usize {
        self.session.record().map_or(0, |r| r.top_repos.len())
    }

    pub fn next_row(&mut self) {
        let max_rows = self.repo_count();
        if max_rows > 0 {
            self.selected_row = (self.selected_row + 1) % max_rows;
        }
    }

    pub fn prev_row(&mut self) {
        let max_rows = self.repo_count();
        if max_rows > 0 {
            self.selected_row = if self.selected_row == 0 {
                max_rows - 1
            } else {
                self.selected_row - 1
            };
        }
    }

    fn selected_repo_url(&self) -> Option<String> {
        self.session
            .record()?
            .top_repos
            .get(self.selected_row)
            .map(|repo| repo.url.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if self.session.is_loading() {
            if key.code == KeyCode::Esc {
                self.reset();
            }
            return Action::None;
        }

        if self.session.record().is_none() {
            return match key.code {
                // Esc clears a failed lookup first, then quits from the idle form
                KeyCode::Esc if self.session.error_message().is_some() => {
                    self.reset();
                    Action::None
                }
                KeyCode::Esc => Action::Quit,
                KeyCode::Enter => self.submit().map_or(Action::None, Action::Fetch),
                KeyCode::Backspace => {
                    self.input.pop();
                    Action::None
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    Action::None
                }
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => {
                self.next_tab();
                Action::None
            }
            KeyCode::BackTab => {
                self.prev_tab();
                Action::None
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.selected_tab = c as usize - '1' as usize;
                self.selected_row = 0;
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.next_row();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.prev_row();
                Action::None
            }
            KeyCode::Char('o') | KeyCode::Enter if self.selected_tab == 1 => self
                .selected_repo_url()
                .map_or(Action::None, Action::Open),
            KeyCode::Char('n') | KeyCode::Char('r') => {
                self.reset();
                Action::None
            }
            _ => Action::None,
        }
    }
}

/// Run the TUI application. Must be called from within a tokio runtime.
pub fn run_tui(client: AnalysisClient, initial_input: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

    if let Some(input) = initial_input {
        app.input = input;
        if let Some(ticket) = app.submit() {
            spawn_fetch(&client, ticket, &tx);
        }
    }

    // Main loop
    let result = loop {
        while let Ok((ticket, outcome)) = rx.try_recv() {
            app.settle(ticket, outcome);
        }

        if let Err(e) = terminal.draw(|f| ui(f, &app)) {
            break Err(e.into());
        }

        match next_action(&mut app) {
            Ok(Action::Quit) => break Ok(()),
            Ok(Action::Fetch(ticket)) => spawn_fetch(&client, ticket, &tx),
            Ok(Action::Open(url)) => {
                if let Err(e) = open::that(&url) {
                    warn!("Could not open {}: {}", url, e);
                    app.status_message = format!("Could not open {}", url);
                }
            }
            Ok(Action::None) => {}
            Err(e) => break Err(e),
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn next_action(app: &mut App) -> Result<Action> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(app.handle_key(key));
            }
        }
    }
    Ok(Action::None)
}

fn spawn_fetch(client: &AnalysisClient, ticket: Ticket, tx: &UnboundedSender<Outcome>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = client.fetch_analysis(ticket.handle()).await;
        // The receiver is gone only when the UI has exited
        let _ = tx.send((ticket, outcome));
    });
}

fn hex_color(hex: &str) -> Color {
    parse_hex(hex).map_or(Color::Blue, |(r, g, b)| Color::Rgb(r, g, b))
}

fn ui(f: &mut Frame, app: &App) {
    let session = app.session();
    match (session.record(), session.view_model()) {
        (Some(record), Some(view)) => render_dashboard(f, app, record, &view),
        _ => render_form(f, app),
    }
}

fn render_form(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Length(3), // Input
            Constraint::Length(3), // Status / error
            Constraint::Min(0),
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "GitHub Career Intelligence",
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Analyze a GitHub profile and get actionable insights",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" ghcareer "));
    f.render_widget(title, chunks[0]);

    let loading = app.session.is_loading();
    let input_style = if loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input = Paragraph::new(format!("{}{}", app.input, if loading { "" } else { "▏" }))
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Username or profile URL (e.g., torvalds) "),
        );
    f.render_widget(input, chunks[1]);

    let status = match app.session.phase() {
        Phase::Loading { handle } => Paragraph::new(format!(
            "Analyzing {}... {:.1}s",
            handle,
            app.started.elapsed().as_secs_f64()
        ))
        .style(Style::default().fg(Color::Cyan)),
        Phase::Failed { message } => {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red))
        }
        _ => Paragraph::new(app.status_message.as_str()),
    };
    f.render_widget(
        status.block(Block::default().borders(Borders::ALL).title(" Status ")),
        chunks[2],
    );

    let footer_text = if loading {
        " Esc:Cancel | Ctrl-C:Quit "
    } else if app.session.error_message().is_some() {
        " Enter:Retry | Esc:Clear error | Ctrl-C:Quit "
    } else {
        " Enter:Analyze | Esc:Quit "
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[4]);
}

fn render_dashboard(f: &mut Frame, app: &App, record: &AnalysisRecord, view: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title + tabs
            Constraint::Length(3), // Status
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let titles = vec!["[1] Overview", "[2] Repositories", "[3] Tips"];
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" ghcareer - {} ", record.handle)),
        )
        .select(app.selected_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let status = Paragraph::new(app.status_message.clone())
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(status, chunks[1]);

    match app.selected_tab {
        0 => render_overview(f, record, view, chunks[2]),
        1 => render_repos(f, app, record, chunks[2]),
        2 => render_tips(f, record, chunks[2]),
        _ => {}
    }

    let footer_text = " q:Quit | Tab:Switch | j/k:Navigate | o:Open repo | n:New analysis | 1-3:Jump to tab ";
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[3]);
}

fn render_overview(f: &mut Frame, record: &AnalysisRecord, view: &ViewModel, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(columns[0]);

    let score = record.total_score.clamp(0, MAX_TOTAL_SCORE);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Score "))
        .gauge_style(Style::default().fg(hex_color(view.score_color)))
        .percent(score as u16)
        .label(format!(
            "{} / {} ({})",
            record.total_score,
            MAX_TOTAL_SCORE,
            view.score_severity.name()
        ));
    f.render_widget(gauge, left[0]);

    let bars: Vec<Bar> = view
        .chart_series
        .iter()
        .map(|entry| {
            Bar::default()
                .value(entry.value.max(0) as u64)
                .label(Line::from(entry.label))
                .text_value(entry.value.to_string())
                .style(Style::default().fg(hex_color(entry.color)))
        })
        .collect();

    let bar_chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Performance Breakdown (0-20) "),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .max(MAX_CATEGORY_SCORE as u64);
    f.render_widget(bar_chart, left[1]);

    let mut lines = vec![
        Line::from(format!("Total Stars:  {}", view.summary.total_stars)),
        Line::from(format!("Total Forks:  {}", view.summary.total_forks)),
        Line::from(format!("Repositories: {}", view.summary.total_repos)),
        Line::from(format!("Languages:    {}", view.summary.language_count)),
        Line::from(""),
        Line::from(Span::styled(
            "Top Languages",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let tags: Vec<Span> = view
        .top_languages
        .iter()
        .flat_map(|lang| {
            [
                Span::styled(format!("[{}]", lang), Style::default().fg(Color::Cyan)),
                Span::raw(" "),
            ]
        })
        .collect();
    lines.push(Line::from(tags));

    let flagged: Vec<&str> = view.underperforming().map(|e| e.label).collect();
    if !flagged.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Needs work: {}", flagged.join(", ")),
            Style::default().fg(Color::Red),
        )));
    }

    let stats = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Profile Stats "));
    f.render_widget(stats, columns[1]);
}

fn render_repos(f: &mut Frame, app: &App, record: &AnalysisRecord, area: Rect) {
    let now = Utc::now();
    let rows: Vec<Row> = record
        .top_repos
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let style = if i == app.selected_row {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                repo.name.clone(),
                repo.stars.to_string(),
                repo.forks.to_string(),
                repo.language.clone(),
                format_updated(&repo.last_updated, now),
                describe(repo).to_string(),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["Name", "Stars", "Forks", "Language", "Updated", "Description"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Top Repositories ({}) ", record.top_repos.len())),
    );

    f.render_widget(table, area);
}

fn render_tips(f: &mut Frame, record: &AnalysisRecord, area: Rect) {
    let lines: Vec<Line> = if record.improvement_tips.is_empty() {
        vec![Line::from("Nothing to improve right now.")]
    } else {
        record
            .improvement_tips
            .iter()
            .map(|tip| {
                Line::from(vec![
                    Span::styled("→ ", Style::default().fg(Color::Yellow)),
                    Span::raw(tip.clone()),
                ])
            })
            .collect()
    };

    let tips = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Actionable Feedback "),
        );
    f.render_widget(tips, area);
}
