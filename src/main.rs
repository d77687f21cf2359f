use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use leagues_terminal::config::{Settings, SourceKind};
use leagues_terminal::demo_source::DemoSource;
use leagues_terminal::http_client::http_client_with_timeout;
use leagues_terminal::league_fetch::{LeagueSource, SportsDbClient};
use leagues_terminal::route::{HOME_PATH, Route};
use leagues_terminal::state::{AppState, Delta, FetchCommand, View, apply_delta};
use leagues_terminal::table::{RowHit, hit_test};
use leagues_terminal::views::home::HomeFocus;
use leagues_terminal::views::{self, home, league};
use leagues_terminal::worker::spawn_fetch_worker;

#[derive(Debug, Parser)]
#[command(name = "leagues_terminal", version, about = "Browse sports leagues in the terminal")]
struct Cli {
    /// Leagues endpoint (overrides LEAGUES_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Start route, e.g. "/league/4328?name=English+Premier+League"
    #[arg(long, default_value = "/")]
    route: String,

    /// Serve built-in sample leagues instead of calling the API
    #[arg(long)]
    demo: bool,

    /// Log file (overrides LEAGUES_LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<FetchCommand>>,
    row_hits: Vec<RowHit<Route>>,
}

impl App {
    fn new(settings: &Settings, cmd_tx: Option<mpsc::Sender<FetchCommand>>) -> Self {
        Self {
            state: AppState::from_settings(settings),
            should_quit: false,
            cmd_tx,
            row_hits: Vec::new(),
        }
    }

    fn dispatch(&mut self, commands: Vec<FetchCommand>) {
        for cmd in commands {
            let Some(tx) = &self.cmd_tx else {
                self.state.push_log("[INFO] Fetching unavailable");
                return;
            };
            if tx.send(cmd).is_err() {
                log::error!("fetch worker channel closed");
                self.state.push_log("[WARN] Fetch worker stopped");
                return;
            }
        }
    }

    fn navigate(&mut self, path: &str) {
        let commands = self.state.navigate(path, Instant::now());
        self.row_hits.clear();
        self.dispatch(commands);
    }

    fn open(&mut self, route: Route) {
        let commands = self.state.open(route, Instant::now());
        self.row_hits.clear();
        self.dispatch(commands);
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.route_prompt.is_some() {
            self.on_prompt_key(key);
            return;
        }
        if self.on_home_input_key(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('g') => self.state.route_prompt = Some(String::new()),
            KeyCode::Char('r') => {
                let commands = self.state.refresh(Instant::now());
                self.dispatch(commands);
            }
            _ if matches!(self.state.view, View::Home(_)) => self.on_home_key(key),
            KeyCode::Char('b') | KeyCode::Esc => self.navigate(HOME_PATH),
            _ => {}
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => {
                let commands = self.state.open_selected(Instant::now());
                self.row_hits.clear();
                self.dispatch(commands);
            }
            KeyCode::Char('/') => {
                if let Some(home) = self.state.home_mut() {
                    home.focus_search();
                }
            }
            KeyCode::Char('s') => {
                if let Some(home) = self.state.home_mut() {
                    home.open_sport_picker();
                }
            }
            KeyCode::Char('c') => {
                if let Some(home) = self.state.home_mut() {
                    home.clear_filters();
                }
            }
            _ => {}
        }
    }

    /// Keys consumed by the search box and the sport dropdown.
    fn on_home_input_key(&mut self, key: KeyEvent) -> bool {
        let Some(home) = self.state.home_mut() else {
            return false;
        };
        match home.focus {
            HomeFocus::Table => false,
            HomeFocus::Search => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Down | KeyCode::Tab => {
                        home.leave_search()
                    }
                    KeyCode::Backspace => home.pop_search(),
                    KeyCode::Char(c) => home.push_search(c),
                    _ => {}
                }
                true
            }
            HomeFocus::SportPicker { .. } => {
                match key.code {
                    KeyCode::Char('j') | KeyCode::Down => home.move_picker(1),
                    KeyCode::Char('k') | KeyCode::Up => home.move_picker(-1),
                    KeyCode::Enter => home.confirm_picker(),
                    KeyCode::Esc | KeyCode::Char('s') => home.cancel_picker(),
                    _ => {}
                }
                true
            }
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.state.route_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.route_prompt = None,
            KeyCode::Backspace => {
                prompt.pop();
            }
            KeyCode::Char(c) => prompt.push(c),
            KeyCode::Enter => {
                let path = prompt.trim().to_string();
                self.state.route_prompt = None;
                if !path.is_empty() {
                    self.navigate(&path);
                }
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(hit) = hit_test(&self.row_hits, mouse.column, mouse.row) else {
            return;
        };
        let key = hit.key.clone();
        let action = hit.action.clone();
        if let Some(home) = self.state.home_mut() {
            if home.focus != HomeFocus::Table {
                return;
            }
            home.select(&key);
        }
        if let Some(route) = action {
            self.open(route);
        }
    }

    fn tick(&mut self) {
        let commands = self.state.tick(Instant::now());
        self.dispatch(commands);
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(url) = cli.api_url {
        settings.leagues_api_url = Some(url);
    }
    if cli.demo {
        settings.source = SourceKind::Demo;
    }
    if let Some(path) = cli.log_file {
        settings.log_file = path;
    }

    init_logging(&settings.log_file)?;
    let source = build_source(&settings)?;
    log::info!(
        "app.start source={:?} leagues_url={:?} seasons_base={}",
        settings.source,
        settings.leagues_api_url,
        settings.seasons_api_base
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_fetch_worker(source, tx, cmd_rx);

    let mut app = App::new(&settings, Some(cmd_tx));
    app.navigate(&cli.route);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("app.error {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn build_source(settings: &Settings) -> Result<Box<dyn LeagueSource>> {
    match settings.source {
        SourceKind::Demo => Ok(Box::new(DemoSource::new())),
        SourceKind::Api => {
            let client = http_client_with_timeout(settings.request_timeout)?;
            let url = settings.require_leagues_url()?;
            Ok(Box::new(SportsDbClient::new(
                client,
                url,
                &settings.seasons_api_base,
            )))
        }
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let commands = apply_delta(&mut app.state, delta, Instant::now());
            app.dispatch(commands);
        }

        let mut hits = Vec::new();
        terminal.draw(|f| hits = ui(f, app))?;
        app.row_hits = hits;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) -> Vec<RowHit<Route>> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let hits = match &app.state.view {
        View::Home(view) => home::render(frame, chunks[1], view, &app.state.leagues_state()),
        View::League(view) => {
            let query = app.state.season_state(&view.key());
            let badge = query
                .data
                .as_ref()
                .and_then(|season| season.as_ref())
                .and_then(|season| app.state.badge_status(&season.badge_url));
            league::render(frame, chunks[1], view, &query, badge);
            Vec::new()
        }
        View::NotFound(path) => {
            let text = format!("No page at {path}\n\n[ Back to Home ]  (b / Esc)");
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
                chunks[1],
            );
            Vec::new()
        }
    };

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if let Some(prompt) = &app.state.route_prompt {
        render_route_prompt(frame, prompt);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    hits
}

fn header_text(state: &AppState) -> String {
    format!("LEAGUES TERMINAL | {}", state.route.to_path())
}

fn footer_text(state: &AppState) -> String {
    let keys = match &state.view {
        View::Home(view) => match view.focus {
            HomeFocus::Table => concat!(
                "j/k/↑/↓ Move | Enter Open | / Search | s Sport | c Clear | ",
                "r Refresh | g Go | ? Help | q Quit"
            ),
            HomeFocus::Search => "Type to search | Backspace Delete | Enter/Esc Done",
            HomeFocus::SportPicker { .. } => "j/k Move | Enter Select | Esc Cancel",
        },
        View::League(_) => "b/Esc Back | r Refresh | g Go | ? Help | q Quit",
        View::NotFound(_) => "b/Esc Back | g Go | q Quit",
    };
    let fetched_at = match &state.view {
        View::Home(_) => state.leagues_state().fetched_at,
        View::League(view) => state.season_state(&view.key()).fetched_at,
        View::NotFound(_) => None,
    };
    let last_log = state.logs.back().cloned().unwrap_or_default();
    match fetched_at.map(updated_label) {
        Some(updated) => format!("{keys}\n{updated} | {last_log}"),
        None => format!("{keys}\n{last_log}"),
    }
}

fn updated_label(fetched_at: Instant) -> String {
    let elapsed = ChronoDuration::from_std(fetched_at.elapsed())
        .unwrap_or_else(|_| ChronoDuration::zero());
    let at = Local::now() - elapsed;
    format!("Updated {}", at.format("%H:%M:%S"))
}

fn render_route_prompt(frame: &mut Frame, prompt: &str) {
    let area = frame.size();
    let popup = Rect {
        x: area.x + area.width / 6,
        y: area.y + area.height / 3,
        width: area.width - area.width / 3,
        height: 3.min(area.height),
    };
    frame.render_widget(Clear, popup);
    let input = Paragraph::new(format!("{prompt}▏")).block(
        Block::default()
            .title("Go to path (Enter go, Esc cancel)")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = views::centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Leagues Terminal - Help",
        "",
        "Global:",
        "  r            Refresh current data",
        "  g            Go to a path (/home, /league/:id?name=&sport=)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "League list:",
        "  j/k or ↑/↓   Move",
        "  Enter/click  Open league",
        "  /            Search by name",
        "  s            Choose sport",
        "  c            Clear filters",
        "",
        "League detail:",
        "  b / Esc      Back to leagues",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}
