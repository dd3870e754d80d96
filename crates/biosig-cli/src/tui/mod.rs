//! Ratatui-based signal dashboard.
//!
//! Four tabs, each driven by its own [`PlotSession`] over the same recording:
//! - Linear: scrolling time traces of the selected channels
//! - Polar: one revolution per window
//! - Recurrence: density of one channel against another
//! - Difference: where two channels disagree by more than a threshold

mod plots;

use anyhow::Result;
use biosig::{
    DashboardConfig, FrameClock, PlaybackState, PlotSession, Recording, Scaling, WrapPolicy,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum terminal size for TUI mode
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 24;

const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 16.0;
const WINDOW_STEP: f64 = 0.5;
const MAX_WINDOW: f64 = 30.0;

/// Check if terminal is large enough for TUI mode
pub fn terminal_supports_tui() -> bool {
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        cols >= MIN_COLS && rows >= MIN_ROWS
    } else {
        false
    }
}

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Linear,
    Polar,
    Recurrence,
    Difference,
}

impl View {
    pub const ALL: [View; 4] = [View::Linear, View::Polar, View::Recurrence, View::Difference];

    fn index(self) -> usize {
        self as usize
    }

    fn title(self) -> &'static str {
        match self {
            View::Linear => "Linear",
            View::Polar => "Polar",
            View::Recurrence => "Recurrence",
            View::Difference => "Difference",
        }
    }

    fn policy(self) -> WrapPolicy {
        match self {
            View::Recurrence => WrapPolicy::Rewind,
            _ => WrapPolicy::Wrap,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// TUI Application state
pub struct App {
    /// One session per tab, indexed by [`View`]
    pub sessions: Vec<PlotSession>,
    pub view: View,
    pub config: DashboardConfig,
    /// First channel of the recurrence/difference pair
    pub pair_start: usize,
    pub is_playing: bool,
    /// Transient message shown in the footer
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Build the four sessions. `channels` narrows the linear and polar tabs
    /// and picks the initial pair; empty means every channel.
    pub fn new(recording: Arc<Recording>, config: DashboardConfig, channels: &[String]) -> Result<Self> {
        let playback = PlaybackState::new(config.playback.speed, config.playback.window_seconds)?;
        let mut sessions = View::ALL
            .iter()
            .map(|view| PlotSession::new(recording.clone(), view.policy(), playback))
            .collect::<biosig::Result<Vec<_>>>()?;

        let mut pair_start = 0;
        if !channels.is_empty() {
            let names: Vec<&str> = channels.iter().map(String::as_str).collect();
            for view in [View::Linear, View::Polar] {
                sessions[view.index()].select_by_name(&names)?;
            }
            if let Some(first) = recording.channels.index_of(&channels[0]) {
                pair_start = first;
            }
        }

        let mut app = Self {
            sessions,
            view: View::Linear,
            config,
            pair_start,
            is_playing: false,
            status: None,
            should_quit: false,
        };
        app.apply_pair()?;
        Ok(app)
    }

    pub fn session(&self, view: View) -> &PlotSession {
        &self.sessions[view.index()]
    }

    pub fn active(&self) -> &PlotSession {
        self.session(self.view)
    }

    /// Advance every playing session by one frame.
    pub fn tick(&mut self) {
        for session in &mut self.sessions {
            session.tick();
        }
    }

    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
        for session in &mut self.sessions {
            if self.is_playing {
                session.play();
            } else {
                session.pause();
            }
        }
    }

    /// Multiply the speed by `factor`, clamped to the supported range.
    pub fn scale_speed(&mut self, factor: f64) -> Result<()> {
        let speed = (self.active().playback().speed * factor).clamp(MIN_SPEED, MAX_SPEED);
        for session in &mut self.sessions {
            session.set_speed(speed)?;
        }
        self.status = Some(format!("speed {speed}x"));
        Ok(())
    }

    /// Grow or shrink the visible window; every window is reset.
    pub fn step_window(&mut self, delta: f64) -> Result<()> {
        let current = self.active().playback().window_seconds;
        let window = (current + delta).clamp(WINDOW_STEP, MAX_WINDOW);
        if window == current {
            return Ok(());
        }
        for session in &mut self.sessions {
            session.set_window_seconds(window)?;
        }
        self.status = Some(format!("window {window:.1}s"));
        Ok(())
    }

    /// Move the recurrence/difference pair to the next channel.
    pub fn cycle_pair(&mut self) -> Result<()> {
        let count = self.active().recording().channel_count();
        if count < 2 {
            self.status = Some("need two channels for a pair".to_string());
            return Ok(());
        }
        self.pair_start = (self.pair_start + 1) % count;
        self.apply_pair()
    }

    fn apply_pair(&mut self) -> Result<()> {
        let count = self.active().recording().channel_count();
        if count < 2 {
            return Ok(());
        }
        let pair = vec![self.pair_start % count, (self.pair_start + 1) % count];
        for view in [View::Recurrence, View::Difference] {
            self.sessions[view.index()].set_channels(pair.clone())?;
        }
        let names = self.session(View::Recurrence).selected_names();
        self.status = Some(format!("pair {} / {}", names[0], names[1]));
        Ok(())
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_play(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.scale_speed(2.0)?,
            KeyCode::Char('-') => self.scale_speed(0.5)?,
            KeyCode::Char(']') => self.step_window(WINDOW_STEP)?,
            KeyCode::Char('[') => self.step_window(-WINDOW_STEP)?,
            KeyCode::Tab | KeyCode::Right => self.view = self.view.next(),
            KeyCode::BackTab | KeyCode::Left => self.view = self.view.prev(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.cycle_pair()?,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                for session in &mut self.sessions {
                    session.reset();
                }
                self.status = Some("rewound".to_string());
            }
            _ => {}
        }
        Ok(())
    }
}

/// Restore terminal to normal state.
///
/// This function is safe to call multiple times and handles errors gracefully.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the dashboard until the user quits.
pub fn run_tui_loop(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut clock = FrameClock::new();

    let result = (|| -> Result<()> {
        while !app.should_quit {
            let wait = clock.time_until_next(Instant::now()).max(Duration::from_millis(1));
            if event::poll(wait)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Err(e) = app.handle_key(key.code) {
                            app.status = Some(e.to_string());
                        }
                    }
                }
            }
            if clock.tick(Instant::now()) {
                app.tick();
                terminal.draw(|f| draw_ui(f, &app))?;
            }
        }
        Ok(())
    })();

    let _ = std::panic::take_hook();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    log::debug!("dashboard closed after {} frames", clock.frames());
    result
}

/// Draw the main UI
fn draw_ui(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Plot
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_content(f, chunks[1], app);
    draw_footer(f, chunks[2], app);
}

/// Draw header with tabs, position and status
fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let session = app.active();
    let recording = session.recording();
    let playback = session.playback();

    let mut spans = vec![Span::raw(" ")];
    for view in View::ALL {
        let style = if view == app.view {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", view.title()), style));
        spans.push(Span::raw(" "));
    }

    let position = session.window().pointer() as f64 / recording.sampling_rate as f64;
    let status = if playback.is_playing {
        "▶ Playing"
    } else {
        "⏸ Paused"
    };
    spans.extend([
        Span::raw(" "),
        Span::styled(
            format!("{:.2}s / {:.2}s", position, recording.duration_secs()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(status, Style::default().fg(Color::Green)),
    ]);

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} · {} Hz ", recording.id, recording.sampling_rate)),
    );

    f.render_widget(header, area);
}

fn draw_content(f: &mut Frame, area: Rect, app: &App) {
    let session = app.active();
    let config = &app.config;
    match app.view {
        View::Linear => plots::draw_linear(f, area, &session.linear(Scaling::Auto), " Signals "),
        View::Polar => plots::draw_polar(
            f,
            area,
            &session.polar(config.polar.scaling, config.polar.base_radius),
        ),
        View::Recurrence => {
            let names = session.selected_names();
            plots::draw_recurrence(
                f,
                area,
                &session.recurrence(config.recurrence.realtime_sample_cap, config.recurrence.bins),
                &names,
            )
        }
        View::Difference => plots::draw_linear(
            f,
            area,
            &session.difference(config.difference.threshold, Scaling::Raw),
            " Difference ",
        ),
    }
}

/// Draw footer with controls and settings
fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let playback = app.active().playback();
    let controls = "[Space] Play  [+/-] Speed  [[/]] Window  [Tab] View  [c] Pair  [r] Rewind  [q] Quit";
    let settings = format!(
        "  {}x  {:.1}s",
        playback.speed, playback.window_seconds
    );
    let status = app
        .status
        .as_ref()
        .map(|s| format!("  {s}"))
        .unwrap_or_default();

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(controls, Style::default().fg(Color::DarkGray)),
        Span::styled(settings, Style::default().fg(Color::Green)),
        Span::styled(status, Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosig::synthetic::SyntheticEcg;

    fn demo_app(channels: &[&str]) -> App {
        let recording = SyntheticEcg::new().duration_secs(4.0).generate().unwrap();
        let channels: Vec<String> = channels.iter().map(|s| s.to_string()).collect();
        App::new(Arc::new(recording), DashboardConfig::default(), &channels).unwrap()
    }

    #[test]
    fn test_sessions_start_paused() {
        let mut app = demo_app(&[]);
        app.tick();
        assert!(app.sessions.iter().all(|s| s.window().is_empty()));
        assert_eq!(app.session(View::Recurrence).window().policy(), WrapPolicy::Rewind);
        assert_eq!(app.session(View::Difference).selection(), &[0, 1]);
    }

    #[test]
    fn test_play_advances_every_session() {
        let mut app = demo_app(&[]);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.tick();
        assert!(app.sessions.iter().all(|s| s.window().pointer() > 0));
    }

    #[test]
    fn test_channel_flag_selects_linear_and_pair() {
        let app = demo_app(&["II", "aVR"]);
        assert_eq!(app.session(View::Linear).selected_names(), vec!["II", "aVR"]);
        assert_eq!(app.session(View::Recurrence).selected_names(), vec!["II", "III"]);
    }

    #[test]
    fn test_cycle_pair_wraps() {
        let mut app = demo_app(&["aVF"]);
        assert_eq!(app.session(View::Difference).selected_names(), vec!["aVF", "I"]);
        app.handle_key(KeyCode::Char('c')).unwrap();
        assert_eq!(app.session(View::Difference).selected_names(), vec!["I", "II"]);
    }

    #[test]
    fn test_speed_and_window_keys() {
        let mut app = demo_app(&[]);
        app.handle_key(KeyCode::Char('+')).unwrap();
        assert_eq!(app.active().playback().speed, 2.0);
        for _ in 0..10 {
            app.handle_key(KeyCode::Char('-')).unwrap();
        }
        assert_eq!(app.active().playback().speed, MIN_SPEED);

        app.handle_key(KeyCode::Char(']')).unwrap();
        assert!(app
            .sessions
            .iter()
            .all(|s| s.playback().window_seconds == 2.5));
        assert_eq!(app.session(View::Polar).window().capacity(), 250);
    }

    #[test]
    fn test_view_navigation_and_quit() {
        let mut app = demo_app(&[]);
        app.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(app.view, View::Difference);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.view, View::Linear);
        app.handle_key(KeyCode::Char('q')).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let recording = SyntheticEcg::new().generate().unwrap();
        let result = App::new(
            Arc::new(recording),
            DashboardConfig::default(),
            &["V9".to_string()],
        );
        assert!(result.is_err());
    }
}
