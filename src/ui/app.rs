use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::api_client::{ActionResult, ApiClient, ListResponse, Snapshot, SnapshotKind};
use crate::config::Config;
use crate::utils::logging::LogRingBuffer;

use super::monitor_screen::MonitorScreen;
use super::records_screen::RecordsScreen;

const LOG_PANE_LINES: usize = 8;

/// Results of background requests, delivered back to the UI thread
pub enum AppMessage {
    ListLoaded {
        seq: u64,
        result: Result<ListResponse>,
    },
    SnapshotLoaded {
        kind: SnapshotKind,
        result: Result<Snapshot>,
    },
    ActionFinished {
        label: String,
        result: Result<ActionResult>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Monitor,
    Records,
}

pub struct App {
    screen: Screen,
    monitor: MonitorScreen,
    records: RecordsScreen,
    messages: UnboundedReceiver<AppMessage>,
    logs: LogRingBuffer,
    show_logs: bool,
    base_url: String,
    tick: usize,
    should_quit: bool,
}

impl App {
    /// Must be called inside a tokio runtime context
    pub fn new(config: &Config, logs: LogRingBuffer) -> Result<Self> {
        let client = ApiClient::new(&config.api)?;
        let (tx, messages) = mpsc::unbounded_channel();

        let monitor = MonitorScreen::new(client.clone(), config.monitor.refresh_secs, tx.clone())?;
        let mut records = RecordsScreen::new(client, config, tx)?;
        records.reload();

        Ok(Self {
            screen: Screen::Monitor,
            monitor,
            records,
            messages,
            logs,
            show_logs: false,
            base_url: config.api.base_url.clone(),
            tick: 0,
            should_quit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()
            .map_err(|e| anyhow::anyhow!("Failed to enable raw mode: {}", e))?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {:#}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!(target: "app", "Dashboard started against {}", self.base_url);

        while !self.should_quit {
            self.monitor.refresh_if_due();
            self.records.poll_filter_events();
            self.drain_messages();

            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    // Windows reports releases too
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
            self.tick = self.tick.wrapping_add(1);
        }

        info!(target: "app", "Dashboard closed");
        Ok(())
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            match message {
                AppMessage::ListLoaded { seq, result } => self.records.on_list_loaded(seq, result),
                AppMessage::SnapshotLoaded { kind, result } => {
                    self.monitor.on_snapshot(kind, result)
                }
                AppMessage::ActionFinished { label, result } => {
                    self.monitor.on_action_finished(&label, result)
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.screen = Screen::Monitor;
                return;
            }
            KeyCode::F(2) => {
                self.screen = Screen::Records;
                return;
            }
            KeyCode::F(3) => {
                self.show_logs = !self.show_logs;
                return;
            }
            _ => {}
        }

        let handled = match self.screen {
            Screen::Monitor => self.monitor.handle_key(key),
            Screen::Records => self.records.handle_key(key),
        };
        if handled {
            return;
        }

        let editing = self.screen == Screen::Records && self.records.is_editing();
        if key.code == KeyCode::Char('q') && !editing {
            self.should_quit = true;
        } else {
            debug!(target: "app", "Unhandled key {:?}", key.code);
        }
    }

    fn render(&self, f: &mut Frame) {
        let log_height = if self.show_logs {
            LOG_PANE_LINES as u16 + 2
        } else {
            0
        };
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(log_height),
            Constraint::Length(1),
        ])
        .split(f.area());

        self.render_tabs(f, chunks[0]);
        match self.screen {
            Screen::Monitor => self.monitor.render(f, chunks[1], self.tick),
            Screen::Records => self.records.render(f, chunks[1], self.tick),
        }
        if self.show_logs {
            self.render_logs(f, chunks[2]);
        }
        self.render_status(f, chunks[3]);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let tab = |label: &'static str, screen: Screen| {
            if self.screen == screen {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(Color::Gray))
            }
        };
        let line = Line::from(vec![
            tab(" F1 Monitor ", Screen::Monitor),
            Span::raw(" "),
            tab(" F2 Transactions ", Screen::Records),
            Span::styled(
                format!("   F3 Logs   {}", self.base_url),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .logs
            .get_recent(LOG_PANE_LINES)
            .iter()
            .map(|entry| Line::from(entry.format_for_display()))
            .collect();
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Logs ({})", self.logs.len())),
        );
        f.render_widget(widget, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let (status, hints) = match self.screen {
            Screen::Monitor => (
                self.monitor.status.as_deref(),
                "Tab focus  r refresh  C clear cache  K/S/E test kcb/sms/email  q quit",
            ),
            Screen::Records => (
                self.records.status.as_deref(),
                "/ search  1-9 filters  c clear  x export  space select  a all  s sort  [ ] page  q quit",
            ),
        };
        let line = Line::from(vec![
            Span::styled(
                status.unwrap_or("Ready").to_string(),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(format!("   {}", hints), Style::default().fg(Color::DarkGray)),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }
}
