//! System monitoring: health, metrics, queue, database and application
//! snapshots, plus the cache and service-test actions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::api_client::{ActionResult, ApiClient, ServiceTest, Snapshot, SnapshotKind};
use crate::monitor::{flatten_snapshot, metric_columns, MetricRow};
use crate::table::TableEngine;

use super::app::AppMessage;
use super::table_input::{table_key, TableKey};
use super::table_renderer::{render_table, TableView};

struct SnapshotPanel {
    kind: SnapshotKind,
    engine: TableEngine<MetricRow>,
    fetched_at: Option<String>,
}

pub struct MonitorScreen {
    client: ApiClient,
    messages: UnboundedSender<AppMessage>,
    panels: Vec<SnapshotPanel>,
    focus: usize,
    refresh_every: Duration,
    last_refresh: Option<Instant>,
    pub status: Option<String>,
}

impl MonitorScreen {
    pub fn new(
        client: ApiClient,
        refresh_secs: u64,
        messages: UnboundedSender<AppMessage>,
    ) -> Result<Self> {
        let panels = SnapshotKind::ALL
            .iter()
            .map(|&kind| -> Result<SnapshotPanel> {
                Ok(SnapshotPanel {
                    kind,
                    engine: TableEngine::new(metric_columns())?,
                    fetched_at: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            messages,
            panels,
            focus: 0,
            refresh_every: Duration::from_secs(refresh_secs.max(1)),
            last_refresh: None,
            status: None,
        })
    }

    /// Refresh when the interval has elapsed (or nothing was fetched yet)
    pub fn refresh_if_due(&mut self) {
        let due = self
            .last_refresh
            .map_or(true, |at| at.elapsed() >= self.refresh_every);
        if due {
            self.refresh();
        }
    }

    pub fn refresh(&mut self) {
        self.last_refresh = Some(Instant::now());
        for panel in &mut self.panels {
            panel.engine.set_loading(true);
            let client = self.client.clone();
            let tx = self.messages.clone();
            let kind = panel.kind;
            tokio::spawn(async move {
                let result = client.snapshot(kind).await;
                let _ = tx.send(AppMessage::SnapshotLoaded { kind, result });
            });
        }
    }

    pub fn on_snapshot(&mut self, kind: SnapshotKind, result: Result<Snapshot>) {
        let Some(panel) = self.panels.iter_mut().find(|p| p.kind == kind) else {
            return;
        };
        match result {
            Ok(snapshot) => {
                panel.fetched_at = Some(snapshot.fetched_at.format("%H:%M:%S").to_string());
                if let Err(e) = panel.engine.set_data(flatten_snapshot(&snapshot.body), None) {
                    warn!(target: "app", "{} snapshot rejected: {}", kind.title(), e);
                    panel.engine.set_loading(false);
                }
            }
            Err(e) => {
                panel.engine.set_loading(false);
                self.status = Some(format!("{}: {:#}", kind.title(), e));
            }
        }
    }

    fn run_action(&mut self, label: String, service: Option<ServiceTest>) {
        let client = self.client.clone();
        let tx = self.messages.clone();
        self.status = Some(format!("{}...", label));
        info!(target: "app", "Running action: {}", label);
        tokio::spawn(async move {
            let result = match service {
                Some(service) => client.test_service(service).await,
                None => client.clear_cache().await,
            };
            let _ = tx.send(AppMessage::ActionFinished { label, result });
        });
    }

    pub fn on_action_finished(&mut self, label: &str, result: Result<ActionResult>) {
        self.status = Some(match result {
            Ok(r) if r.success => format!("{} succeeded {}", label, r.message),
            Ok(r) => format!("{} failed: {}", label, r.message),
            Err(e) => format!("{} failed: {:#}", label, e),
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % self.panels.len();
                return true;
            }
            KeyCode::BackTab => {
                self.focus = (self.focus + self.panels.len() - 1) % self.panels.len();
                return true;
            }
            KeyCode::Char('r') => {
                self.refresh();
                return true;
            }
            KeyCode::Char('C') => {
                self.run_action("Cache clear".to_string(), None);
                return true;
            }
            KeyCode::Char('K') | KeyCode::Char('S') | KeyCode::Char('E') => {
                let service = match key.code {
                    KeyCode::Char('K') => ServiceTest::Kcb,
                    KeyCode::Char('S') => ServiceTest::Sms,
                    _ => ServiceTest::Email,
                };
                self.run_action(format!("{} test", service), Some(service));
                return true;
            }
            _ => {}
        }

        let Some(panel) = self.panels.get_mut(self.focus) else {
            return false;
        };
        match table_key(&panel.engine, key) {
            TableKey::Move { rows, cols } => {
                panel.engine.move_cursor(rows, cols);
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, tick: usize) {
        let columns =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
        let left = Layout::vertical([Constraint::Ratio(1, 3); 3]).split(columns[0]);
        let right = Layout::vertical([Constraint::Ratio(1, 2); 2]).split(columns[1]);
        let areas = [left[0], left[1], left[2], right[0], right[1]];

        for (i, (panel, area)) in self.panels.iter().zip(areas).enumerate() {
            let title = match &panel.fetched_at {
                Some(at) => format!("{} ({})", panel.kind.title(), at),
                None => panel.kind.title().to_string(),
            };
            let view = TableView {
                title: &title,
                empty_message: "No data",
                show_row_numbers: false,
                focused: i == self.focus,
                tick,
            };
            render_table(f, area, &panel.engine, &view);
        }
    }
}
