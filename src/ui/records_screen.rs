//! Paginated transaction list: the filter bar drives backend queries, the
//! table shows whatever page comes back.

use anyhow::Result;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api_client::{ApiClient, ListQuery, ListResponse};
use crate::config::Config;
use crate::data_exporter::{export_file_name, export_rows_csv};
use crate::filter::{FilterCoordinator, FilterDefinition, FilterEvent, FilterOption, FilterValues};
use crate::table::{CellValue, ColumnDefinition, TableEngine, TableEvent};
use crate::utils::app_paths::AppPaths;

use super::app::AppMessage;
use super::filter_bar::{FilterBar, FilterBarAction};
use super::table_input::{table_key, TableKey};
use super::table_renderer::{render_table, TableView};

const RESOURCE: &str = "transactions";

pub fn transaction_columns() -> Vec<ColumnDefinition<Value>> {
    vec![
        ColumnDefinition::new("reference", "Reference").width(16),
        ColumnDefinition::<Value>::new("policyHolder", "Policy holder")
            .accessor(|row| {
                row.pointer("/customer/name")
                    .or_else(|| row.get("policyHolder"))
                    .map(CellValue::from)
                    .unwrap_or(CellValue::Null)
            }),
        ColumnDefinition::<Value>::new("amount", "Amount")
            .sortable()
            .width(14)
            .renderer(|value, row| match value {
                CellValue::Number(n) => format!(
                    "{} {:.2}",
                    row.get("currency").and_then(Value::as_str).unwrap_or("KES"),
                    n
                ),
                other => other.display_or_placeholder(),
            }),
        ColumnDefinition::new("status", "Status").sortable().width(10),
        ColumnDefinition::new("channel", "Channel").width(8),
        ColumnDefinition::new("createdAt", "Created").sortable().width(20),
    ]
}

pub fn transaction_filters() -> (Vec<FilterDefinition>, FilterValues) {
    let filters = vec![
        FilterDefinition::new(
            "status",
            "Status",
            vec![
                FilterOption::new("pending", "Pending"),
                FilterOption::new("completed", "Completed"),
                FilterOption::new("failed", "Failed"),
            ],
        ),
        FilterDefinition::new(
            "channel",
            "Channel",
            vec![
                FilterOption::new("mpesa", "M-Pesa"),
                FilterOption::new("kcb", "KCB"),
                FilterOption::new("card", "Card"),
            ],
        ),
    ];
    let values = filters
        .iter()
        .map(|f| (f.key.clone(), String::new()))
        .collect();
    (filters, values)
}

pub struct RecordsScreen {
    client: ApiClient,
    messages: UnboundedSender<AppMessage>,
    engine: TableEngine<Value>,
    filter_bar: FilterBar,
    filter_events: UnboundedReceiver<FilterEvent>,
    query: ListQuery,
    request_seq: u64,
    empty_message: String,
    show_row_numbers: bool,
    detail: Option<String>,
    pub status: Option<String>,
}

impl RecordsScreen {
    pub fn new(
        client: ApiClient,
        config: &Config,
        messages: UnboundedSender<AppMessage>,
    ) -> Result<Self> {
        let (filter_tx, filter_events) = tokio::sync::mpsc::unbounded_channel();
        let (filters, values) = transaction_filters();
        let coordinator =
            FilterCoordinator::new(filters, values, config.search.debounce_ms, filter_tx)?
                .with_export(true);

        Ok(Self {
            client,
            messages,
            engine: TableEngine::new(transaction_columns())?.selectable(true),
            filter_bar: FilterBar::new(coordinator),
            filter_events,
            query: ListQuery::new(config.table.page_size),
            request_seq: 0,
            empty_message: config.table.empty_message.clone(),
            show_row_numbers: config.table.show_row_numbers,
            detail: None,
            status: None,
        })
    }

    pub fn is_editing(&self) -> bool {
        self.filter_bar.is_editing()
    }

    /// Fetch the page described by the current query
    pub fn reload(&mut self) {
        self.request_seq += 1;
        let seq = self.request_seq;
        let client = self.client.clone();
        let query = self.query.clone();
        let tx = self.messages.clone();

        self.engine.set_loading(true);
        debug!(target: "app", "Requesting {} page {} (seq {})", RESOURCE, query.page, seq);
        tokio::spawn(async move {
            let result = client.list(RESOURCE, &query).await;
            let _ = tx.send(AppMessage::ListLoaded { seq, result });
        });
    }

    /// Apply a list response; responses to superseded requests are dropped
    pub fn on_list_loaded(&mut self, seq: u64, result: Result<ListResponse>) {
        if seq != self.request_seq {
            debug!(target: "app", "Dropping stale list response {}", seq);
            return;
        }
        match result {
            Ok(response) => {
                if let Err(e) = self.engine.set_data(response.data, response.pagination) {
                    warn!(target: "app", "Rejected page: {}", e);
                    self.engine.set_loading(false);
                    self.status = Some(format!("Bad page from backend: {}", e));
                }
            }
            Err(e) => {
                // Sort and selection stay as they were
                self.engine.set_loading(false);
                self.status = Some(format!("Load failed: {:#}", e));
            }
        }
    }

    /// Drain committed search/filter notifications into the query
    pub fn poll_filter_events(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.filter_events.try_recv() {
            match event {
                FilterEvent::SearchChanged(text) => {
                    self.query.search = text;
                    changed = true;
                }
                FilterEvent::FiltersChanged(values) => {
                    self.query.filters = values;
                    changed = true;
                }
                FilterEvent::FiltersCleared => {
                    self.query.search.clear();
                    self.query.filters = self.filter_bar.coordinator().values().clone();
                    changed = true;
                }
                FilterEvent::ExportRequested => self.export(),
            }
        }
        if changed {
            self.query.page = 1;
            self.reload();
        }
    }

    fn export(&mut self) {
        let result = AppPaths::export_dir().and_then(|dir| {
            let path = export_file_name(&dir, RESOURCE);
            export_rows_csv(&self.engine, &path).map(|n| (n, path))
        });
        self.status = Some(match result {
            Ok((n, path)) => format!("Exported {} rows to {}", n, path.display()),
            Err(e) => format!("Export failed: {:#}", e),
        });
    }

    fn on_table_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::SortChanged(sort) => {
                self.query.sort = sort;
                self.reload();
            }
            TableEvent::PageChanged(page) => {
                self.query.page = page;
                self.reload();
            }
            TableEvent::SelectionChanged(selected) => {
                self.status = Some(format!("{} selected", selected.len()));
            }
            TableEvent::RowClicked(index) => {
                self.detail = self
                    .engine
                    .row(index)
                    .map(|row| serde_json::to_string_pretty(row).unwrap_or_default());
            }
        }
    }

    /// Returns false when the key was not handled
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        use crossterm::event::KeyCode;

        match self.filter_bar.handle_key(key) {
            FilterBarAction::PassThrough => {}
            _ => return true,
        }

        if self.detail.is_some() && matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            self.detail = None;
            return true;
        }

        match key.code {
            KeyCode::Char('/') => {
                self.filter_bar.start_editing();
                return true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Err(e) = self.filter_bar.cycle_filter(index) {
                    self.status = Some(e.to_string());
                }
                return true;
            }
            KeyCode::Char('c') => {
                self.filter_bar.clear_all();
                return true;
            }
            KeyCode::Char('x') => {
                if !self.filter_bar.request_export() {
                    self.status = Some("Export not available".to_string());
                }
                return true;
            }
            KeyCode::Char('r') => {
                self.reload();
                return true;
            }
            _ => {}
        }

        match table_key(&self.engine, key) {
            TableKey::Move { rows, cols } => {
                self.engine.move_cursor(rows, cols);
                true
            }
            TableKey::Interact(interaction) => {
                match self.engine.handle(interaction) {
                    Ok(Some(event)) => self.on_table_event(event),
                    Ok(None) => {}
                    Err(e) => self.status = Some(e.to_string()),
                }
                true
            }
            TableKey::Unhandled => false,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, tick: usize) {
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).split(area);
        self.filter_bar.render(f, chunks[0]);

        let title = format!(
            "Transactions{}",
            match self.engine.selection().len() {
                0 => String::new(),
                n => format!(" ({} selected)", n),
            }
        );
        let view = TableView {
            title: &title,
            empty_message: &self.empty_message,
            show_row_numbers: self.show_row_numbers,
            focused: !self.filter_bar.is_editing(),
            tick,
        };
        render_table(f, chunks[1], &self.engine, &view);

        if let Some(detail) = &self.detail {
            let popup = centered(chunks[1], 70, 80);
            f.render_widget(Clear, popup);
            f.render_widget(
                Paragraph::new(detail.as_str())
                    .wrap(Wrap { trim: false })
                    .style(Style::default().fg(Color::White))
                    .block(Block::default().borders(Borders::ALL).title("Record [Esc]")),
                popup,
            );
        }
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(key: &str) -> ColumnDefinition<Value> {
        transaction_columns()
            .into_iter()
            .find(|c| c.key == key)
            .unwrap()
    }

    #[test]
    fn test_policy_holder_prefers_nested_customer() {
        let col = column("policyHolder");
        assert_eq!(col.display(&json!({"customer": {"name": "Achieng"}})), "Achieng");
        assert_eq!(col.display(&json!({"policyHolder": "Otieno"})), "Otieno");
        assert_eq!(col.display(&json!({})), "-");
    }

    #[test]
    fn test_amount_renders_with_currency() {
        let col = column("amount");
        assert_eq!(col.display(&json!({"amount": 1250.5})), "KES 1250.50");
        assert_eq!(col.display(&json!({"amount": 0, "currency": "UGX"})), "UGX 0.00");
        assert_eq!(col.display(&json!({})), "-");
    }

    #[test]
    fn test_every_filter_starts_unset() {
        let (filters, values) = transaction_filters();
        assert_eq!(filters.len(), values.len());
        assert!(values.values().all(String::is_empty));
    }
}
