//! Search box and filter chips above a list table
//!
//! Text editing goes through `tui_input`; every change is handed to the
//! FilterCoordinator, which owns debouncing and notifications.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::filter::{FilterCoordinator, FilterError};

/// Result of handling a key in the filter bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterBarAction {
    /// Key consumed, nothing else to do
    Continue,
    /// Search text changed; the debounced commit is pending
    InputChanged(String),
    /// Editing finished (Enter or Esc)
    Done,
    /// Pass the key through to the parent handler
    PassThrough,
}

pub struct FilterBar {
    input: Input,
    coordinator: FilterCoordinator,
    editing: bool,
}

impl FilterBar {
    pub fn new(coordinator: FilterCoordinator) -> Self {
        Self {
            input: Input::default(),
            coordinator,
            editing: false,
        }
    }

    pub fn coordinator(&self) -> &FilterCoordinator {
        &self.coordinator
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Focus the search box, keeping its current text
    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FilterBarAction {
        if !self.editing {
            return FilterBarAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = false;
                FilterBarAction::Done
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                FilterBarAction::PassThrough
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                let text = self.input.value().to_string();
                if text != self.coordinator.raw() {
                    self.coordinator.on_search_keystroke(&text);
                    FilterBarAction::InputChanged(text)
                } else {
                    FilterBarAction::Continue
                }
            }
        }
    }

    /// Step the n-th filter (0-based) to its next option
    pub fn cycle_filter(&mut self, index: usize) -> Result<bool, FilterError> {
        let Some(key) = self.coordinator.filters().get(index).map(|f| f.key.clone()) else {
            return Ok(false);
        };
        self.coordinator.cycle_filter(&key)?;
        Ok(true)
    }

    pub fn clear_all(&mut self) {
        self.input.reset();
        self.coordinator.clear_all();
    }

    pub fn request_export(&self) -> bool {
        self.coordinator.request_export()
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);
        self.render_search(f, chunks[0]);
        self.render_filters(f, chunks[1]);
    }

    fn render_search(&self, f: &mut Frame, area: Rect) {
        let title = if self.coordinator.is_search_pending() {
            "Search (typing...)"
        } else {
            "Search [/]"
        };
        let style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let widget = Paragraph::new(self.input.value().to_string())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style);
        f.render_widget(widget, area);

        if self.editing {
            let x = area.x + self.input.visual_cursor() as u16 + 1;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        let active = Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD);

        for (i, filter) in self.coordinator.filters().iter().enumerate() {
            let value = self.coordinator.value(&filter.key).unwrap_or("");
            spans.push(Span::raw(format!("{}:{} ", i + 1, filter.label)));
            spans.push(Span::styled(
                format!("{}  ", filter.option_label(value)),
                if value.is_empty() {
                    Style::default()
                } else {
                    active
                },
            ));
        }

        spans.push(Span::styled(
            "[c] Clear",
            if self.coordinator.has_active_filters() {
                active
            } else {
                Style::default().fg(Color::Gray)
            },
        ));
        if self.coordinator.export_available() {
            spans.push(Span::raw("  [x] Export"));
        }

        let widget =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("Filters"));
        f.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterDefinition, FilterEvent, FilterOption, FilterValues};
    use tokio::sync::mpsc;

    fn bar() -> (FilterBar, mpsc::UnboundedReceiver<FilterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let filters = vec![FilterDefinition::new(
            "status",
            "Status",
            vec![FilterOption::new("pending", "Pending")],
        )];
        let values: FilterValues = [("status".to_string(), String::new())].into_iter().collect();
        let coordinator = FilterCoordinator::new(filters, values, 300, tx).unwrap();
        (FilterBar::new(coordinator), rx)
    }

    #[test]
    fn test_keys_pass_through_when_not_editing() {
        let (mut bar, _rx) = bar();
        let action = bar.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(action, FilterBarAction::PassThrough);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_updates_raw_immediately() {
        let (mut bar, _rx) = bar();
        bar.start_editing();
        let action = bar.handle_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE));
        assert_eq!(action, FilterBarAction::InputChanged("k".into()));
        assert_eq!(bar.coordinator().raw(), "k");
        assert_eq!(bar.coordinator().committed(), "");

        let action = bar.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(action, FilterBarAction::Done);
        assert!(!bar.is_editing());
    }

    #[test]
    fn test_cycle_missing_filter_is_noop() {
        let (mut bar, _rx) = bar();
        assert_eq!(bar.cycle_filter(3), Ok(false));
        assert_eq!(bar.cycle_filter(0), Ok(true));
        assert_eq!(bar.coordinator().value("status"), Some("pending"));
    }
}
