use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use super::debouncer::Debouncer;

/// Default quiet period before search text is committed
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Selected value per filter key; `""` means "no filter"
pub type FilterValues = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A discrete filter dimension (e.g. transaction status)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
    pub key: String,
    pub label: String,
    pub options: Vec<FilterOption>,
}

impl FilterDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            options,
        }
    }

    /// Label of the option with `value`, "All" for the empty value
    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        if value.is_empty() {
            return "All";
        }
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
            .unwrap_or(value)
    }
}

/// Notifications delivered to the host screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    SearchChanged(String),
    FiltersChanged(FilterValues),
    FiltersCleared,
    ExportRequested,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter {0:?} has no initial value")]
    MissingValue(String),

    #[error("unknown filter {0:?}")]
    UnknownFilter(String),

    #[error("{value:?} is not an option of filter {key:?}")]
    UnknownOption { key: String, value: String },
}

/// Debounced search text plus immediate discrete filters.
///
/// Keystrokes update the raw text at once; the committed text follows only
/// after the debounce window passes quietly, or instantly on clear. Filter
/// selections are never debounced.
#[derive(Debug)]
pub struct FilterCoordinator {
    filters: Vec<FilterDefinition>,
    values: FilterValues,
    raw: String,
    committed: Arc<Mutex<String>>,
    debouncer: Debouncer,
    events: UnboundedSender<FilterEvent>,
    export_enabled: bool,
}

impl FilterCoordinator {
    /// Every filter in `filters` must have an entry in `values`
    pub fn new(
        filters: Vec<FilterDefinition>,
        values: FilterValues,
        debounce_ms: u64,
        events: UnboundedSender<FilterEvent>,
    ) -> Result<Self, FilterError> {
        for filter in &filters {
            let value = values
                .get(&filter.key)
                .ok_or_else(|| FilterError::MissingValue(filter.key.clone()))?;
            Self::check_option(filter, value)?;
        }

        Ok(Self {
            filters,
            values,
            raw: String::new(),
            committed: Arc::new(Mutex::new(String::new())),
            debouncer: Debouncer::new(debounce_ms),
            events,
            export_enabled: false,
        })
    }

    /// Show the export affordance; hidden otherwise
    pub fn with_export(mut self, enabled: bool) -> Self {
        self.export_enabled = enabled;
        self
    }

    pub fn filters(&self) -> &[FilterDefinition] {
        &self.filters
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Live search text, as typed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Last search text delivered to the host
    pub fn committed(&self) -> String {
        self.committed
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn is_search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn export_available(&self) -> bool {
        self.export_enabled
    }

    /// Any discrete filter set. Search text does not count.
    pub fn has_active_filters(&self) -> bool {
        self.values.values().any(|v| !v.is_empty())
    }

    /// Record a keystroke and restart the debounce window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_search_keystroke(&mut self, text: &str) {
        self.raw = text.to_string();

        let value = self.raw.clone();
        let committed = Arc::clone(&self.committed);
        let events = self.events.clone();
        self.debouncer.schedule(move || {
            debug!(target: "filter", "Search committed: {:?}", value);
            if let Ok(mut c) = committed.lock() {
                c.clone_from(&value);
            }
            if events.send(FilterEvent::SearchChanged(value)).is_err() {
                trace!(target: "filter", "Search listener gone");
            }
        });
    }

    /// Merge one filter selection and notify with the full mapping
    pub fn on_filter_select(&mut self, key: &str, value: &str) -> Result<(), FilterError> {
        let filter = self
            .filters
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| FilterError::UnknownFilter(key.to_string()))?;
        Self::check_option(filter, value)?;

        self.values.insert(key.to_string(), value.to_string());
        debug!(target: "filter", "Filter {} = {:?}", key, value);
        self.emit(FilterEvent::FiltersChanged(self.values.clone()));
        Ok(())
    }

    /// Step a filter to its next option, wrapping through "All"
    pub fn cycle_filter(&mut self, key: &str) -> Result<(), FilterError> {
        let filter = self
            .filters
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| FilterError::UnknownFilter(key.to_string()))?;
        let current = self.values.get(key).map(String::as_str).unwrap_or("");

        let next = match filter.options.iter().position(|o| o.value == current) {
            Some(i) if i + 1 < filter.options.len() => filter.options[i + 1].value.clone(),
            Some(_) => String::new(),
            None => filter
                .options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or_default(),
        };
        self.on_filter_select(key, &next)
    }

    /// Reset search and filters immediately, bypassing the debounce window
    pub fn clear_all(&mut self) {
        self.debouncer.cancel();
        self.raw.clear();
        if let Ok(mut c) = self.committed.lock() {
            c.clear();
        }
        for value in self.values.values_mut() {
            value.clear();
        }
        debug!(target: "filter", "Cleared search and filters");
        self.emit(FilterEvent::FiltersCleared);
    }

    /// Returns false (and emits nothing) when export is not available
    pub fn request_export(&self) -> bool {
        if !self.export_enabled {
            return false;
        }
        self.emit(FilterEvent::ExportRequested);
        true
    }

    fn emit(&self, event: FilterEvent) {
        if self.events.send(event).is_err() {
            trace!(target: "filter", "Filter listener gone");
        }
    }

    fn check_option(filter: &FilterDefinition, value: &str) -> Result<(), FilterError> {
        if value.is_empty() || filter.options.iter().any(|o| o.value == value) {
            Ok(())
        } else {
            Err(FilterError::UnknownOption {
                key: filter.key.clone(),
                value: value.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn status_filter() -> FilterDefinition {
        FilterDefinition::new(
            "status",
            "Status",
            vec![
                FilterOption::new("pending", "Pending"),
                FilterOption::new("settled", "Settled"),
            ],
        )
    }

    fn values(pairs: &[(&str, &str)]) -> FilterValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_initial_value_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = FilterCoordinator::new(vec![status_filter()], FilterValues::new(), 300, tx)
            .unwrap_err();
        assert_eq!(err, FilterError::MissingValue("status".into()));
    }

    #[test]
    fn test_option_label_falls_back_to_value() {
        let filter = status_filter();
        assert_eq!(filter.option_label(""), "All");
        assert_eq!(filter.option_label("settled"), "Settled");
        let unknown = String::from("archived");
        assert_eq!(filter.option_label(&unknown), "archived");
    }

    #[test]
    fn test_unknown_filter_and_option_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut coord =
            FilterCoordinator::new(vec![status_filter()], values(&[("status", "")]), 300, tx)
                .unwrap();
        assert_eq!(
            coord.on_filter_select("channel", "sms"),
            Err(FilterError::UnknownFilter("channel".into()))
        );
        assert!(matches!(
            coord.on_filter_select("status", "refunded"),
            Err(FilterError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_cycle_filter_wraps_through_all() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut coord =
            FilterCoordinator::new(vec![status_filter()], values(&[("status", "")]), 300, tx)
                .unwrap();
        coord.cycle_filter("status").unwrap();
        assert_eq!(coord.value("status"), Some("pending"));
        coord.cycle_filter("status").unwrap();
        assert_eq!(coord.value("status"), Some("settled"));
        coord.cycle_filter("status").unwrap();
        assert_eq!(coord.value("status"), Some(""));
    }

    #[test]
    fn test_export_hidden_without_handler() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let coord = FilterCoordinator::new(vec![], FilterValues::new(), 300, tx).unwrap();
        assert!(!coord.export_available());
        assert!(!coord.request_export());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_option_label() {
        let filter = status_filter();
        assert_eq!(filter.option_label(""), "All");
        assert_eq!(filter.option_label("settled"), "Settled");
    }
}
