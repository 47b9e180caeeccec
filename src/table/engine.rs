use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::column::{ColumnDefinition, TableRow};
use super::error::TableError;
use super::pagination::PaginationMetadata;
use super::selection::SelectionSet;
use super::sort::SortState;

/// Derives a row's identity
pub type IdFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Which of the three mutually exclusive display states the table is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Spinner only, no body
    Loading,
    /// Message only, no paginator
    Empty,
    Populated,
}

/// User input addressed to the table.
///
/// A checkbox click and a row click are separate interactions, so one input
/// event can never both toggle a row and report a row click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableInteraction {
    HeaderClicked(usize),
    CheckboxClicked(usize),
    RowClicked(usize),
    SelectAllClicked,
    PageClicked(u32),
    PreviousPage,
    NextPage,
}

/// Change notifications for the host screen
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SortChanged(SortState),
    SelectionChanged(HashSet<String>),
    PageChanged(u32),
    /// Index into the current page's rows
    RowClicked(usize),
}

/// Tabular presentation state: columns, the current page of rows, sort intent
/// and the row selection.
///
/// Rows are displayed exactly in the order supplied. Sort and selection live
/// as long as the engine and survive every data refresh.
pub struct TableEngine<T> {
    columns: Vec<ColumnDefinition<T>>,
    data: Vec<T>,
    pagination: Option<PaginationMetadata>,
    loading: bool,
    get_id: Option<IdFn<T>>,
    selectable: bool,
    sort: SortState,
    selection: SelectionSet,
    /// Keyboard focus (row, column) within the current page
    cursor: (usize, usize),
}

impl<T> fmt::Debug for TableEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("columns", &self.columns)
            .field("rows", &self.data.len())
            .field("pagination", &self.pagination)
            .field("loading", &self.loading)
            .field("sort", &self.sort)
            .field("selection", &self.selection)
            .finish()
    }
}

impl<T: TableRow> TableEngine<T> {
    pub fn new(columns: Vec<ColumnDefinition<T>>) -> Result<Self, TableError> {
        let mut keys = HashSet::new();
        for col in &columns {
            if !keys.insert(col.key.as_str()) {
                return Err(TableError::DuplicateColumnKey(col.key.clone()));
            }
        }

        Ok(Self {
            columns,
            data: Vec::new(),
            pagination: None,
            loading: false,
            get_id: None,
            selectable: false,
            sort: SortState::new(),
            selection: SelectionSet::new(),
            cursor: (0, 0),
        })
    }

    /// Enable the checkbox column
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Override the row identity function (defaults to [`TableRow::row_id`])
    pub fn with_id_fn(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.get_id = Some(Arc::new(f));
        self
    }

    // -------------------------------------------------------------------------
    // Data ingestion
    // -------------------------------------------------------------------------

    /// Replace the displayed page.
    ///
    /// `data` is authoritative and already in display order. Sort and
    /// selection are left untouched. Rejects metadata with an out-of-range
    /// page and pages with duplicate row ids.
    pub fn set_data(
        &mut self,
        data: Vec<T>,
        pagination: Option<PaginationMetadata>,
    ) -> Result<(), TableError> {
        if let Some(meta) = &pagination {
            meta.validate()?;
        }

        let mut seen = HashSet::with_capacity(data.len());
        for row in &data {
            let id = self.row_id(row);
            if !seen.insert(id.clone()) {
                return Err(TableError::DuplicateRowId(id));
            }
        }

        debug!(target: "table", "Loaded {} rows, pagination={:?}", data.len(), pagination);
        self.data = data;
        self.pagination = pagination;
        self.loading = false;
        self.cursor.0 = self.cursor.0.min(self.data.len().saturating_sub(1));
        Ok(())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn state(&self) -> TableState {
        if self.loading {
            TableState::Loading
        } else if self.data.is_empty() {
            TableState::Empty
        } else {
            TableState::Populated
        }
    }

    pub fn columns(&self) -> &[ColumnDefinition<T>] {
        &self.columns
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn row(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn pagination(&self) -> Option<&PaginationMetadata> {
        self.pagination.as_ref()
    }

    /// Pagination to draw: only in the populated state
    pub fn visible_pagination(&self) -> Option<&PaginationMetadata> {
        match self.state() {
            TableState::Populated => self.pagination.as_ref(),
            _ => None,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn row_id(&self, row: &T) -> String {
        match &self.get_id {
            Some(f) => f(row),
            None => row.row_id(),
        }
    }

    pub fn is_row_selected(&self, row: &T) -> bool {
        self.selection.contains(&self.row_id(row))
    }

    /// Every displayed row is selected (drives the header checkbox)
    pub fn all_displayed_selected(&self) -> bool {
        let ids: Vec<String> = self.data.iter().map(|r| self.row_id(r)).collect();
        self.selection.contains_all(ids.iter().map(String::as_str))
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Header click on the column at `index`; no-op for unsortable columns
    pub fn toggle_sort(&mut self, index: usize) -> Result<Option<TableEvent>, TableError> {
        let column = self
            .columns
            .get(index)
            .ok_or(TableError::ColumnOutOfRange(index))?;
        if !column.sortable {
            trace!(target: "table", "Column '{}' is not sortable", column.key);
            return Ok(None);
        }

        let key = column.key.clone();
        self.sort.toggle(&key);
        debug!(
            target: "table",
            "Sort requested: {} {}",
            key,
            self.sort.direction().as_str()
        );
        Ok(Some(TableEvent::SortChanged(self.sort.clone())))
    }

    /// Select every displayed row, or clear everything when they already are.
    ///
    /// Selecting replaces the set, so ids picked on other pages are dropped.
    /// "Already selected" means every displayed id is in the set, not that
    /// the set size equals the row count; ids from other pages never make a
    /// partial page count as fully selected.
    pub fn select_all(&mut self) -> TableEvent {
        if self.all_displayed_selected() {
            self.selection.clear();
        } else {
            let ids: Vec<String> = self.data.iter().map(|r| self.row_id(r)).collect();
            self.selection.replace(ids);
        }
        debug!(target: "table", "Select all -> {} selected", self.selection.len());
        self.selection_changed()
    }

    /// Flip the selection of the row at `index` on the current page
    pub fn toggle_row(&mut self, index: usize) -> Result<TableEvent, TableError> {
        let row = self
            .data
            .get(index)
            .ok_or(TableError::RowOutOfRange(index))?;
        let id = self.row_id(row);
        let selected = self.selection.toggle(&id);
        trace!(target: "table", "Row {} selected={}", id, selected);
        Ok(self.selection_changed())
    }

    /// Host-driven selection replacement
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = String>) {
        self.selection.replace(ids);
    }

    /// Ask the host for page `page`. Bounds are the host's concern.
    pub fn go_to_page(&self, page: u32) -> Option<TableEvent> {
        self.pagination.as_ref()?;
        debug!(target: "table", "Page change requested: {}", page);
        Some(TableEvent::PageChanged(page))
    }

    /// `None` while the previous control is disabled
    pub fn previous_page(&self) -> Option<TableEvent> {
        let meta = self.pagination.as_ref()?;
        if meta.has_previous() {
            self.go_to_page(meta.page - 1)
        } else {
            None
        }
    }

    /// `None` while the next control is disabled
    pub fn next_page(&self) -> Option<TableEvent> {
        let meta = self.pagination.as_ref()?;
        if meta.has_next() {
            self.go_to_page(meta.page + 1)
        } else {
            None
        }
    }

    /// Apply one user interaction
    pub fn handle(&mut self, interaction: TableInteraction) -> Result<Option<TableEvent>, TableError> {
        match interaction {
            TableInteraction::HeaderClicked(col) => self.toggle_sort(col),
            TableInteraction::CheckboxClicked(row) if self.selectable => {
                self.toggle_row(row).map(Some)
            }
            TableInteraction::SelectAllClicked if self.selectable => Ok(Some(self.select_all())),
            TableInteraction::CheckboxClicked(_) | TableInteraction::SelectAllClicked => Ok(None),
            TableInteraction::RowClicked(row) => {
                if row >= self.data.len() {
                    return Err(TableError::RowOutOfRange(row));
                }
                Ok(Some(TableEvent::RowClicked(row)))
            }
            TableInteraction::PageClicked(page) => Ok(self.go_to_page(page)),
            TableInteraction::PreviousPage => Ok(self.previous_page()),
            TableInteraction::NextPage => Ok(self.next_page()),
        }
    }

    fn selection_changed(&self) -> TableEvent {
        TableEvent::SelectionChanged(self.selection.as_set().clone())
    }

    // -------------------------------------------------------------------------
    // Keyboard focus
    // -------------------------------------------------------------------------

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn move_cursor(&mut self, rows: isize, cols: isize) {
        let max_row = self.data.len().saturating_sub(1);
        let max_col = self.columns.len().saturating_sub(1);
        self.cursor.0 = self.cursor.0.saturating_add_signed(rows).min(max_row);
        self.cursor.1 = self.cursor.1.saturating_add_signed(cols).min(max_col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::sort::SortDirection;
    use serde_json::{json, Value};

    fn columns() -> Vec<ColumnDefinition<Value>> {
        vec![
            ColumnDefinition::new("id", "ID"),
            ColumnDefinition::new("amount", "Amount").sortable(),
            ColumnDefinition::new("status", "Status"),
        ]
    }

    fn rows(ids: std::ops::Range<u32>) -> Vec<Value> {
        ids.map(|i| json!({"id": format!("TX{}", i), "amount": i * 100}))
            .collect()
    }

    #[test]
    fn test_duplicate_column_keys_rejected() {
        let cols: Vec<ColumnDefinition<Value>> =
            vec![ColumnDefinition::new("a", "A"), ColumnDefinition::new("a", "B")];
        assert!(matches!(
            TableEngine::new(cols),
            Err(TableError::DuplicateColumnKey(_))
        ));
    }

    #[test]
    fn test_foreign_ids_do_not_count_as_all_selected() {
        let mut engine = TableEngine::new(columns()).unwrap().selectable(true);
        engine.set_data(rows(0..2), None).unwrap();
        engine.set_selection(["TX0".to_string(), "TX99".to_string()]);

        // Same size as the page, but TX1 is not selected
        assert!(!engine.all_displayed_selected());
        engine.select_all();
        assert_eq!(engine.selection().ids(), vec!["TX0", "TX1"]);
    }

    #[test]
    fn test_duplicate_row_ids_rejected() {
        let mut engine = TableEngine::new(columns()).unwrap();
        let data = vec![json!({"id": "A"}), json!({"id": "A"})];
        assert_eq!(
            engine.set_data(data, None),
            Err(TableError::DuplicateRowId("A".into()))
        );
        assert!(engine.data().is_empty());
    }

    #[test]
    fn test_states_are_exclusive() {
        let mut engine = TableEngine::new(columns()).unwrap();
        assert_eq!(engine.state(), TableState::Empty);
        engine.set_loading(true);
        assert_eq!(engine.state(), TableState::Loading);
        engine
            .set_data(rows(0..3), Some(PaginationMetadata::new(3, 1, 10).unwrap()))
            .unwrap();
        assert_eq!(engine.state(), TableState::Populated);
        assert!(engine.visible_pagination().is_some());
        engine.set_loading(true);
        assert!(engine.visible_pagination().is_none());
    }

    #[test]
    fn test_unsortable_header_is_noop() {
        let mut engine = TableEngine::new(columns()).unwrap();
        assert_eq!(engine.toggle_sort(0).unwrap(), None);
        assert_eq!(engine.sort(), &SortState::new());
    }

    #[test]
    fn test_sortable_header_emits_sort() {
        let mut engine = TableEngine::new(columns()).unwrap();
        let event = engine.toggle_sort(1).unwrap();
        match event {
            Some(TableEvent::SortChanged(sort)) => {
                assert_eq!(sort.column(), Some("amount"));
                assert_eq!(sort.direction(), SortDirection::Asc);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_rows_are_not_reordered_by_sort() {
        let mut engine = TableEngine::new(columns()).unwrap();
        engine.set_data(rows(0..3), None).unwrap();
        engine.toggle_sort(1).unwrap();
        engine.toggle_sort(1).unwrap();
        let ids: Vec<String> = engine.data().iter().map(|r| engine.row_id(r)).collect();
        assert_eq!(ids, vec!["TX0", "TX1", "TX2"]);
    }

    #[test]
    fn test_checkbox_only_when_selectable() {
        let mut engine = TableEngine::new(columns()).unwrap();
        engine.set_data(rows(0..2), None).unwrap();
        assert_eq!(engine.handle(TableInteraction::CheckboxClicked(0)).unwrap(), None);
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn test_row_click_does_not_select() {
        let mut engine = TableEngine::new(columns()).unwrap().selectable(true);
        engine.set_data(rows(0..2), None).unwrap();
        let event = engine.handle(TableInteraction::RowClicked(1)).unwrap();
        assert_eq!(event, Some(TableEvent::RowClicked(1)));
        assert!(engine.selection().is_empty());

        let event = engine.handle(TableInteraction::CheckboxClicked(1)).unwrap();
        assert!(matches!(event, Some(TableEvent::SelectionChanged(_))));
    }

    #[test]
    fn test_custom_id_fn() {
        let mut engine = TableEngine::new(columns())
            .unwrap()
            .selectable(true)
            .with_id_fn(|row: &Value| format!("tx-{}", row["amount"]));
        engine.set_data(rows(1..3), None).unwrap();
        engine.toggle_row(0).unwrap();
        assert!(engine.selection().contains("tx-100"));
    }

    #[test]
    fn test_out_of_range_row_rejected() {
        let mut engine = TableEngine::new(columns()).unwrap().selectable(true);
        engine.set_data(rows(0..2), None).unwrap();
        assert_eq!(engine.toggle_row(5), Err(TableError::RowOutOfRange(5)));
    }

    #[test]
    fn test_page_change_without_pagination_is_ignored() {
        let engine = TableEngine::new(columns()).unwrap();
        assert_eq!(engine.go_to_page(2), None);
    }

    #[test]
    fn test_cursor_clamped_on_refresh() {
        let mut engine = TableEngine::new(columns()).unwrap();
        engine.set_data(rows(0..10), None).unwrap();
        engine.move_cursor(8, 5);
        assert_eq!(engine.cursor(), (8, 2));
        engine.set_data(rows(0..3), None).unwrap();
        assert_eq!(engine.cursor().0, 2);
    }
}
