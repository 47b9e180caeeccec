use insure_admin::table::{
    ColumnDefinition, PageItem, PaginationMetadata, SortDirection, TableEngine, TableEvent,
    TableInteraction, TableState,
};
use serde_json::{json, Value};
use std::collections::HashSet;

fn columns() -> Vec<ColumnDefinition<Value>> {
    vec![
        ColumnDefinition::new("reference", "Reference"),
        ColumnDefinition::new("amount", "Amount").sortable(),
        ColumnDefinition::new("status", "Status").sortable(),
    ]
}

fn page(ids: &[&str]) -> Vec<Value> {
    ids.iter()
        .map(|id| json!({"id": id, "reference": format!("TX-{}", id), "amount": 100, "status": "pending"}))
        .collect()
}

fn populated(ids: &[&str]) -> TableEngine<Value> {
    let mut engine = TableEngine::new(columns()).unwrap().selectable(true);
    engine.set_data(page(ids), None).unwrap();
    engine
}

fn ids(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sort_cycles_between_directions() {
    let mut engine = populated(&["1", "2"]);

    let Some(TableEvent::SortChanged(sort)) = engine.toggle_sort(1).unwrap() else {
        panic!("expected a sort event");
    };
    assert_eq!(sort.column(), Some("amount"));
    assert_eq!(sort.direction(), SortDirection::Asc);

    let Some(TableEvent::SortChanged(sort)) = engine.toggle_sort(1).unwrap() else {
        panic!("expected a sort event");
    };
    assert_eq!(sort.direction(), SortDirection::Desc);

    // Switching column restarts at ascending
    let Some(TableEvent::SortChanged(sort)) = engine.toggle_sort(2).unwrap() else {
        panic!("expected a sort event");
    };
    assert_eq!(sort.column(), Some("status"));
    assert_eq!(sort.direction(), SortDirection::Asc);
}

#[test]
fn test_unsortable_header_is_a_noop() {
    let mut engine = populated(&["1"]);
    assert_eq!(engine.toggle_sort(0).unwrap(), None);
    assert_eq!(engine.sort().column(), None);
}

#[test]
fn test_select_all_toggles() {
    let mut engine = populated(&["1", "2", "3"]);

    assert_eq!(
        engine.select_all(),
        TableEvent::SelectionChanged(ids(&["1", "2", "3"]))
    );
    assert_eq!(engine.select_all(), TableEvent::SelectionChanged(HashSet::new()));
    assert_eq!(
        engine.select_all(),
        TableEvent::SelectionChanged(ids(&["1", "2", "3"]))
    );
}

#[test]
fn test_select_all_on_partial_selection_selects_everything() {
    let mut engine = populated(&["1", "2", "3"]);
    engine.toggle_row(1).unwrap();
    assert!(!engine.all_displayed_selected());
    assert_eq!(
        engine.select_all(),
        TableEvent::SelectionChanged(ids(&["1", "2", "3"]))
    );
}

#[test]
fn test_checkbox_and_row_click_are_separate() {
    let mut engine = populated(&["a", "b"]);

    let event = engine.handle(TableInteraction::CheckboxClicked(1)).unwrap();
    assert_eq!(event, Some(TableEvent::SelectionChanged(ids(&["b"]))));

    let event = engine.handle(TableInteraction::RowClicked(1)).unwrap();
    assert_eq!(event, Some(TableEvent::RowClicked(1)));
    // Row click leaves the selection alone
    assert_eq!(engine.selection().len(), 1);
}

#[test]
fn test_selection_survives_sort_and_reload() {
    let mut engine = populated(&["1", "2"]);
    engine.toggle_row(0).unwrap();
    engine.toggle_sort(1).unwrap();
    engine.set_loading(true);
    engine.set_data(page(&["2", "1"]), None).unwrap();

    assert!(engine.selection().contains("1"));
    assert_eq!(engine.sort().column(), Some("amount"));
}

#[test]
fn test_loading_takes_precedence_over_empty() {
    let mut engine = TableEngine::new(columns()).unwrap();
    engine.set_loading(true);
    assert_eq!(engine.state(), TableState::Loading);

    engine.set_data(Vec::new(), None).unwrap();
    assert_eq!(engine.state(), TableState::Empty);

    engine.set_data(page(&["1"]), None).unwrap();
    assert_eq!(engine.state(), TableState::Populated);
}

#[test]
fn test_paging_from_first_to_last_page() {
    let first: Vec<String> = (1..=10).map(|n| n.to_string()).collect();
    let first: Vec<&str> = first.iter().map(String::as_str).collect();
    let mut engine = TableEngine::new(columns()).unwrap().selectable(true);
    engine
        .set_data(page(&first), Some(PaginationMetadata::new(25, 1, 10).unwrap()))
        .unwrap();

    let meta = engine.visible_pagination().unwrap();
    assert_eq!(
        meta.page_items(),
        vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
    );
    assert_eq!(meta.range_label(), "Showing 1 to 10 of 25 results");
    assert_eq!(engine.previous_page(), None);
    assert_eq!(engine.next_page(), Some(TableEvent::PageChanged(2)));

    // Host answers a click on "3" with the last page
    assert_eq!(
        engine.handle(TableInteraction::PageClicked(3)).unwrap(),
        Some(TableEvent::PageChanged(3))
    );
    engine.set_loading(true);
    engine
        .set_data(
            page(&["21", "22", "23", "24", "25"]),
            Some(PaginationMetadata::new(25, 3, 10).unwrap()),
        )
        .unwrap();

    let meta = engine.visible_pagination().unwrap();
    assert_eq!(meta.page_items().len(), 3);
    assert_eq!(meta.range_label(), "Showing 21 to 25 of 25 results");
    assert_eq!(engine.previous_page(), Some(TableEvent::PageChanged(2)));
    assert_eq!(engine.next_page(), None);
}

#[test]
fn test_selection_is_kept_across_pages_until_select_all() {
    let mut engine = populated(&["a", "b"]);
    engine.toggle_row(0).unwrap();

    engine.set_data(page(&["c", "d"]), None).unwrap();
    assert!(engine.selection().contains("a"));
    assert!(!engine.all_displayed_selected());

    assert_eq!(engine.select_all(), TableEvent::SelectionChanged(ids(&["c", "d"])));
    assert!(!engine.selection().contains("a"));
}

#[test]
fn test_paging_without_metadata_is_inert() {
    let mut engine = populated(&["1"]);
    assert_eq!(engine.handle(TableInteraction::NextPage).unwrap(), None);
    assert_eq!(engine.handle(TableInteraction::PageClicked(2)).unwrap(), None);
    assert!(engine.visible_pagination().is_none());
}

#[test]
fn test_rejects_duplicate_row_ids() {
    let mut engine = TableEngine::new(columns()).unwrap();
    assert!(engine.set_data(page(&["1", "1"]), None).is_err());
}

#[test]
fn test_unselectable_table_ignores_checkboxes() {
    let mut engine = TableEngine::new(columns()).unwrap();
    engine.set_data(page(&["1"]), None).unwrap();
    assert_eq!(engine.handle(TableInteraction::CheckboxClicked(0)).unwrap(), None);
    assert_eq!(engine.handle(TableInteraction::SelectAllClicked).unwrap(), None);
    assert!(engine.selection().is_empty());
}

#[test]
fn test_missing_values_show_placeholder() {
    let columns = columns();
    let row = json!({"id": "9", "reference": "", "amount": 0, "status": null});
    assert_eq!(columns[0].display(&row), "-");
    assert_eq!(columns[1].display(&row), "-");
    assert_eq!(columns[2].display(&row), "-");
}
