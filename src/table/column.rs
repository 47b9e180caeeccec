use ratatui::style::Style;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::cell::CellValue;

/// Reads a cell value out of a row
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Turns a cell value (and its row) into display text
pub type Renderer<T> = Arc<dyn Fn(&CellValue, &T) -> String + Send + Sync>;

/// Field lookup used when a column has no explicit accessor.
///
/// Rows are otherwise opaque to the table; this is the only view it has of
/// their shape besides the id function.
pub trait TableRow {
    /// Value of the field named `key`, `CellValue::Null` when absent
    fn field(&self, key: &str) -> CellValue;

    /// Default row identity: the `id` field rendered as text
    fn row_id(&self) -> String {
        self.field("id").to_string()
    }
}

impl TableRow for Value {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).map(CellValue::from).unwrap_or_default()
    }
}

/// Definition of one table column
pub struct ColumnDefinition<T> {
    /// Unique within a table and stable across renders; keys the sort state
    pub key: String,
    pub header: String,
    pub sortable: bool,
    /// Fixed width in terminal columns, shared proportionally when `None`
    pub width: Option<u16>,
    pub style: Option<Style>,
    accessor: Option<Accessor<T>>,
    renderer: Option<Renderer<T>>,
}

impl<T> Clone for ColumnDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            width: self.width,
            style: self.style,
            accessor: self.accessor.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("has_accessor", &self.accessor.is_some())
            .field("has_renderer", &self.renderer.is_some())
            .finish()
    }
}

impl<T: TableRow> ColumnDefinition<T> {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            width: None,
            style: None,
            accessor: None,
            renderer: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn accessor(mut self, f: impl Fn(&T) -> CellValue + Send + Sync + 'static) -> Self {
        self.accessor = Some(Arc::new(f));
        self
    }

    pub fn renderer(
        mut self,
        f: impl Fn(&CellValue, &T) -> String + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(f));
        self
    }

    /// Raw value of this column for `row`
    pub fn value(&self, row: &T) -> CellValue {
        match &self.accessor {
            Some(accessor) => accessor(row),
            None => row.field(&self.key),
        }
    }

    /// Display text for this column's cell in `row`.
    ///
    /// Renderer output is shown verbatim, even when empty. Without a renderer
    /// falsy values fall back to `"-"`, which includes a numeric zero.
    pub fn display(&self, row: &T) -> String {
        let value = self.value(row);
        match &self.renderer {
            Some(renderer) => renderer(&value, row),
            None => value.display_or_placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_uses_field_lookup_without_accessor() {
        let col: ColumnDefinition<Value> = ColumnDefinition::new("amount", "Amount");
        let row = json!({"amount": 250});
        assert_eq!(col.value(&row), CellValue::Number(250.0));
        assert_eq!(col.display(&row), "250");
    }

    #[test]
    fn test_zero_renders_as_placeholder_without_renderer() {
        let col: ColumnDefinition<Value> = ColumnDefinition::new("claims", "Claims");
        assert_eq!(col.display(&json!({"claims": 0})), "-");
        assert_eq!(col.display(&json!({})), "-");
    }

    #[test]
    fn test_renderer_output_is_shown_as_is() {
        let col: ColumnDefinition<Value> =
            ColumnDefinition::<Value>::new("claims", "Claims").renderer(|v, _| v.to_string());
        assert_eq!(col.display(&json!({"claims": 0})), "0");

        let blank: ColumnDefinition<Value> =
            ColumnDefinition::<Value>::new("note", "Note").renderer(|_, _| String::new());
        assert_eq!(blank.display(&json!({"note": "x"})), "");
    }

    #[test]
    fn test_accessor_overrides_field_lookup() {
        let col: ColumnDefinition<Value> = ColumnDefinition::<Value>::new("holder", "Holder")
            .accessor(|row| {
                row.pointer("/customer/name")
                    .map(CellValue::from)
                    .unwrap_or(CellValue::Null)
            });
        let row = json!({"customer": {"name": "Wanjiru"}});
        assert_eq!(col.display(&row), "Wanjiru");
    }
}
