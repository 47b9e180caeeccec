use serde_json::Value;
use std::fmt;

/// Placeholder shown for falsy cell values when a column has no renderer
pub const EMPTY_CELL: &str = "-";

/// A dynamically-typed cell value as it arrives from the backend
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Falsy values are the ones that display as [`EMPTY_CELL`]:
    /// null, `false`, `0`, NaN and the empty string.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Bool(b) => !b,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.is_empty(),
        }
    }

    /// Display text with the falsy fallback applied
    pub fn display_or_placeholder(&self) -> String {
        if self.is_falsy() {
            EMPTY_CELL.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            // Integral numbers print without a trailing ".0"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
            Value::String(s) => CellValue::Text(s.clone()),
            // Nested structures have no tabular form; show them as compact JSON
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values_render_placeholder() {
        assert_eq!(CellValue::Null.display_or_placeholder(), "-");
        assert_eq!(CellValue::Text(String::new()).display_or_placeholder(), "-");
        assert_eq!(CellValue::Number(0.0).display_or_placeholder(), "-");
        assert_eq!(CellValue::Bool(false).display_or_placeholder(), "-");
    }

    #[test]
    fn test_truthy_values_render_raw() {
        assert_eq!(CellValue::Number(42.0).display_or_placeholder(), "42");
        assert_eq!(CellValue::Number(1.5).display_or_placeholder(), "1.5");
        assert_eq!(CellValue::Bool(true).display_or_placeholder(), "true");
        assert_eq!(CellValue::from("KES").display_or_placeholder(), "KES");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(CellValue::from(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from(&json!(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from(&json!("x")), CellValue::Text("x".into()));
        assert_eq!(
            CellValue::from(&json!({"a": 1})),
            CellValue::Text("{\"a\":1}".into())
        );
    }
}
