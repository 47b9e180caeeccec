//! Monitoring snapshots as metric/value rows

use serde_json::Value;

use crate::table::{CellValue, ColumnDefinition, TableRow};

/// One leaf of a snapshot, keyed by its dotted path
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub metric: String,
    pub value: CellValue,
}

impl TableRow for MetricRow {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "metric" => CellValue::Text(self.metric.clone()),
            "value" => self.value.clone(),
            _ => CellValue::Null,
        }
    }

    fn row_id(&self) -> String {
        self.metric.clone()
    }
}

/// Flatten a JSON snapshot into rows, nested objects joined with '.'.
/// Arrays are indexed ("services.0.name").
pub fn flatten_snapshot(body: &Value) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    flatten_into(&mut rows, String::new(), body);
    rows
}

fn flatten_into(rows: &mut Vec<MetricRow>, prefix: String, value: &Value) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(rows, join(key), child);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten_into(rows, join(&i.to_string()), child);
            }
        }
        leaf => rows.push(MetricRow {
            metric: if prefix.is_empty() {
                "value".to_string()
            } else {
                prefix.clone()
            },
            value: CellValue::from(leaf),
        }),
    }
}

/// Columns for snapshot tables. Values render raw, so a zero queue depth
/// shows as "0" rather than the empty-cell placeholder.
pub fn metric_columns() -> Vec<ColumnDefinition<MetricRow>> {
    vec![
        ColumnDefinition::new("metric", "Metric").width(36),
        ColumnDefinition::new("value", "Value").renderer(|value, _| value.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_snapshot() {
        let body = json!({
            "status": "ok",
            "uptime": 0,
            "services": {"sms": {"up": true}},
            "queues": [{"name": "payouts"}]
        });
        let rows = flatten_snapshot(&body);
        let metrics: Vec<&str> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert!(metrics.contains(&"status"));
        assert!(metrics.contains(&"services.sms.up"));
        assert!(metrics.contains(&"queues.0.name"));
    }

    #[test]
    fn test_zero_metric_renders_zero() {
        let rows = flatten_snapshot(&json!({"depth": 0}));
        let columns = metric_columns();
        assert_eq!(columns[1].display(&rows[0]), "0");
    }

    #[test]
    fn test_scalar_snapshot() {
        let rows = flatten_snapshot(&json!("healthy"));
        assert_eq!(rows[0].metric, "value");
    }
}
