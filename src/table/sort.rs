use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Header suffix shown next to the active sort column
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        }
    }
}

/// Requested ordering of the table.
///
/// This is intent only: the table never reorders the rows it was given. Hosts
/// read it and ask the data supplier for rows in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    column: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.column.as_deref() == Some(key)
    }

    /// Advance the sort for a header click on `key`.
    /// Same column flips the direction, a new column starts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.is_sorted_by(key) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn indicator_for(&self, key: &str) -> &'static str {
        if self.is_sorted_by(key) {
            self.direction.indicator()
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_column() {
        let sort = SortState::new();
        assert_eq!(sort.column(), None);
        assert_eq!(sort.indicator_for("amount"), "");
    }

    #[test]
    fn test_toggle_cycles_asc_desc_asc() {
        let mut sort = SortState::new();
        sort.toggle("amount");
        assert_eq!(sort.direction(), SortDirection::Asc);
        sort.toggle("amount");
        assert_eq!(sort.direction(), SortDirection::Desc);
        sort.toggle("amount");
        assert_eq!(sort.direction(), SortDirection::Asc);
    }

    #[test]
    fn test_new_column_resets_to_asc() {
        let mut sort = SortState::new();
        sort.toggle("amount");
        sort.toggle("amount");
        sort.toggle("created_at");
        assert_eq!(sort.column(), Some("created_at"));
        assert_eq!(sort.direction(), SortDirection::Asc);
    }
}
