use thiserror::Error;

/// Caller contract violations rejected by the table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("page {page} is outside 1..={pages}")]
    PageOutOfRange { page: u32, pages: u32 },

    #[error("page size must be greater than zero")]
    ZeroLimit,

    #[error("pages is {pages} but total {total} at limit {limit} needs {expected}")]
    InconsistentPages {
        total: u64,
        limit: u32,
        pages: u32,
        expected: u32,
    },

    #[error("row id {0:?} appears more than once on the current page")]
    DuplicateRowId(String),

    #[error("duplicate column key {0:?}")]
    DuplicateColumnKey(String),

    #[error("no row at index {0}")]
    RowOutOfRange(usize),

    #[error("no column at index {0}")]
    ColumnOutOfRange(usize),
}
