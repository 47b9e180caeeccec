//! Tabular data presentation
//!
//! Column definitions, the current page of rows, requested sort, row
//! selection and the compressed paginator. Rendering lives in
//! `ui::table_renderer`; this module holds only state and transitions.

pub mod cell;
pub mod column;
pub mod engine;
pub mod error;
pub mod pagination;
pub mod selection;
pub mod sort;

pub use cell::{CellValue, EMPTY_CELL};
pub use column::{ColumnDefinition, TableRow};
pub use engine::{TableEngine, TableEvent, TableInteraction, TableState};
pub use error::TableError;
pub use pagination::{PageItem, PaginationMetadata};
pub use selection::SelectionSet;
pub use sort::{SortDirection, SortState};
