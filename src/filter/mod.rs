//! Search and filter coordination
//!
//! Debounces free-text search and merges it with discrete filter selections
//! into one notification stream for the host screen.

pub mod coordinator;
pub mod debouncer;

pub use coordinator::{
    FilterCoordinator, FilterDefinition, FilterError, FilterEvent, FilterOption, FilterValues,
    DEFAULT_DEBOUNCE_MS,
};
pub use debouncer::Debouncer;
