//! Input data: the reviewer/author/grade table.

pub mod loader;

pub use loader::{
    load_observations, load_observations_from_reader, DataTable, Observation, AUTHOR_COLUMN,
    GRADE_COLUMN, NA_TOKENS, REVIEWER_COLUMN,
};
