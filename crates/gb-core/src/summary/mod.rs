//! Posterior summaries and convergence diagnostics.

pub mod diagnostics;
pub mod table;

pub use table::{summarize, SummaryRow, SummaryTable};
