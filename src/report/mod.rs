//! Run reporting: JSON export and terminal summary

pub mod export;
pub mod renderer;

pub use export::{ExportDocument, ExportError};
pub use renderer::SummaryRenderer;
