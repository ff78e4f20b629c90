//! Orchestrator - waterfall engine and report export
//!
//! See `engine.rs` for the distribution pipeline.

pub mod engine;
pub mod report;

// Re-export main types for convenience
pub use engine::{calculate_distribution, WaterfallEngine, WaterfallError};
pub use report::{collect_batch, ClassSummary, ReportEntry, WaterfallReport};
