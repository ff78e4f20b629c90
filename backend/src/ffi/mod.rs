//! Python bindings
//!
//! Exposes the waterfall engine as a `WaterfallCalculator` class. Money crosses
//! the boundary in dollars (Python floats) and is converted to cents on entry.

pub mod calculator;
pub mod types;

pub use calculator::PyWaterfallCalculator;
