//! Liquidation Waterfall Core - Rust Engine
//!
//! Computes how the proceeds of a company sale are split across share classes
//! according to their liquidation preferences, participation rights, caps and
//! conversion options.
//!
//! # Architecture
//!
//! - **core**: Integer money helpers (multiples, pro-rata allocation)
//! - **models**: Domain types (ShareClass, CapTable, DistributionResult)
//! - **waterfall**: Priority grouping, preference payment, cap enforcement,
//!   conversion evaluation
//! - **orchestrator**: Waterfall engine and report export
//! - **parser**: Cap table loading from CSV / JSON rows
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Every distribution accounts for the full exit value
//! 3. Same cap table + same exit value = same distribution
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod waterfall;

// Re-exports for convenience
pub use core::money::{cents_to_dollars, dollars_to_cents};
pub use models::{
    cap_table::{CapTable, CapTableError},
    distribution::{ClassPayout, ConversionDecision, DistributionResult},
    share_class::{AntiDilutionType, PreferenceType, ShareClass, ShareClassError},
};
pub use orchestrator::{calculate_distribution, WaterfallEngine, WaterfallError, WaterfallReport};
pub use parser::{
    parse_cap_table_csv, parse_cap_table_json, parse_cap_table_path, parse_cap_table_records, ParseError,
};
pub use waterfall::InvariantViolation;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn waterfall_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::calculator::PyWaterfallCalculator>()?;
    Ok(())
}
