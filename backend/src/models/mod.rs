//! Domain models for the liquidation waterfall

pub mod cap_table;
pub mod distribution;
pub mod share_class;

// Re-exports
pub use cap_table::{CapTable, CapTableError};
pub use distribution::{ClassPayout, ConversionDecision, DistributionResult};
pub use share_class::{AntiDilutionType, PreferenceType, ShareClass, ShareClassError};
