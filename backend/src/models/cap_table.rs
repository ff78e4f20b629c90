//! Validated capitalization table
//!
//! `CapTable` is the engine's only configuration. It is built once from a list
//! of share classes, validated up front, and never mutated afterwards, so any
//! number of distribution calls (sequential or on worker threads) can share it.
//!
//! # Critical Invariants
//!
//! 1. At least one share class
//! 2. Class names are unique
//! 3. Every record passes `ShareClass::validate`
//! 4. A capped Participating class can always recover its full preference
//!    (cap multiple >= max(1.0, preference multiple))
//! 5. Every preference and cap amount, and the table totals, fit in i64 cents
//!    (u64 for the share total), so the engine's sums cannot overflow

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

use super::share_class::{PreferenceType, ShareClass, ShareClassError};
use crate::core::money::checked_multiple;

/// Configuration errors for a cap table as a whole
#[derive(Debug, Error, PartialEq)]
pub enum CapTableError {
    #[error("Cap table has no share classes")]
    Empty,

    #[error("Duplicate share class name '{0}'")]
    DuplicateName(String),

    #[error(
        "Share class '{name}': participation cap {cap}x is below the preference it must cover ({minimum}x)"
    )]
    CapBelowPreference { name: String, cap: f64, minimum: f64 },

    #[error("Share class '{name}': {field} does not fit in i64 cents")]
    AmountOutOfRange { name: String, field: &'static str },

    #[error("Cap table {0} is out of range")]
    TotalOutOfRange(&'static str),

    #[error("Invalid share class: {0}")]
    InvalidClass(#[from] ShareClassError),
}

/// Immutable, validated set of share classes
///
/// Classes keep the order they were given in; every per-class vector the
/// engine produces is indexed the same way.
///
/// # Example
/// ```
/// use waterfall_core_rs::{CapTable, PreferenceType, ShareClass};
///
/// let table = CapTable::new(vec![
///     ShareClass::preferred("Series A", 100_000, 100_000_000, PreferenceType::NonParticipating)
///         .with_priority(1),
///     ShareClass::common("Common", 900_000),
/// ])
/// .unwrap();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.total_shares(), 1_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapTable {
    classes: Vec<ShareClass>,
}

impl CapTable {
    /// Validate and freeze a list of share classes
    ///
    /// # Errors
    /// - `Empty` if no classes are given
    /// - `InvalidClass` for the first record that fails validation
    /// - `DuplicateName` if two classes share a name
    /// - `CapBelowPreference` for a capped Participating class whose cap
    ///   would not cover its own preference
    /// - `AmountOutOfRange` / `TotalOutOfRange` when a preference, a cap, or a
    ///   table total would overflow
    pub fn new(classes: Vec<ShareClass>) -> Result<Self, CapTableError> {
        if classes.is_empty() {
            return Err(CapTableError::Empty);
        }

        let mut seen = HashSet::with_capacity(classes.len());
        let mut total_shares: u128 = 0;
        let mut total_invested: i128 = 0;
        let mut total_preference: i128 = 0;

        for class in &classes {
            class.validate()?;
            check_amounts(class)?;

            total_shares += class.shares() as u128;
            total_invested += class.invested() as i128;
            total_preference += class.liquidation_preference() as i128;

            if !seen.insert(class.name().to_string()) {
                return Err(CapTableError::DuplicateName(class.name().to_string()));
            }

            if class.preference_type() == PreferenceType::Participating {
                if let Some(cap) = class.participation_cap() {
                    let minimum = class.preference_multiple().max(1.0);
                    if cap > 0.0 && cap < minimum {
                        return Err(CapTableError::CapBelowPreference {
                            name: class.name().to_string(),
                            cap,
                            minimum,
                        });
                    }
                }
            }
        }

        if total_shares > u64::MAX as u128 {
            return Err(CapTableError::TotalOutOfRange("total shares"));
        }
        if total_invested > i64::MAX as i128 {
            return Err(CapTableError::TotalOutOfRange("total invested"));
        }
        if total_preference > i64::MAX as i128 {
            return Err(CapTableError::TotalOutOfRange("total liquidation preference"));
        }

        Ok(Self { classes })
    }

    /// All classes in input order
    pub fn classes(&self) -> &[ShareClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShareClass> {
        self.classes.get(index)
    }

    /// Find a class by name
    pub fn find(&self, name: &str) -> Option<&ShareClass> {
        self.classes.iter().find(|c| c.name() == name)
    }

    /// Index of a class by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name() == name)
    }

    /// Total shares outstanding, as-converted
    pub fn total_shares(&self) -> u64 {
        self.classes.iter().map(|c| c.shares()).sum()
    }

    /// Total invested across all classes (cents)
    pub fn total_invested(&self) -> i64 {
        self.classes.iter().map(|c| c.invested()).sum()
    }

    /// Sum of all liquidation preferences (cents)
    pub fn total_preference(&self) -> i64 {
        self.classes.iter().map(|c| c.liquidation_preference()).sum()
    }

    /// As-converted ownership fraction of one class (0.0 when no shares exist)
    pub fn ownership(&self, index: usize) -> f64 {
        let total = self.total_shares();
        match self.classes.get(index) {
            Some(class) if total > 0 => class.shares() as f64 / total as f64,
            _ => 0.0,
        }
    }

    /// Classes sorted for display: highest priority first, input order within a priority
    pub fn by_priority(&self) -> Vec<&ShareClass> {
        let mut sorted: Vec<&ShareClass> = self.classes.iter().collect();
        sorted.sort_by(|a, b| b.priority().cmp(&a.priority()));
        sorted
    }

    /// SHA256 fingerprint of the table's canonical JSON form
    ///
    /// Two tables with identical classes in identical order share a fingerprint.
    /// Used to tag exported reports with the configuration that produced them.
    pub fn fingerprint(&self) -> String {
        use serde_json::Value;
        use std::collections::BTreeMap;

        // Sort object keys so the hash does not depend on field order
        fn canonicalize(value: Value) -> Value {
            match value {
                Value::Object(map) => {
                    let sorted: BTreeMap<String, Value> =
                        map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                    Value::Object(sorted.into_iter().collect())
                }
                Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
                other => other,
            }
        }

        // Validated classes hold only finite numbers, so serialization cannot fail
        let value = serde_json::to_value(&self.classes).unwrap_or(Value::Null);
        let json = canonicalize(value).to_string();

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Preference and cap amounts must be representable before the engine uses them
fn check_amounts(class: &ShareClass) -> Result<(), CapTableError> {
    let out_of_range = |field| CapTableError::AmountOutOfRange {
        name: class.name().to_string(),
        field,
    };

    if !class.is_common() && checked_multiple(class.invested(), class.preference_multiple()).is_none() {
        return Err(out_of_range("liquidation preference"));
    }

    if class.preference_type() == PreferenceType::Participating {
        if let Some(cap) = class.participation_cap() {
            if checked_multiple(class.invested(), cap).is_none() {
                return Err(out_of_range("participation cap"));
            }
        }
    }

    Ok(())
}

impl<'de> Deserialize<'de> for CapTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            classes: Vec<ShareClass>,
        }

        let raw = Raw::deserialize(deserializer)?;
        CapTable::new(raw.classes).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Vec<ShareClass>> for CapTable {
    type Error = CapTableError;

    fn try_from(classes: Vec<ShareClass>) -> Result<Self, Self::Error> {
        CapTable::new(classes)
    }
}
