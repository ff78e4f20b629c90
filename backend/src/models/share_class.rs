//! Share class model
//!
//! One row of a capitalization table: how many shares a class holds, how much
//! was invested for them, and the economic terms attached.
//! Each share class has:
//! - Name (unique within a cap table)
//! - Shares outstanding and invested amount (i64 cents)
//! - Preference type (Common, Non-participating, Participating)
//! - Preference multiple and optional participation cap multiple
//! - Priority (stack order; higher = paid earlier)
//! - Convertible flag and anti-dilution marker
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::money::apply_multiple;

/// Liquidation preference treatment of a share class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceType {
    /// Plain common stock: no preference, shares pro-rata in the residual
    Common,

    /// Takes the greater of its preference or its as-converted share
    NonParticipating,

    /// Takes its preference and then also shares pro-rata in the residual
    Participating,
}

impl PreferenceType {
    /// Human-readable label ("Non Participating")
    pub fn label(&self) -> &'static str {
        match self {
            PreferenceType::Common => "Common",
            PreferenceType::NonParticipating => "Non Participating",
            PreferenceType::Participating => "Participating",
        }
    }
}

/// Anti-dilution protection marker
///
/// Carried through from the cap table for display. The engine does not adjust
/// share counts for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AntiDilutionType {
    #[default]
    None,
    FullRatchet,
    WeightedAverage,
}

impl AntiDilutionType {
    /// Parse the cap-table code ("None", "FR", "WA"); unknown codes map to `None`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "FR" => AntiDilutionType::FullRatchet,
            "WA" => AntiDilutionType::WeightedAverage,
            _ => AntiDilutionType::None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AntiDilutionType::None => "None",
            AntiDilutionType::FullRatchet => "FR",
            AntiDilutionType::WeightedAverage => "WA",
        }
    }
}

/// Errors for a single malformed share class record
#[derive(Debug, Error, PartialEq)]
pub enum ShareClassError {
    #[error("Share class name must not be empty")]
    EmptyName,

    #[error("Share class '{name}': invested amount {invested} must not be negative")]
    NegativeInvestment { name: String, invested: i64 },

    #[error("Share class '{name}': {field} {value} must be a finite, non-negative number")]
    InvalidMultiple {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("Share class '{name}': priority {priority} must not be negative")]
    NegativePriority { name: String, priority: i32 },

    #[error("Share class '{name}': share count {shares} must not be negative")]
    NegativeShares { name: String, shares: i64 },
}

/// A class of shares with its liquidation terms
///
/// # Example
/// ```
/// use waterfall_core_rs::{PreferenceType, ShareClass};
///
/// let series_a = ShareClass::preferred(
///     "Series A",
///     200_000,          // shares
///     200_000_000,      // $2,000,000.00 in cents
///     PreferenceType::Participating,
/// )
/// .with_cap(2.0)
/// .with_priority(2);
///
/// assert_eq!(series_a.liquidation_preference(), 200_000_000);
/// assert_eq!(series_a.cap_amount(), Some(400_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClass {
    /// Unique class name (e.g., "Series A", "Common")
    name: String,

    /// Shares outstanding (as-converted share count)
    shares: u64,

    /// Total invested for this class (i64 cents)
    invested: i64,

    /// Preference treatment
    preference_type: PreferenceType,

    /// Liquidation preference multiple (1.0 = 1x); ignored for Common
    preference_multiple: f64,

    /// Total payout cap as a multiple of invested, Participating only
    /// `None` = uncapped
    participation_cap: Option<f64>,

    /// Stack order: higher = paid earlier
    priority: i32,

    /// Whether the class may convert to common
    convertible: bool,

    /// Anti-dilution marker (display only)
    anti_dilution: AntiDilutionType,
}

impl ShareClass {
    /// Create a common stock class (priority 0, no preference)
    pub fn common(name: impl Into<String>, shares: u64) -> Self {
        Self {
            name: name.into(),
            shares,
            invested: 0,
            preference_type: PreferenceType::Common,
            preference_multiple: 1.0,
            participation_cap: None,
            priority: 0,
            convertible: true,
            anti_dilution: AntiDilutionType::None,
        }
    }

    /// Create a preferred (or common) class with a 1x multiple, uncapped, priority 0
    ///
    /// # Arguments
    /// * `name` - Class name
    /// * `shares` - Shares outstanding
    /// * `invested` - Amount invested in cents
    /// * `preference_type` - Preference treatment
    pub fn preferred(
        name: impl Into<String>,
        shares: u64,
        invested: i64,
        preference_type: PreferenceType,
    ) -> Self {
        Self {
            name: name.into(),
            shares,
            invested,
            preference_type,
            preference_multiple: 1.0,
            participation_cap: None,
            priority: 0,
            convertible: true,
            anti_dilution: AntiDilutionType::None,
        }
    }

    /// Set the liquidation preference multiple
    pub fn with_multiple(mut self, multiple: f64) -> Self {
        self.preference_multiple = multiple;
        self
    }

    /// Set the participation cap multiple (0 = uncapped)
    pub fn with_cap(mut self, cap: f64) -> Self {
        self.participation_cap = if cap == 0.0 { None } else { Some(cap) };
        self
    }

    /// Set the priority (stack order)
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the class as unable to convert to common
    pub fn non_convertible(mut self) -> Self {
        self.convertible = false;
        self
    }

    /// Set whether the class may convert to common
    pub fn with_convertible(mut self, convertible: bool) -> Self {
        self.convertible = convertible;
        self
    }

    /// Set the anti-dilution marker
    pub fn with_anti_dilution(mut self, anti_dilution: AntiDilutionType) -> Self {
        self.anti_dilution = anti_dilution;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }

    pub fn invested(&self) -> i64 {
        self.invested
    }

    pub fn preference_type(&self) -> PreferenceType {
        self.preference_type
    }

    pub fn preference_multiple(&self) -> f64 {
        self.preference_multiple
    }

    pub fn participation_cap(&self) -> Option<f64> {
        self.participation_cap
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_convertible(&self) -> bool {
        self.convertible
    }

    pub fn anti_dilution(&self) -> AntiDilutionType {
        self.anti_dilution
    }

    pub fn is_common(&self) -> bool {
        self.preference_type == PreferenceType::Common
    }

    // ========================================================================
    // Derived terms
    // ========================================================================

    /// Liquidation preference in cents: invested × multiple (0 for Common)
    pub fn liquidation_preference(&self) -> i64 {
        match self.preference_type {
            PreferenceType::Common => 0,
            _ => apply_multiple(self.invested, self.preference_multiple),
        }
    }

    /// Maximum total payout (preference + participation) in cents
    ///
    /// Only Participating classes with a cap have one.
    pub fn cap_amount(&self) -> Option<i64> {
        match (self.preference_type, self.participation_cap) {
            (PreferenceType::Participating, Some(cap)) if cap > 0.0 => {
                Some(apply_multiple(self.invested, cap))
            }
            _ => None,
        }
    }

    /// Whether the class gets a conversion decision at each exit value
    pub fn can_elect_conversion(&self) -> bool {
        self.preference_type == PreferenceType::NonParticipating && self.convertible
    }

    /// Issue price per share in cents (0 when no shares or no investment)
    pub fn price_per_share(&self) -> f64 {
        if self.shares == 0 || self.invested <= 0 {
            0.0
        } else {
            self.invested as f64 / self.shares as f64
        }
    }

    /// Check the record on its own (cross-class checks live in `CapTable`)
    pub fn validate(&self) -> Result<(), ShareClassError> {
        if self.name.trim().is_empty() {
            return Err(ShareClassError::EmptyName);
        }

        if self.invested < 0 {
            return Err(ShareClassError::NegativeInvestment {
                name: self.name.clone(),
                invested: self.invested,
            });
        }

        if !self.preference_multiple.is_finite() || self.preference_multiple < 0.0 {
            return Err(ShareClassError::InvalidMultiple {
                name: self.name.clone(),
                field: "preference multiple",
                value: self.preference_multiple,
            });
        }

        if let Some(cap) = self.participation_cap {
            if !cap.is_finite() || cap < 0.0 {
                return Err(ShareClassError::InvalidMultiple {
                    name: self.name.clone(),
                    field: "participation cap",
                    value: cap,
                });
            }
        }

        if self.priority < 0 {
            return Err(ShareClassError::NegativePriority {
                name: self.name.clone(),
                priority: self.priority,
            });
        }

        Ok(())
    }
}
