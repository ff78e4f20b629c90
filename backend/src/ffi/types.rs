//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyList};
use std::collections::BTreeMap;

use crate::core::money::cents_to_dollars;
use crate::models::{CapTable, DistributionResult};
use crate::orchestrator::WaterfallError;
use crate::parser::ParseError;

// ========================================================================
// Error Mapping
// ========================================================================

/// Bad input becomes ValueError; an internal consistency failure becomes RuntimeError
pub fn waterfall_error_to_py(err: WaterfallError) -> PyErr {
    match err {
        WaterfallError::InvariantViolation(_) => PyRuntimeError::new_err(err.to_string()),
        WaterfallError::NegativeExitValue(_) | WaterfallError::Configuration(_) => {
            PyValueError::new_err(err.to_string())
        }
    }
}

pub fn parse_error_to_py(err: ParseError) -> PyErr {
    match err {
        ParseError::Io(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

// ========================================================================
// Input Conversion
// ========================================================================

/// Convert a list of row dicts into column → cell text maps
///
/// Booleans become TRUE/FALSE, None becomes an empty cell, everything else
/// goes through `str()`.
///
/// # Errors
/// Returns PyValueError if an element is not a dict
pub fn records_from_py(records: &Bound<'_, PyList>) -> PyResult<Vec<BTreeMap<String, String>>> {
    let mut rows = Vec::with_capacity(records.len());

    for (i, item) in records.iter().enumerate() {
        let dict = item.downcast::<PyDict>().map_err(|_| {
            PyValueError::new_err(format!("Record {} must be a dict", i + 1))
        })?;

        let mut row = BTreeMap::new();
        for (key, value) in dict.iter() {
            let column: String = key.str()?.to_string();
            let text = if value.is_none() {
                String::new()
            } else if let Ok(flag) = value.downcast::<PyBool>() {
                if flag.is_true() { "TRUE" } else { "FALSE" }.to_string()
            } else {
                value.str()?.to_string()
            };
            row.insert(column, text);
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Exit value in dollars → cents, rejecting NaN, infinities and negatives
pub fn exit_value_from_py(exit_value: f64) -> PyResult<i64> {
    if !exit_value.is_finite() {
        return Err(PyValueError::new_err(format!(
            "Exit value must be a finite number (got {})",
            exit_value
        )));
    }
    if exit_value < 0.0 {
        return Err(PyValueError::new_err(format!(
            "Exit value must not be negative (got {})",
            exit_value
        )));
    }
    Ok(crate::core::money::dollars_to_cents(exit_value))
}

// ========================================================================
// Output Conversion
// ========================================================================

/// Class name → payout in dollars
pub fn distribution_to_py(py: Python<'_>, result: &DistributionResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    for payout in &result.payouts {
        dict.set_item(&payout.name, cents_to_dollars(payout.total))?;
    }
    Ok(dict.unbind())
}

/// Full breakdown: per-class phases, conversion decisions, residual
pub fn detailed_to_py(
    py: Python<'_>,
    cap_table: &CapTable,
    result: &DistributionResult,
) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("exit_value", cents_to_dollars(result.exit_value))?;
    dict.set_item("unallocated", cents_to_dollars(result.unallocated))?;

    let classes = PyList::empty_bound(py);
    for (class, payout) in cap_table.classes().iter().zip(&result.payouts) {
        let row = PyDict::new_bound(py);
        row.set_item("name", &payout.name)?;
        row.set_item("preference_type", class.preference_type().label())?;
        row.set_item("priority", class.priority())?;
        row.set_item("liquidation_preference", cents_to_dollars(class.liquidation_preference()))?;
        row.set_item("preference", cents_to_dollars(payout.preference))?;
        row.set_item("participation", cents_to_dollars(payout.participation))?;
        row.set_item("total", cents_to_dollars(payout.total))?;
        row.set_item("converted", payout.converted)?;
        row.set_item("capped", payout.capped)?;
        classes.append(row)?;
    }
    dict.set_item("classes", classes)?;

    let conversions = PyList::empty_bound(py);
    for decision in &result.conversions {
        let row = PyDict::new_bound(py);
        row.set_item("name", &decision.name)?;
        row.set_item("preference_payout", cents_to_dollars(decision.preference_payout))?;
        row.set_item("converted_payout", cents_to_dollars(decision.converted_payout))?;
        row.set_item("converted", decision.converted)?;
        conversions.append(row)?;
    }
    dict.set_item("conversions", conversions)?;

    Ok(dict.unbind())
}
