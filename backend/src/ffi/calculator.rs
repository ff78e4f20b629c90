//! PyO3 wrapper for the waterfall engine

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{
    detailed_to_py, distribution_to_py, exit_value_from_py, parse_error_to_py, records_from_py,
    waterfall_error_to_py,
};
use crate::orchestrator::WaterfallEngine;
use crate::parser::{parse_cap_table_path, parse_cap_table_records};

/// Python wrapper for `WaterfallEngine`
///
/// # Example (from Python)
///
/// ```python
/// from waterfall_core_rs import WaterfallCalculator
///
/// calc = WaterfallCalculator.from_csv("cap_table.csv")
/// payouts = calc.calculate_distribution(25_000_000)
/// print(payouts["Series A"])
/// ```
#[pyclass(name = "WaterfallCalculator", frozen)]
pub struct PyWaterfallCalculator {
    inner: WaterfallEngine,
}

#[pymethods]
impl PyWaterfallCalculator {
    /// Load a cap table from a CSV file
    ///
    /// # Errors
    ///
    /// Raises IOError if the file cannot be read, ValueError if a row is malformed
    #[staticmethod]
    fn from_csv(path: &str) -> PyResult<Self> {
        let cap_table = parse_cap_table_path(path).map_err(parse_error_to_py)?;
        Ok(Self {
            inner: WaterfallEngine::new(cap_table),
        })
    }

    /// Build a cap table from a list of row dicts keyed by CSV column name
    #[staticmethod]
    fn from_records(records: &Bound<'_, PyList>) -> PyResult<Self> {
        let rows = records_from_py(records)?;
        let cap_table = parse_cap_table_records(&rows).map_err(parse_error_to_py)?;
        Ok(Self {
            inner: WaterfallEngine::new(cap_table),
        })
    }

    /// Payout per share class (dollars) for an exit value in dollars
    fn calculate_distribution(&self, py: Python<'_>, exit_value: f64) -> PyResult<Py<PyDict>> {
        let cents = exit_value_from_py(exit_value)?;
        let result = self
            .inner
            .calculate_distribution(cents)
            .map_err(waterfall_error_to_py)?;
        distribution_to_py(py, &result)
    }

    /// Per-class breakdown plus conversion decisions
    fn calculate_detailed(&self, py: Python<'_>, exit_value: f64) -> PyResult<Py<PyDict>> {
        let cents = exit_value_from_py(exit_value)?;
        let result = self
            .inner
            .calculate_distribution(cents)
            .map_err(waterfall_error_to_py)?;
        detailed_to_py(py, self.inner.cap_table(), &result)
    }

    /// Share class names in cap-table order
    fn share_class_names(&self) -> Vec<String> {
        self.inner
            .cap_table()
            .classes()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// SHA256 fingerprint of the loaded cap table
    fn fingerprint(&self) -> String {
        self.inner.cap_table().fingerprint()
    }

    fn __len__(&self) -> usize {
        self.inner.cap_table().len()
    }

    fn __repr__(&self) -> String {
        format!("WaterfallCalculator(classes={})", self.inner.cap_table().len())
    }
}
