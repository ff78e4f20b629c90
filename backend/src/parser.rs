//! Cap table loading
//!
//! Maps cap-table rows (CSV or JSON) onto validated `ShareClass` records.
//!
//! Two CSV header layouts are accepted:
//!
//! ```text
//! Share Class,Stack Order,# Shares,Price,LPMultiple,Participation,Convertible,Participation Cap,AD Type
//! Series,Order,Shares,Price,LiqPrefMultiple,Participating,Convertible
//! ```
//!
//! Mapping rules:
//! - Rows with a blank class name are skipped
//! - Blank cells default: shares 0, price 0, multiple 1.0, order 0, cap 0 (uncapped),
//!   Participation FALSE, Convertible TRUE, AD Type None
//! - Invested = shares × price (price in dollars per share, result in cents);
//!   a product outside i64 cents is an error on the Price column
//! - Names Common / ESOP / ESOP/Options / ESOP/Opts are common stock; otherwise
//!   Participation TRUE means participating, FALSE non-participating
//! - Priority = stack order
//!
//! Malformed values are errors, never silently defaulted.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::core::money::checked_dollars_to_cents;
use crate::models::{
    AntiDilutionType, CapTable, CapTableError, PreferenceType, ShareClass, ShareClassError,
};

/// Errors while loading a cap table
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read cap table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row {row}: invalid value '{value}' for column '{column}'")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: {source}")]
    InvalidClass {
        row: usize,
        #[source]
        source: ShareClassError,
    },

    #[error("{0}")]
    CapTable(#[from] CapTableError),
}

// Column aliases: new layout first, legacy layout second
const COL_NAME: &[&str] = &["Share Class", "Series"];
const COL_ORDER: &[&str] = &["Stack Order", "Order"];
const COL_SHARES: &[&str] = &["# Shares", "Shares"];
const COL_PRICE: &[&str] = &["Price"];
const COL_MULTIPLE: &[&str] = &["LPMultiple", "LiqPrefMultiple"];
const COL_PARTICIPATION: &[&str] = &["Participation", "Participating"];
const COL_CONVERTIBLE: &[&str] = &["Convertible"];
const COL_CAP: &[&str] = &["Participation Cap"];
const COL_AD_TYPE: &[&str] = &["AD Type"];

const COMMON_NAMES: &[&str] = &["common", "esop", "esop/options", "esop/opts"];

/// One input row, keyed by column header
#[derive(Debug, Default)]
struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    fn insert(&mut self, column: &str, value: &str) {
        self.fields
            .insert(column.trim().to_string(), value.trim().to_string());
    }

    /// First non-empty value among the column aliases
    fn get(&self, aliases: &[&'static str]) -> Option<(&'static str, &str)> {
        aliases.iter().find_map(|&alias| {
            self.fields
                .get(alias)
                .map(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(|v| (alias, v))
        })
    }

    fn number<T: std::str::FromStr>(
        &self,
        row: usize,
        aliases: &[&'static str],
        default: T,
    ) -> Result<T, ParseError> {
        match self.get(aliases) {
            None => Ok(default),
            Some((column, value)) => clean_number(value).parse().map_err(|_| ParseError::InvalidField {
                row,
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }

    fn flag(&self, row: usize, aliases: &[&'static str], default: bool) -> Result<bool, ParseError> {
        match self.get(aliases) {
            None => Ok(default),
            Some((column, value)) => match value.to_ascii_uppercase().as_str() {
                "TRUE" | "YES" | "Y" | "1" => Ok(true),
                "FALSE" | "NO" | "N" | "0" => Ok(false),
                _ => Err(ParseError::InvalidField {
                    row,
                    column: column.to_string(),
                    value: value.to_string(),
                }),
            },
        }
    }

    /// Convert to a share class; `Ok(None)` for rows without a name
    fn to_share_class(&self, row: usize) -> Result<Option<ShareClass>, ParseError> {
        let name = match self.get(COL_NAME) {
            Some((_, name)) => name.to_string(),
            None => return Ok(None),
        };

        let shares = self.whole_number(row, COL_SHARES)?;
        if shares < 0 {
            return Err(ParseError::InvalidClass {
                row,
                source: ShareClassError::NegativeShares { name, shares },
            });
        }
        let shares = shares as u64;

        let price: f64 = self.number(row, COL_PRICE, 0.0)?;
        let multiple: f64 = self.number(row, COL_MULTIPLE, 1.0)?;
        let cap: f64 = self.number(row, COL_CAP, 0.0)?;
        let order: i32 = self.number(row, COL_ORDER, 0)?;
        let participating = self.flag(row, COL_PARTICIPATION, false)?;
        let convertible = self.flag(row, COL_CONVERTIBLE, true)?;
        let anti_dilution = self
            .get(COL_AD_TYPE)
            .map(|(_, code)| AntiDilutionType::from_code(code))
            .unwrap_or_default();

        let preference_type = if COMMON_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
            PreferenceType::Common
        } else if participating {
            PreferenceType::Participating
        } else {
            PreferenceType::NonParticipating
        };

        let invested = match checked_dollars_to_cents(shares as f64 * price) {
            Some(invested) => invested,
            None => {
                let (column, value) = self.get(COL_PRICE).unwrap_or((COL_PRICE[0], ""));
                return Err(ParseError::InvalidField {
                    row,
                    column: column.to_string(),
                    value: value.to_string(),
                });
            }
        };

        let class = ShareClass::preferred(name, shares, invested, preference_type)
            .with_multiple(multiple)
            .with_cap(cap)
            .with_priority(order)
            .with_convertible(convertible)
            .with_anti_dilution(anti_dilution);

        class
            .validate()
            .map_err(|source| ParseError::InvalidClass { row, source })?;

        Ok(Some(class))
    }

    /// Share counts may arrive as "100000" or "100000.0"
    fn whole_number(&self, row: usize, aliases: &[&'static str]) -> Result<i64, ParseError> {
        let Some((column, value)) = self.get(aliases) else {
            return Ok(0);
        };
        let cleaned = clean_number(value);
        if let Ok(n) = cleaned.parse::<i64>() {
            return Ok(n);
        }
        // Magnitudes of 2^63 and beyond would saturate on the cast
        match cleaned.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            _ => Err(ParseError::InvalidField {
                row,
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Drop thousands separators and currency symbols
fn clean_number(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, ',' | '$' | '_')).collect()
}

fn build_cap_table(records: Vec<RawRecord>) -> Result<CapTable, ParseError> {
    let mut classes = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        // Row numbers are 1-based data rows (header excluded)
        if let Some(class) = record.to_share_class(i + 1)? {
            classes.push(class);
        }
    }

    debug!(classes = classes.len(), "Parsed cap table");
    Ok(CapTable::new(classes)?)
}

/// Parse a cap table from CSV text
///
/// # Example
/// ```
/// use waterfall_core_rs::parser::parse_cap_table_csv;
///
/// let csv = "\
/// Share Class,Stack Order,# Shares,Price,LPMultiple,Participation,Convertible,Participation Cap,AD Type
/// Series A,1,100000,10.0,1.0,FALSE,TRUE,0,None
/// Common,0,900000,0,1.0,FALSE,FALSE,0,None
/// ";
/// let table = parse_cap_table_csv(csv.as_bytes()).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.classes()[0].invested(), 100_000_000); // $1M
/// ```
pub fn parse_cap_table_csv<R: Read>(reader: R) -> Result<CapTable, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut record = RawRecord::default();
        for (column, value) in headers.iter().zip(row.iter()) {
            record.insert(column, value);
        }
        records.push(record);
    }

    build_cap_table(records)
}

/// Parse a cap table from a CSV file
pub fn parse_cap_table_path<P: AsRef<Path>>(path: P) -> Result<CapTable, ParseError> {
    let file = File::open(path)?;
    parse_cap_table_csv(file)
}

/// Parse a cap table from already-split rows (column header → cell text)
///
/// Used by callers that hold rows in memory rather than as CSV text.
pub fn parse_cap_table_records<'a, I>(rows: I) -> Result<CapTable, ParseError>
where
    I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
    let records = rows
        .into_iter()
        .map(|row| {
            let mut record = RawRecord::default();
            for (column, value) in row {
                record.insert(column, value);
            }
            record
        })
        .collect();

    build_cap_table(records)
}

/// Parse a cap table from a JSON array of row objects
///
/// Keys are the CSV column names; values may be strings, numbers or booleans.
///
/// # Example
/// ```
/// use waterfall_core_rs::parser::parse_cap_table_json;
///
/// let json = r##"[
///     {"Share Class": "Series A", "Stack Order": 1, "# Shares": 100000, "Price": 10.0,
///      "LPMultiple": 1.0, "Participation": "FALSE", "Convertible": "TRUE"},
///     {"Share Class": "Common", "Stack Order": 0, "# Shares": 500000, "Price": 1.0}
/// ]"##;
/// let table = parse_cap_table_json(json).unwrap();
/// assert_eq!(table.total_shares(), 600_000);
/// ```
pub fn parse_cap_table_json(json: &str) -> Result<CapTable, ParseError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;
    let rows: Vec<BTreeMap<String, String>> = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(column, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Bool(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (column, text)
                })
                .collect()
        })
        .collect();

    parse_cap_table_records(&rows)
}
