//! Exit value parsing
//!
//! Accepts `15M`, `1.5b`, `500K` or raw dollar amounts (`25000000`, `$25,000,000`).
//! Values are returned in cents.

use thiserror::Error;
use waterfall_core_rs::dollars_to_cents;

#[derive(Debug, Error, PartialEq)]
pub enum ExitValueError {
    #[error("Invalid exit value format: {0}")]
    Invalid(String),
}

/// Parse one exit value token into cents
///
/// # Example
/// ```
/// use waterfall_cli::exit_values::parse_exit_value;
///
/// assert_eq!(parse_exit_value("15M").unwrap(), 1_500_000_000);
/// assert_eq!(parse_exit_value("1.5b").unwrap(), 150_000_000_000);
/// assert!(parse_exit_value("fifteen").is_err());
/// ```
pub fn parse_exit_value(token: &str) -> Result<i64, ExitValueError> {
    let invalid = || ExitValueError::Invalid(token.to_string());

    let cleaned: String = token
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_'))
        .collect::<String>()
        .to_ascii_uppercase();

    let (number, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], 1e3),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1e6),
        Some('B') => (&cleaned[..cleaned.len() - 1], 1e9),
        Some(_) => (cleaned.as_str(), 1.0),
        None => return Err(invalid()),
    };

    let base: f64 = number.parse().map_err(|_| invalid())?;
    let dollars = base * multiplier;
    if !dollars.is_finite() || dollars.abs() > (i64::MAX / 100) as f64 {
        return Err(invalid());
    }

    Ok(dollars_to_cents(dollars))
}

/// Parse every token, failing on the first bad one
pub fn parse_exit_values<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<i64>, ExitValueError> {
    tokens.iter().map(|t| parse_exit_value(t.as_ref())).collect()
}

/// Short column label: `$15M`, `$1.5B`, `$500K`, `$750`
pub fn format_exit_label(cents: i64) -> String {
    let dollars = cents as f64 / 100.0;
    let (scaled, suffix) = if dollars.abs() >= 1e9 {
        (dollars / 1e9, "B")
    } else if dollars.abs() >= 1e6 {
        (dollars / 1e6, "M")
    } else if dollars.abs() >= 1e3 {
        (dollars / 1e3, "K")
    } else {
        (dollars, "")
    };

    let mut number = format!("{:.2}", scaled);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("${}{}", number, suffix)
}
