//! Output rendering
//!
//! The text views mirror a classic waterfall worksheet; the csv, markdown and
//! html renderers emit the same waterfall table in machine-friendly form.

pub mod delimited;
pub mod html;
pub mod json;
pub mod markdown;
pub mod text;

use waterfall_core_rs::cents_to_dollars;

use crate::analysis::Analysis;
use crate::exit_values::format_exit_label;

/// One share class row of the waterfall table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub name: String,
    pub kind: &'static str,
    pub invested: i64,

    /// Payout per exit value; `None` where that exit value failed
    pub payouts: Vec<Option<i64>>,
}

/// Share classes (highest priority first) × exit values
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallTable {
    pub labels: Vec<String>,
    pub rows: Vec<TableRow>,
    pub total_invested: i64,

    /// Sum of class payouts per exit value
    pub totals: Vec<Option<i64>>,

    /// Proceeds no class could absorb, per exit value
    pub unallocated: Vec<Option<i64>>,
}

impl WaterfallTable {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let cap_table = analysis.engine().cap_table();
        let columns = analysis.columns();

        let labels = columns.iter().map(|c| format_exit_label(c.exit_value)).collect();

        let rows = cap_table
            .by_priority()
            .into_iter()
            .map(|class| TableRow {
                name: class.name().to_string(),
                kind: class.preference_type().label(),
                invested: class.invested(),
                payouts: columns
                    .iter()
                    .map(|c| c.outcome.as_ref().ok().and_then(|r| r.payout(class.name())))
                    .collect(),
            })
            .collect();

        let totals = columns
            .iter()
            .map(|c| c.outcome.as_ref().ok().map(|r| r.total_allocated()))
            .collect();

        let unallocated = columns
            .iter()
            .map(|c| c.outcome.as_ref().ok().map(|r| r.unallocated))
            .collect();

        Self {
            labels,
            rows,
            total_invested: cap_table.total_invested(),
            totals,
            unallocated,
        }
    }

    /// Whether any column left proceeds unallocated; renderers add a row for it
    pub fn has_unallocated(&self) -> bool {
        self.unallocated.iter().any(|u| matches!(u, Some(amount) if *amount > 0))
    }
}

/// `$12.35M`
pub fn format_millions(cents: i64) -> String {
    format!("${:.2}M", cents_to_dollars(cents) / 1e6)
}

/// `$1,234,567.89`
pub fn format_dollars(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

/// Plain dollars with two decimals, no symbol or separators (csv cells)
pub fn format_plain(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0), "$0.00");
        assert_eq!(format_dollars(5), "$0.05");
        assert_eq!(format_dollars(123_456_789), "$1,234,567.89");
        assert_eq!(format_dollars(100_000), "$1,000.00");
        assert_eq!(format_dollars(-150), "-$1.50");
    }

    #[test]
    fn test_format_millions() {
        assert_eq!(format_millions(1_234_567_800), "$12.35M");
        assert_eq!(format_millions(0), "$0.00M");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(123_456_789), "1234567.89");
        assert_eq!(format_plain(7), "0.07");
    }
}
