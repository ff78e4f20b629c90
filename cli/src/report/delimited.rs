//! CSV rendering of the waterfall table

use anyhow::{anyhow, Context, Result};

use super::{format_plain, WaterfallTable};

/// One header row, one row per class, one totals row; amounts in dollars
pub fn render(table: &WaterfallTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Series".to_string(), "Type".to_string(), "Invested".to_string()];
    header.extend(table.labels.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.name.clone(), row.kind.to_string(), format_plain(row.invested)];
        record.extend(row.payouts.iter().map(|p| p.map(format_plain).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    let mut totals = vec!["Total".to_string(), String::new(), format_plain(table.total_invested)];
    totals.extend(table.totals.iter().map(|t| t.map(format_plain).unwrap_or_default()));
    writer.write_record(&totals)?;

    if table.has_unallocated() {
        let mut residual = vec!["Unallocated".to_string(), String::new(), String::new()];
        residual.extend(table.unallocated.iter().map(|u| u.map(format_plain).unwrap_or_default()));
        writer.write_record(&residual)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
