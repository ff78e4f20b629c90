//! Plain-text views

use std::collections::BTreeMap;

use waterfall_core_rs::{CapTable, DistributionResult, ShareClass};

use super::{format_dollars, format_millions, WaterfallTable};
use crate::analysis::{Analysis, Column};
use crate::exit_values::format_exit_label;

/// Cap table rows, highest priority first, with ownership
pub fn cap_table_summary(cap_table: &CapTable) -> String {
    let mut lines = vec!["Cap Table Summary".to_string(), "=".repeat(100)];

    lines.push(format!(
        "{:<14} {:>5} {:>12} {:>12} {:>18} {:<17} {:>6} {:>9}",
        "Series", "Stack", "Shares", "Price", "Invested", "Type", "Cap", "Ownership"
    ));
    lines.push("-".repeat(100));

    for class in cap_table.by_priority() {
        lines.push(summary_row(cap_table, class));
    }

    lines.push("-".repeat(100));
    lines.push(format!(
        "{:<14} {:>5} {:>12} {:>12} {:>18}",
        "Total",
        "",
        cap_table.total_shares(),
        "",
        format_dollars(cap_table.total_invested())
    ));
    lines.push(String::new());

    lines.join("\n") + "\n"
}

fn summary_row(cap_table: &CapTable, class: &ShareClass) -> String {
    let ownership = cap_table
        .index_of(class.name())
        .map(|i| cap_table.ownership(i) * 100.0)
        .unwrap_or(0.0);
    let cap = class
        .participation_cap()
        .map(|c| format!("{:.1}x", c))
        .unwrap_or_else(|| "None".to_string());

    format!(
        "{:<14} {:>5} {:>12} {:>12} {:>18} {:<17} {:>6} {:>8.1}%",
        class.name(),
        class.priority(),
        class.shares(),
        format!("${:.4}", class.price_per_share() / 100.0),
        format_dollars(class.invested()),
        class.preference_type().label(),
        cap,
        ownership
    )
}

/// One column per exit value, one row per class, totals at the bottom
pub fn waterfall_analysis(table: &WaterfallTable) -> String {
    let width = 50 + 12 * table.labels.len();
    let mut lines = vec!["Waterfall Analysis".to_string(), "=".repeat(width)];

    let mut header = format!("{:<18} {:<17} {:>12}", "Series", "Type", "Invested");
    for label in &table.labels {
        header.push_str(&format!(" {:>11}", label));
    }
    lines.push(header);
    lines.push("-".repeat(width));

    for row in &table.rows {
        let mut line = format!("{:<18} {:<17} {:>12}", row.name, row.kind, format_millions(row.invested));
        for payout in &row.payouts {
            line.push_str(&format!(" {:>11}", cell(*payout)));
        }
        lines.push(line);
    }

    lines.push("-".repeat(width));
    let mut total = format!("{:<18} {:<17} {:>12}", "Total", "", format_millions(table.total_invested));
    for value in &table.totals {
        total.push_str(&format!(" {:>11}", cell(*value)));
    }
    lines.push(total);
    if table.has_unallocated() {
        let mut residual = format!("{:<18} {:<17} {:>12}", "Unallocated", "", "");
        for value in &table.unallocated {
            residual.push_str(&format!(" {:>11}", cell(*value)));
        }
        lines.push(residual);
    }
    lines.push(String::new());

    lines.join("\n") + "\n"
}

fn cell(value: Option<i64>) -> String {
    value.map(format_millions).unwrap_or_else(|| "error".to_string())
}

/// Which classes converted (and capped) at each exit value
pub fn conversion_analysis(analysis: &Analysis) -> String {
    let cap_table = analysis.engine().cap_table();
    let mut lines = vec!["Conversion Analysis".to_string(), "-".repeat(60)];

    for column in analysis.columns() {
        lines.push(format!("At {} exit:", format_exit_label(column.exit_value)));

        match &column.outcome {
            Ok(result) => lines.extend(conversion_lines(cap_table, result)),
            Err(e) => lines.push(format!("  Error: {}", e)),
        }
        lines.push(String::new());
    }

    lines.join("\n") + "\n"
}

fn conversion_lines(cap_table: &CapTable, result: &DistributionResult) -> Vec<String> {
    let mut converted = Vec::new();
    let mut capped = Vec::new();

    for (class, payout) in cap_table.classes().iter().zip(&result.payouts) {
        if payout.converted {
            converted.push(format!(
                "{} ({} -> {})",
                class.name(),
                format_millions(class.liquidation_preference()),
                format_millions(payout.total)
            ));
        } else if payout.capped {
            capped.push(format!("{} (capped at {})", class.name(), format_millions(payout.total)));
        }
    }

    let mut lines = Vec::new();
    if converted.is_empty() {
        lines.push("  No conversions".to_string());
    } else {
        lines.push(format!("  Converted to common: {}", converted.join(", ")));
    }
    if !capped.is_empty() {
        lines.push(format!("  Participation capped: {}", capped.join(", ")));
    }
    if result.unallocated > 0 {
        lines.push(format!("  Unallocated: {}", format_millions(result.unallocated)));
    }
    lines
}

/// Priority structure, then the final distribution, for one exit value
pub fn detailed_analysis(cap_table: &CapTable, column: &Column) -> String {
    let label = format_exit_label(column.exit_value);
    let mut lines = vec![format!("Detailed Waterfall Analysis: {} Exit", label), "=".repeat(80)];

    let result = match &column.outcome {
        Ok(result) => result,
        Err(e) => {
            lines.push(format!("Error: {}", e));
            return lines.join("\n") + "\n";
        }
    };

    lines.push("Priority Structure:".to_string());
    lines.push("-".repeat(40));

    let mut groups: BTreeMap<i32, Vec<&ShareClass>> = BTreeMap::new();
    for class in cap_table.classes().iter().filter(|c| !c.is_common()) {
        groups.entry(class.priority()).or_default().push(class);
    }
    for (priority, members) in groups.iter().rev() {
        let total: i64 = members.iter().map(|c| c.liquidation_preference()).sum();
        lines.push(format!(
            "Priority {}: {} total liquidation preference",
            priority,
            format_millions(total)
        ));
        for class in members {
            lines.push(format!(
                "  - {}: {} ({}x)",
                class.name(),
                format_millions(class.liquidation_preference()),
                class.preference_multiple()
            ));
        }
    }
    if !groups.is_empty() {
        lines.push(String::new());
    }

    lines.push("Final Distribution:".to_string());
    lines.push("-".repeat(40));
    for class in cap_table.by_priority() {
        let Some(payout) = result.class_payout(class.name()) else {
            continue;
        };
        let marker = if payout.converted {
            " [converted]"
        } else if payout.capped {
            " [capped]"
        } else {
            ""
        };
        lines.push(format!(
            "{:<15} ({:<17}): {:>10}{}",
            class.name(),
            class.preference_type().label(),
            format_millions(payout.total),
            marker
        ));
    }

    lines.push("-".repeat(40));
    lines.push(format!("{:<35}: {:>10}", "Total", format_millions(result.total_allocated())));
    if result.unallocated > 0 {
        lines.push(format!("{:<35}: {:>10}", "Unallocated", format_millions(result.unallocated)));
    }

    lines.join("\n") + "\n"
}
