//! Markdown rendering of the waterfall table

use super::{format_millions, WaterfallTable};

pub fn render(table: &WaterfallTable) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 3);

    let mut header = String::from("| Series | Type | Invested |");
    let mut divider = String::from("|---|---|---:|");
    for label in &table.labels {
        header.push_str(&format!(" {} |", label));
        divider.push_str("---:|");
    }
    lines.push(header);
    lines.push(divider);

    for row in &table.rows {
        let mut line = format!(
            "| {} | {} | {} |",
            escape(&row.name),
            row.kind,
            format_millions(row.invested)
        );
        for payout in &row.payouts {
            line.push_str(&format!(" {} |", cell(*payout)));
        }
        lines.push(line);
    }

    let mut total = format!("| **Total** | | {} |", format_millions(table.total_invested));
    for value in &table.totals {
        total.push_str(&format!(" **{}** |", cell(*value)));
    }
    lines.push(total);

    if table.has_unallocated() {
        let mut residual = String::from("| *Unallocated* | | |");
        for value in &table.unallocated {
            residual.push_str(&format!(" *{}* |", cell(*value)));
        }
        lines.push(residual);
    }

    lines.join("\n") + "\n"
}

fn cell(value: Option<i64>) -> String {
    value.map(format_millions).unwrap_or_else(|| "error".to_string())
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
