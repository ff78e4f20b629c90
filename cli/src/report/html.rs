//! HTML rendering of the waterfall table

use super::{format_millions, WaterfallTable};

pub fn render(table: &WaterfallTable) -> String {
    let mut html = String::from("<table class=\"waterfall\">\n  <thead>\n    <tr>");
    html.push_str("<th>Series</th><th>Type</th><th>Invested</th>");
    for label in &table.labels {
        html.push_str(&format!("<th>{}</th>", escape(label)));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for row in &table.rows {
        html.push_str(&format!(
            "    <tr><td>{}</td><td>{}</td><td>{}</td>",
            escape(&row.name),
            row.kind,
            format_millions(row.invested)
        ));
        for payout in &row.payouts {
            html.push_str(&format!("<td>{}</td>", cell(*payout)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("  </tbody>\n  <tfoot>\n    <tr><th>Total</th><th></th>");
    html.push_str(&format!("<th>{}</th>", format_millions(table.total_invested)));
    for value in &table.totals {
        html.push_str(&format!("<th>{}</th>", cell(*value)));
    }
    html.push_str("</tr>\n");

    if table.has_unallocated() {
        html.push_str("    <tr><th>Unallocated</th><th></th><th></th>");
        for value in &table.unallocated {
            html.push_str(&format!("<th>{}</th>", cell(*value)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </tfoot>\n</table>\n");

    html
}

fn cell(value: Option<i64>) -> String {
    value.map(format_millions).unwrap_or_else(|| "error".to_string())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
