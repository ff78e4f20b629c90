//! `lpw` - Liquidation Preference Waterfall CLI
//!
//! Loads a cap table CSV, evaluates it at a list of exit values and prints the
//! waterfall in the requested format.

pub mod analysis;
pub mod args;
pub mod exit_values;
pub mod report;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use waterfall_core_rs::{parse_cap_table_path, WaterfallEngine};

pub use analysis::Analysis;
pub use args::{Cli, OutputFormat};

/// Exit values that could not be evaluated, with the reason
#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub failures: Vec<(i64, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Install the stderr log subscriber
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting to warn.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run one invocation, writing the rendered output to `out`
///
/// Input problems (bad exit value token, unreadable or invalid cap table) are
/// errors. A single exit value that fails to evaluate is not: the other
/// columns still render and the failure is returned in the summary.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<RunSummary> {
    let exit_values = exit_values::parse_exit_values(&cli.exit_values)
        .context("Error parsing exit values")?;

    let cap_table = parse_cap_table_path(&cli.csv_file)
        .with_context(|| format!("Error parsing cap table '{}'", cli.csv_file.display()))?;

    debug!(
        classes = cap_table.len(),
        exit_values = exit_values.len(),
        fingerprint = %cap_table.fingerprint(),
        "Loaded cap table"
    );

    let engine = WaterfallEngine::new(cap_table);

    let (rendered, failures) = match cli.format {
        OutputFormat::Json => {
            let (json, report) = report::json::render(&engine, &exit_values)?;
            (json, report::json::failures(&report))
        }
        OutputFormat::Text => {
            let analysis = Analysis::run(engine, &exit_values);
            (render_text(cli, &analysis), analysis.failures())
        }
        OutputFormat::Csv => {
            let analysis = Analysis::run(engine, &exit_values);
            let table = report::WaterfallTable::from_analysis(&analysis);
            (report::delimited::render(&table)?, analysis.failures())
        }
        OutputFormat::Markdown => {
            let analysis = Analysis::run(engine, &exit_values);
            let table = report::WaterfallTable::from_analysis(&analysis);
            (report::markdown::render(&table), analysis.failures())
        }
        OutputFormat::Html => {
            let analysis = Analysis::run(engine, &exit_values);
            let table = report::WaterfallTable::from_analysis(&analysis);
            (report::html::render(&table), analysis.failures())
        }
    };

    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    Ok(RunSummary { failures })
}

fn render_text(cli: &Cli, analysis: &Analysis) -> String {
    let mut output = String::new();

    if cli.summary {
        output.push_str(&report::text::cap_table_summary(analysis.engine().cap_table()));
        output.push('\n');
    }

    if cli.conversion_only {
        output.push_str(&report::text::conversion_analysis(analysis));
    } else if cli.detailed {
        for column in analysis.columns() {
            output.push_str(&report::text::detailed_analysis(analysis.engine().cap_table(), column));
            output.push('\n');
        }
    } else {
        let table = report::WaterfallTable::from_analysis(analysis);
        output.push_str(&report::text::waterfall_analysis(&table));
        output.push('\n');
        output.push_str(&report::text::conversion_analysis(analysis));
    }

    output
}
