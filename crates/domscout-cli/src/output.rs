//! Output formatting and progress reporting

use std::fmt::Write as _;
use std::time::Duration;

use console::{style, Term};
use domscout::DiscoveryOutcome;
use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::FormatArg;
use crate::error::CliResult;

/// Render an outcome in the requested format
pub fn render(outcome: &DiscoveryOutcome, format: FormatArg, use_color: bool) -> CliResult<String> {
    match format {
        FormatArg::Json => Ok(serde_json::to_string_pretty(outcome)?),
        FormatArg::Grounding => Ok(outcome.grounding_text()),
        FormatArg::Table => Ok(render_table(outcome, use_color)),
    }
}

const HEADERS: [&str; 5] = ["FIELD", "LOCATOR", "TYPE", "ACTION", "SAMPLE"];

fn render_table(outcome: &DiscoveryOutcome, use_color: bool) -> String {
    let rows: Vec<[String; 5]> = outcome
        .records
        .iter()
        .map(|r| {
            let field = if r.unstable {
                format!("{} (unstable)", r.field_name)
            } else {
                r.field_name.clone()
            };
            [
                field,
                format!("{}={}", r.locator_strategy, r.locator_value),
                r.element_type.to_string(),
                r.suggested_action.to_string(),
                r.sample_value.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = format_row(&HEADERS.map(String::from), &widths);
    if use_color {
        let _ = writeln!(out, "{}", style(header).bold());
    } else {
        let _ = writeln!(out, "{header}");
    }
    for row in &rows {
        let _ = writeln!(out, "{}", format_row(row, &widths));
    }

    let _ = write!(out, "\n{} element(s) on {}", outcome.len(), outcome.url);
    if outcome.used_fallback_query {
        out.push_str(" (broadened query)");
    }
    for warning in &outcome.warnings {
        let line = format!("warning: {warning}");
        if use_color {
            let _ = write!(out, "\n{}", style(line).yellow());
        } else {
            let _ = write!(out, "\n{line}");
        }
    }
    out
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i + 1 == cells.len() {
            line.push_str(cell);
        } else {
            let _ = write!(line, "{cell:<width$}  ");
        }
    }
    line.trim_end().to_string()
}

/// Spinner and status lines on stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    spinner: Option<ProgressBar>,
    use_color: bool,
    quiet: bool,
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner until [`Reporter::finish`]
    pub fn start(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Remove the spinner
    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a success line
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure line, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}
