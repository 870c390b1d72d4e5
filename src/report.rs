//! Plain-text presentation helpers
//!
//! Not used by the engine itself. A presentation layer can print the X/O grid
//! and one line per finding.

use crate::{chart::Chart, patterns::PatternFinding};

/// Printed when a scan finds nothing
pub const NO_PATTERNS: &str = "No significant patterns detected.";

/// Render the chart as a grid of X/O columns, highest level first.
///
/// ```text
///     105.00 | X . .
///     104.00 | X O X
/// ```
pub fn render_text(chart: &Chart) -> String {
    let columns = chart.columns();
    if columns.is_empty() {
        return String::from("(empty chart)\n");
    }

    let spans: Vec<(i64, i64, char)> = columns
        .iter()
        .map(|c| (chart.box_number(c.low), chart.box_number(c.high), c.kind.symbol()))
        .collect();
    let bottom = spans.iter().map(|s| s.0).min().unwrap_or(0);
    let top = spans.iter().map(|s| s.1).max().unwrap_or(0);
    let size = chart.box_size().get();

    let mut out = String::new();
    for number in (bottom..=top).rev() {
        let cells: Vec<String> = spans
            .iter()
            .map(|&(low, high, symbol)| {
                if (low..=high).contains(&number) {
                    symbol.to_string()
                } else {
                    ".".to_string()
                }
            })
            .collect();
        out.push_str(&format!("{:>10.2} | {}\n", number as f64 * size, cells.join(" ")));
    }
    out
}

pub fn describe_finding(finding: &PatternFinding) -> String {
    format!("Pattern detected: {} at value {}", finding.kind, finding.level)
}

/// One line per finding, or [`NO_PATTERNS`]
pub fn describe_findings(findings: &[PatternFinding]) -> Vec<String> {
    if findings.is_empty() {
        return vec![NO_PATTERNS.to_string()];
    }
    findings.iter().map(describe_finding).collect()
}
