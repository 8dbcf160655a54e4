use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::{CoverageError, Percentage, ReportKind};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

// Istanbul/nyc/c8 text-summary: "Lines        : 87.5% ( 350/400 )"
static LINES_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Lines\s*:\s*(\d+(?:\.\d+)?)\s*%").unwrap());

const TABLE_TOTAL_ROW: &str = "All files";
const TABLE_LINES_HEADER: &str = "% Lines";

/// Reads a coverage report and extracts its overall line coverage.
pub fn extract(path: &Path, kind: ReportKind) -> Result<Percentage, CoverageError> {
    let content = std::fs::read_to_string(path).map_err(|source| CoverageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let pct = extract_from_str(&content, kind).ok_or_else(|| CoverageError::NoSummary {
        path: path.to_path_buf(),
        kind,
    })?;

    tracing::debug!("{} coverage in {}: {}", kind, path.display(), pct);
    Ok(pct)
}

/// Extracts the overall percentage from report text.
///
/// Extension runs print a text-summary block, webview runs print a table, so
/// each kind tries its own shape first and falls back to the other. When the
/// output holds several summaries the last one wins.
pub fn extract_from_str(content: &str, kind: ReportKind) -> Option<Percentage> {
    let clean = ANSI_ESCAPE.replace_all(content, "");

    match kind {
        ReportKind::Extension => from_text_summary(&clean).or_else(|| from_table(&clean)),
        ReportKind::Webview => from_table(&clean).or_else(|| from_text_summary(&clean)),
    }
}

fn from_text_summary(content: &str) -> Option<Percentage> {
    LINES_SUMMARY
        .captures_iter(content)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<Percentage>().ok())
        .last()
}

fn from_table(content: &str) -> Option<Percentage> {
    let mut lines_column: Option<usize> = None;
    let mut found = None;

    for line in content.lines() {
        if !line.contains('|') {
            continue;
        }
        let cells: Vec<&str> = line.split('|').map(str::trim).collect();

        if let Some(idx) = cells.iter().position(|c| *c == TABLE_LINES_HEADER) {
            lines_column = Some(idx);
            continue;
        }

        if cells.first() != Some(&TABLE_TOTAL_ROW) {
            continue;
        }

        let from_header = lines_column
            .and_then(|idx| cells.get(idx))
            .and_then(|cell| cell.parse::<Percentage>().ok());

        let value = from_header.or_else(|| {
            cells
                .iter()
                .skip(1)
                .find_map(|cell| cell.parse::<Percentage>().ok())
        });

        if value.is_some() {
            found = value;
        }
    }

    found
}
