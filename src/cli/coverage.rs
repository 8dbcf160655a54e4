use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::coverage::{self, ReportKind};
use crate::output::OutputSink;

pub fn extract_coverage(
    file_path: &Path,
    kind: ReportKind,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let pct = coverage::extract(file_path, kind)?;
    sink.value(&kind.output_name(), &pct.to_string())
}

pub fn run_coverage(
    command: &str,
    output_file: &Path,
    kind: ReportKind,
    settings: &Settings,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let pct = coverage::run(command, output_file, kind, settings)
        .with_context(|| format!("Failed to measure {} coverage", kind))?;
    sink.value(&kind.output_name(), &pct.to_string())
}

pub fn compare_coverage(
    base_cov: &str,
    pr_cov: &str,
    output_prefix: &str,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let result = coverage::compare(base_cov, pr_cov)?;
    let decreased = result.decreased.to_string();
    let diff = result.diff.to_string();

    sink.field(output_prefix, "decreased", &decreased)?;
    sink.field(output_prefix, "diff", &diff)?;
    sink.summary(&format!("Coverage difference: {}%", diff))?;
    sink.summary(&format!("Coverage decreased: {}", decreased))?;
    Ok(())
}
