//! Coverage percentages: extracting them from report text, comparing a base
//! run against a PR run, and producing reports by running a command.

mod compare;
mod extract;
mod run;

pub use compare::{compare, Comparison};
pub use extract::{extract, extract_from_str};
pub use run::{run, shell_command};

use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to read coverage report {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write coverage output {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {kind} coverage summary found in {}", .path.display())]
    NoSummary { path: PathBuf, kind: ReportKind },

    #[error("'{0}' is not a coverage percentage")]
    InvalidPercentage(String),

    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which coverage report a file holds. The two kinds come from different
/// test runners and print their summaries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReportKind {
    Extension,
    Webview,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Extension, ReportKind::Webview];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Extension => "extension",
            ReportKind::Webview => "webview",
        }
    }

    /// Output variable that carries this kind's percentage.
    pub fn output_name(&self) -> String {
        format!("{}_coverage", self.as_str())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coverage percentage, or a difference between two of them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Self {
        // -0.0 would print as "-0.0"
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Rounds to two decimal places.
    pub fn rounded(&self) -> Self {
        Self::new((self.0 * 100.0).round() / 100.0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }
}

impl FromStr for Percentage {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        match number.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self::new(value)),
            _ => Err(CoverageError::InvalidPercentage(s.to_string())),
        }
    }
}

impl fmt::Display for Percentage {
    // Plain decimal with at least one fractional digit: 87.5, 80.0, -5.0, 0.00001
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.0.to_string();
        if plain.contains('.') {
            f.write_str(&plain)
        } else {
            write!(f, "{}.0", plain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_display_keeps_fractional_digit() {
        assert_eq!(Percentage::new(87.5).to_string(), "87.5");
        assert_eq!(Percentage::new(80.0).to_string(), "80.0");
        assert_eq!(Percentage::new(-5.0).to_string(), "-5.0");
        assert_eq!(Percentage::new(-0.0).to_string(), "0.0");
    }

    #[test]
    fn percentage_display_never_uses_exponent() {
        assert_eq!(Percentage::new(0.00001).to_string(), "0.00001");
        assert_eq!(Percentage::new(-0.00005).to_string(), "-0.00005");
        assert_eq!(Percentage::new(1e16).to_string(), "10000000000000000.0");
    }

    #[test]
    fn percentage_parses_with_or_without_percent_sign() {
        assert_eq!("87.5".parse::<Percentage>().unwrap(), Percentage::new(87.5));
        assert_eq!(
            " 92.31% ".parse::<Percentage>().unwrap(),
            Percentage::new(92.31)
        );
        assert_eq!("100".parse::<Percentage>().unwrap(), Percentage::new(100.0));
    }

    #[test]
    fn percentage_rejects_garbage() {
        assert!("abc".parse::<Percentage>().is_err());
        assert!("".parse::<Percentage>().is_err());
        assert!("NaN".parse::<Percentage>().is_err());
        assert!("inf".parse::<Percentage>().is_err());
    }

    #[test]
    fn rounded_to_two_places() {
        assert_eq!(
            Percentage::new(-4.799999999999997).rounded().to_string(),
            "-4.8"
        );
        assert_eq!(Percentage::new(0.004).rounded().to_string(), "0.0");
        assert_eq!(Percentage::new(-0.004).rounded().to_string(), "0.0");
    }

    #[test]
    fn report_kind_names() {
        assert_eq!(ReportKind::Extension.to_string(), "extension");
        assert_eq!(ReportKind::Webview.output_name(), "webview_coverage");
    }
}
