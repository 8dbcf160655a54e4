use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coverage::ReportKind;

pub const CONFIG_FILE: &str = ".prcovrc.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Command producing the extension coverage summary
    #[serde(default = "default_extension_command")]
    pub extension_command: String,

    /// Command producing the webview coverage summary
    #[serde(default = "default_webview_command")]
    pub webview_command: String,

    /// Captured output of the extension run on the PR checkout
    #[serde(default = "default_extension_report")]
    pub extension_report: PathBuf,

    /// Captured output of the webview run on the PR checkout
    #[serde(default = "default_webview_report")]
    pub webview_report: PathBuf,

    #[serde(default = "default_base_extension_report")]
    pub base_extension_report: PathBuf,

    #[serde(default = "default_base_webview_report")]
    pub base_webview_report: PathBuf,

    /// Where process-workflow saves the rendered comment
    #[serde(default = "default_comment_file")]
    pub comment_file: PathBuf,

    /// GitHub REST API root; `GITHUB_API_URL` takes precedence when set
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension_command: default_extension_command(),
            webview_command: default_webview_command(),
            extension_report: default_extension_report(),
            webview_report: default_webview_report(),
            base_extension_report: default_base_extension_report(),
            base_webview_report: default_base_webview_report(),
            comment_file: default_comment_file(),
            api_url: default_api_url(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn command_for(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::Extension => &self.extension_command,
            ReportKind::Webview => &self.webview_command,
        }
    }

    pub fn pr_report_for(&self, kind: ReportKind) -> &Path {
        match kind {
            ReportKind::Extension => &self.extension_report,
            ReportKind::Webview => &self.webview_report,
        }
    }

    pub fn base_report_for(&self, kind: ReportKind) -> &Path {
        match kind {
            ReportKind::Extension => &self.base_extension_report,
            ReportKind::Webview => &self.base_webview_report,
        }
    }
}

fn default_extension_command() -> String {
    "xvfb-run -a npm run test:coverage".to_string()
}

fn default_webview_command() -> String {
    "cd webview-ui && npm run test:coverage".to_string()
}

fn default_extension_report() -> PathBuf {
    PathBuf::from("extension_coverage.txt")
}

fn default_webview_report() -> PathBuf {
    PathBuf::from("webview_coverage.txt")
}

fn default_base_extension_report() -> PathBuf {
    PathBuf::from("base_extension_coverage.txt")
}

fn default_base_webview_report() -> PathBuf {
    PathBuf::from("base_webview_coverage.txt")
}

fn default_comment_file() -> PathBuf {
    PathBuf::from("coverage_comment.md")
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// Per-invocation settings handed to every command handler.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub verbose: bool,
    pub config: Config,
}

impl Settings {
    pub fn new(verbose: bool, config: Config) -> Self {
        Self { verbose, config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(
            config.extension_command,
            "xvfb-run -a npm run test:coverage"
        );
        assert_eq!(
            config.extension_report,
            PathBuf::from("extension_coverage.txt")
        );
        assert_eq!(config.comment_file, PathBuf::from("coverage_comment.md"));
        assert_eq!(config.api_url, "https://api.github.com");
    }

    #[test]
    fn returns_default_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from_dir(tmp.path()).unwrap();
        assert_eq!(config.webview_report, PathBuf::from("webview_coverage.txt"));
    }

    #[test]
    fn handles_partial_config_with_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"{ "extension_command": "npm test", "api_url": "https://ghe.example.com/api/v3" }"#,
        )
        .unwrap();

        let config = Config::load_from_dir(tmp.path()).unwrap();
        assert_eq!(config.extension_command, "npm test");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(
            config.webview_command,
            "cd webview-ui && npm run test:coverage"
        );
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "{ not json").unwrap();

        let err = Config::load_from_dir(tmp.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn lookups_follow_report_kind() {
        let config = Config::default();
        assert_eq!(
            config.command_for(ReportKind::Webview),
            "cd webview-ui && npm run test:coverage"
        );
        assert_eq!(
            config.base_report_for(ReportKind::Extension),
            Path::new("base_extension_coverage.txt")
        );
        assert_eq!(
            config.pr_report_for(ReportKind::Webview),
            Path::new("webview_coverage.txt")
        );
    }
}
