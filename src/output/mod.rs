//! Where command results go: plain stdout, or GitHub Actions output
//! variables so later workflow steps can read them.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

const HEREDOC_DELIMITER: &str = "PRCOV_EOF";

/// Destination for command results, chosen once per invocation.
pub trait OutputSink {
    /// Publishes a single result under `name`.
    fn value(&mut self, name: &str, value: &str) -> Result<()>;

    /// Publishes one field of a result that has several.
    fn field(&mut self, prefix: &str, field: &str, value: &str) -> Result<()>;

    /// Human-readable line accompanying the published values.
    fn summary(&mut self, line: &str) -> Result<()>;
}

/// Prints bare values and `field=value` lines.
pub struct StdoutSink<W: Write> {
    out: W,
}

impl<W: Write> StdoutSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for StdoutSink<W> {
    fn value(&mut self, _name: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{}", value)?;
        Ok(())
    }

    fn field(&mut self, _prefix: &str, field: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{}={}", field, value)?;
        Ok(())
    }

    fn summary(&mut self, _line: &str) -> Result<()> {
        // fields already on stdout
        Ok(())
    }
}

/// Writes GitHub Actions output variables; summaries go to `echo`.
pub struct GithubOutputSink<W: Write> {
    store: OutputStore,
    echo: W,
}

impl<W: Write> GithubOutputSink<W> {
    pub fn new(store: OutputStore, echo: W) -> Self {
        Self { store, echo }
    }

    pub fn into_inner(self) -> W {
        self.echo
    }
}

impl<W: Write> OutputSink for GithubOutputSink<W> {
    fn value(&mut self, name: &str, value: &str) -> Result<()> {
        self.store.set(name, value, &mut self.echo)
    }

    fn field(&mut self, prefix: &str, field: &str, value: &str) -> Result<()> {
        self.store
            .set(&format!("{}{}", prefix, field), value, &mut self.echo)
    }

    fn summary(&mut self, line: &str) -> Result<()> {
        writeln!(self.echo, "{}", line)?;
        Ok(())
    }
}

/// Picks the sink for an invocation from its `--github-output` flag.
pub fn select(github_output: bool) -> Box<dyn OutputSink> {
    if github_output {
        Box::new(GithubOutputSink::new(OutputStore::from_env(), io::stdout()))
    } else {
        Box::new(StdoutSink::new(io::stdout()))
    }
}

/// The GitHub Actions output variable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStore {
    /// The file named by `GITHUB_OUTPUT`.
    File(PathBuf),
    /// Legacy `::set-output` workflow command, used outside Actions.
    WorkflowCommand,
}

impl OutputStore {
    pub fn from_env() -> Self {
        match std::env::var_os(GITHUB_OUTPUT_ENV) {
            Some(path) if !path.is_empty() => OutputStore::File(PathBuf::from(path)),
            _ => OutputStore::WorkflowCommand,
        }
    }

    pub fn set(&self, name: &str, value: &str, echo: &mut impl Write) -> Result<()> {
        check_name(name)?;
        tracing::debug!("Setting output {}={}", name, value);

        match self {
            OutputStore::File(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                file.write_all(format_entry(name, value)?.as_bytes())
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
            }
            OutputStore::WorkflowCommand => {
                tracing::warn!(
                    "{} is not set; emitting ::set-output for {}",
                    GITHUB_OUTPUT_ENV,
                    name
                );
                writeln!(echo, "::set-output name={}::{}", name, value)?;
            }
        }
        Ok(())
    }
}

/// Sets one output variable in the store named by the environment.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    OutputStore::from_env().set(name, value, &mut io::stdout())
}

/// Formats one entry of the `GITHUB_OUTPUT` file.
pub fn format_entry(name: &str, value: &str) -> Result<String> {
    check_name(name)?;

    if !value.contains('\n') {
        return Ok(format!("{}={}\n", name, value));
    }

    let mut delimiter = HEREDOC_DELIMITER.to_string();
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    Ok(format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter))
}

/// Names end at `=` or `<<` in the file and at `::` in the workflow command.
fn check_name(name: &str) -> Result<()> {
    let reserved = ["=", "<<", "::", "\n", "\r"];
    if name.trim().is_empty() || reserved.iter().any(|r| name.contains(r)) {
        anyhow::bail!("Invalid output name '{}'", name.escape_debug());
    }
    Ok(())
}

/// Parses a `GITHUB_OUTPUT` file back into its variables. Later entries
/// override earlier ones, as they do for the Actions runner.
pub fn parse_entries(content: &str) -> HashMap<String, String> {
    let mut outputs = HashMap::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let heredoc = line
            .split_once("<<")
            .filter(|(name, _)| !name.contains('='));

        if let Some((name, delimiter)) = heredoc {
            let body: Vec<&str> = lines.by_ref().take_while(|l| *l != delimiter).collect();
            outputs.insert(name.to_string(), body.join("\n"));
        } else if let Some((name, value)) = line.split_once('=') {
            outputs.insert(name.to_string(), value.to_string());
        }
    }

    outputs
}

pub fn read_outputs(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_entries(&content))
}
