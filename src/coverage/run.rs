use std::path::Path;
use std::process::Command;

use super::{extract, CoverageError, Percentage, ReportKind};
use crate::config::Settings;

/// Builds a command that runs `command` through the platform shell.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Runs a coverage command, saves its combined output to `output_file`, and
/// extracts the percentage from what was saved.
///
/// A failing exit status only warns: test runners exit non-zero when a
/// coverage threshold is missed but still print the summary.
pub fn run(
    command: &str,
    output_file: &Path,
    kind: ReportKind,
    settings: &Settings,
) -> Result<Percentage, CoverageError> {
    tracing::info!("Running {} coverage: {}", kind, command);

    let output = shell_command(command)
        .output()
        .map_err(|source| CoverageError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if !output.status.success() {
        tracing::warn!(
            "'{}' exited with {:?}; extracting coverage anyway",
            command,
            output.status.code()
        );
    }

    let mut captured = output.stdout;
    captured.extend_from_slice(&output.stderr);

    if settings.verbose {
        eprintln!("{}", String::from_utf8_lossy(&captured));
    }

    std::fs::write(output_file, &captured).map_err(|source| CoverageError::Write {
        path: output_file.to_path_buf(),
        source,
    })?;

    extract(output_file, kind)
}
