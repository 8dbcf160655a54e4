use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::Checkout;

/// Switches the working tree between the PR and base branch with git.
pub struct GitCheckout {
    repo_dir: PathBuf,
}

impl GitCheckout {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

impl Checkout for GitCheckout {
    fn current(&mut self) -> Result<String> {
        let branch = git(&self.repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        if branch != "HEAD" {
            return Ok(branch);
        }
        // detached, as on pull_request runs
        git(&self.repo_dir, &["rev-parse", "HEAD"])
    }

    fn switch_to_base(&mut self, base_branch: &str) -> Result<()> {
        let remote_ref = format!("refs/remotes/origin/{}", base_branch);
        // forced update: the base may have been rewritten since the last fetch
        let refspec = format!("+{}:{}", base_branch, remote_ref);
        git(&self.repo_dir, &["fetch", "origin", &refspec])
            .with_context(|| format!("Failed to fetch base branch '{}'", base_branch))?;

        git(&self.repo_dir, &["checkout", "--detach", &remote_ref])
            .with_context(|| format!("Failed to check out base branch '{}'", base_branch))?;
        Ok(())
    }

    fn restore(&mut self, reference: &str) -> Result<()> {
        git(&self.repo_dir, &["checkout", reference])
            .with_context(|| format!("Failed to restore checkout '{}'", reference))?;
        Ok(())
    }
}

fn git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    tracing::debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .context("Failed to run git. Is it installed?")?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
