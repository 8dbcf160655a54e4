mod comment;
mod coverage;

pub use comment::{generate_comment, post_comment};
pub use coverage::{compare_coverage, extract_coverage, run_coverage};

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use crate::config::Settings;
use crate::coverage::ReportKind;
use crate::output;
use crate::workflow::{self, WorkflowOptions};

#[derive(Parser)]
#[command(
    name = "prcov",
    about = "Coverage utility for GitHub Actions pull-request workflows",
    version,
    author
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,

    /// Write man pages into DIR
    #[arg(long, value_name = "DIR", hide = true)]
    pub generate_man_pages: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the coverage percentage from a report file
    ExtractCoverage {
        /// Path to the coverage report file
        file_path: PathBuf,

        /// Type of coverage report
        #[arg(long = "type", value_enum, default_value_t = ReportKind::Extension)]
        kind: ReportKind,

        /// Write a GitHub Actions output variable instead of printing
        #[arg(long)]
        github_output: bool,
    },

    /// Compare base and PR coverage percentages
    #[command(allow_negative_numbers = true)]
    CompareCoverage {
        /// Base branch coverage percentage
        base_cov: String,

        /// PR branch coverage percentage
        pr_cov: String,

        /// Prefix for GitHub Actions output variables
        #[arg(long, default_value = "")]
        output_prefix: String,

        /// Write GitHub Actions output variables instead of printing
        #[arg(long)]
        github_output: bool,
    },

    /// Generate the PR comment for a coverage comparison
    #[command(allow_negative_numbers = true)]
    GenerateComment {
        /// Base branch extension coverage
        base_ext_cov: String,
        /// PR branch extension coverage
        pr_ext_cov: String,
        /// Whether extension coverage decreased (true/false)
        ext_decreased: String,
        /// Extension coverage difference
        ext_diff: String,
        /// Base branch webview coverage
        base_web_cov: String,
        /// PR branch webview coverage
        pr_web_cov: String,
        /// Whether webview coverage decreased (true/false)
        web_decreased: String,
        /// Webview coverage difference
        web_diff: String,
    },

    /// Post a comment to a GitHub pull request
    PostComment {
        /// File containing the comment text
        comment_path: PathBuf,

        /// Pull request number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        pr_number: u64,

        /// Repository as owner/name
        repo: String,

        /// GitHub token (defaults to GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Run a coverage command and extract its coverage percentage
    RunCoverage {
        /// Shell command producing the coverage report
        command: String,

        /// File to save the command output to
        output_file: PathBuf,

        /// Type of coverage report
        #[arg(long = "type", value_enum, default_value_t = ReportKind::Extension)]
        kind: ReportKind,

        /// Write a GitHub Actions output variable instead of printing
        #[arg(long)]
        github_output: bool,
    },

    /// Run the whole measure, compare, comment, post sequence
    ProcessWorkflow {
        /// Base branch name
        #[arg(long)]
        base_branch: String,

        /// Pull request number
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        pr_number: Option<u64>,

        /// Repository as owner/name
        #[arg(long)]
        repo: Option<String>,

        /// GitHub token (defaults to GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Set a GitHub Actions output variable
    SetGithubOutput {
        /// Output variable name
        name: String,

        /// Output variable value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// Runs one subcommand. The output sink is chosen here, once, from the
/// subcommand's `--github-output` flag.
pub fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::ExtractCoverage {
            file_path,
            kind,
            github_output,
        } => {
            let mut sink = output::select(github_output);
            extract_coverage(&file_path, kind, sink.as_mut())
        }
        Commands::CompareCoverage {
            base_cov,
            pr_cov,
            output_prefix,
            github_output,
        } => {
            let mut sink = output::select(github_output);
            compare_coverage(&base_cov, &pr_cov, &output_prefix, sink.as_mut())
        }
        Commands::GenerateComment {
            base_ext_cov,
            pr_ext_cov,
            ext_decreased,
            ext_diff,
            base_web_cov,
            pr_web_cov,
            web_decreased,
            web_diff,
        } => generate_comment(
            [
                base_ext_cov.as_str(),
                pr_ext_cov.as_str(),
                ext_decreased.as_str(),
                ext_diff.as_str(),
                base_web_cov.as_str(),
                pr_web_cov.as_str(),
                web_decreased.as_str(),
                web_diff.as_str(),
            ],
            &mut io::stdout(),
        ),
        Commands::PostComment {
            comment_path,
            pr_number,
            repo,
            token,
        } => post_comment(&comment_path, pr_number, &repo, token.as_deref(), settings),
        Commands::RunCoverage {
            command,
            output_file,
            kind,
            github_output,
        } => {
            let mut sink = output::select(github_output);
            run_coverage(&command, &output_file, kind, settings, sink.as_mut())
        }
        Commands::ProcessWorkflow {
            base_branch,
            pr_number,
            repo,
            token,
        } => {
            let options = WorkflowOptions {
                base_branch,
                pr_number,
                repo,
                token,
            };
            workflow::process(&options, settings)?;
            Ok(())
        }
        Commands::SetGithubOutput { name, value } => output::set_output(&name, &value),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "prcov", &mut io::stdout());
            Ok(())
        }
    }
}
