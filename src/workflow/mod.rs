//! End-to-end coverage run for one pull request: measure the PR, measure
//! the base branch, compare, render the comment, and post it.

mod git;

pub use git::GitCheckout;

use anyhow::{Context, Result};
use colored::Colorize;
use std::io;

use crate::config::Settings;
use crate::coverage::{self, Comparison, Percentage, ReportKind};
use crate::gh::{
    self, CommentApi, CommentInput, ComponentCoverage, GhError, GitHubClient, RepoSlug, Upsert,
};
use crate::output::{GithubOutputSink, OutputSink, OutputStore};

/// Arguments of `process-workflow`.
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    pub base_branch: String,
    pub pr_number: Option<u64>,
    pub repo: Option<String>,
    pub token: Option<String>,
}

/// Moves the working tree to the base branch and back.
pub trait Checkout {
    /// Reference that `restore` returns to.
    fn current(&mut self) -> Result<String>;
    fn switch_to_base(&mut self, base_branch: &str) -> Result<()>;
    fn restore(&mut self, reference: &str) -> Result<()>;
}

/// Where the comment goes, when posting is possible.
pub struct PostTarget<'a> {
    pub api: &'a dyn CommentApi,
    pub repo: RepoSlug,
    pub pr_number: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentResult {
    pub kind: ReportKind,
    pub base: Percentage,
    pub pr: Percentage,
    pub comparison: Comparison,
}

#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub extension: ComponentResult,
    pub webview: ComponentResult,
    pub comment: String,
    pub posted: Option<Upsert>,
}

/// Runs the whole workflow in the current directory against GitHub.
pub fn process(options: &WorkflowOptions, settings: &Settings) -> Result<WorkflowReport> {
    let mut checkout = GitCheckout::new(".");
    let mut sink = GithubOutputSink::new(OutputStore::from_env(), io::stdout());

    let client = post_client(options, settings)?;

    let target = match (&client, options.pr_number, options.repo.as_deref()) {
        (Some(client), Some(pr_number), Some(repo)) => Some(PostTarget {
            api: client,
            repo: repo.parse()?,
            pr_number,
        }),
        _ => None,
    };

    run(options, settings, &mut checkout, &mut sink, target)
}

/// GitHub client for posting, or `None` with a warning when posting is not
/// possible.
fn post_client(options: &WorkflowOptions, settings: &Settings) -> Result<Option<GitHubClient>> {
    let (Some(_), Some(repo)) = (options.pr_number, options.repo.as_deref()) else {
        tracing::warn!("No PR number or repository given; the comment will not be posted");
        return Ok(None);
    };

    // fail on a bad slug before spending minutes on test runs
    repo.parse::<RepoSlug>()?;
    match gh::client_for(options.token.as_deref(), settings) {
        Ok(client) => Ok(Some(client)),
        Err(e) if matches!(e.downcast_ref::<GhError>(), Some(GhError::MissingToken)) => {
            tracing::warn!("No GitHub token available; the comment will not be posted");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Runs the workflow with explicit collaborators.
pub fn run(
    options: &WorkflowOptions,
    settings: &Settings,
    checkout: &mut dyn Checkout,
    sink: &mut dyn OutputSink,
    target: Option<PostTarget<'_>>,
) -> Result<WorkflowReport> {
    let config = &settings.config;

    println!("{}", "Measuring PR coverage...".green().bold());
    let pr = measure(settings, |kind| config.pr_report_for(kind))?;

    let original = checkout
        .current()
        .context("Failed to determine current checkout")?;
    println!(
        "{} {}",
        "Switching to base branch".green().bold(),
        options.base_branch.cyan()
    );
    checkout.switch_to_base(&options.base_branch)?;

    println!("{}", "Measuring base coverage...".green().bold());
    let base = measure(settings, |kind| config.base_report_for(kind));

    let restored = checkout.restore(&original);
    let base = match base {
        Ok(base) => {
            restored?;
            base
        }
        Err(e) => {
            if let Err(restore_err) = restored {
                tracing::warn!("{:#}", restore_err);
            }
            return Err(e);
        }
    };
    println!("  {} Restored {}", "✓".green(), original.dimmed());

    let extension = component(ReportKind::Extension, base[0], pr[0]);
    let webview = component(ReportKind::Webview, base[1], pr[1]);

    for result in [&extension, &webview] {
        publish(sink, result)?;
        println!(
            "  {} {}: {}% → {}% ({})",
            if result.comparison.decreased {
                "!".yellow()
            } else {
                "✓".green()
            },
            result.kind,
            result.base,
            result.pr,
            result.comparison.diff
        );
    }

    let comment = render_comment(&extension, &webview);
    std::fs::write(&config.comment_file, &comment)
        .with_context(|| format!("Failed to write {}", config.comment_file.display()))?;
    println!("\n{}", comment);

    let posted = match target {
        Some(target) => {
            println!("{}", "Posting comment...".green().bold());
            let upsert = gh::upsert_comment(target.api, &target.repo, target.pr_number, &comment)
                .with_context(|| {
                    format!(
                        "Failed to post coverage comment to {}#{}",
                        target.repo, target.pr_number
                    )
                })?;
            match &upsert {
                Upsert::Created(id) => println!("  {} Created comment {}", "✓".green(), id),
                Upsert::Updated(id) => println!("  {} Updated comment {}", "✓".green(), id),
            }
            Some(upsert)
        }
        None => None,
    };

    Ok(WorkflowReport {
        extension,
        webview,
        comment,
        posted,
    })
}

/// Runs both coverage commands, extension first.
fn measure<'a>(
    settings: &'a Settings,
    report_for: impl Fn(ReportKind) -> &'a std::path::Path,
) -> Result<[Percentage; 2]> {
    let mut out = [Percentage::new(0.0); 2];
    for (slot, kind) in out.iter_mut().zip(ReportKind::ALL) {
        let report = report_for(kind);
        *slot = coverage::run(settings.config.command_for(kind), report, kind, settings)
            .with_context(|| format!("Failed to measure {} coverage", kind))?;
        println!("  {} {}: {}%", "✓".green(), kind, slot);
    }
    Ok(out)
}

fn component(kind: ReportKind, base: Percentage, pr: Percentage) -> ComponentResult {
    ComponentResult {
        kind,
        base,
        pr,
        comparison: Comparison::between(base, pr),
    }
}

fn publish(sink: &mut dyn OutputSink, result: &ComponentResult) -> Result<()> {
    let prefix = format!("{}_", result.kind);
    let name = result.kind.output_name();
    let decreased = result.comparison.decreased.to_string();

    sink.field(&prefix, "decreased", &decreased)?;
    sink.field(&prefix, "diff", &result.comparison.diff.to_string())?;
    sink.value(&format!("base_{}", name), &result.base.to_string())?;
    sink.value(&format!("pr_{}", name), &result.pr.to_string())?;
    Ok(())
}

fn render_comment(extension: &ComponentResult, webview: &ComponentResult) -> String {
    let text = |r: &ComponentResult| {
        [
            r.base.to_string(),
            r.pr.to_string(),
            r.comparison.decreased.to_string(),
            r.comparison.diff.to_string(),
        ]
    };
    let ext = text(extension);
    let web = text(webview);

    gh::generate_comment(&CommentInput {
        extension: ComponentCoverage {
            base: &ext[0],
            pr: &ext[1],
            decreased: &ext[2],
            diff: &ext[3],
        },
        webview: ComponentCoverage {
            base: &web[0],
            pr: &web[1],
            decreased: &web[2],
            diff: &web[3],
        },
    })
}
