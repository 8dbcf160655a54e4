//! Tests for CLI parsing: subcommand arguments, the global verbose flag,
//! completions, --markdown-help, and --generate-man-pages.

use clap::{CommandFactory, Parser};
use prcov::cli::{Cli, Commands};
use prcov::coverage::ReportKind;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ── Subcommands ──────────────────────────────────────────────────────

#[test]
fn extract_coverage_defaults_to_extension() {
    let cli = Cli::parse_from(["prcov", "extract-coverage", "report.txt"]);
    match cli.command {
        Some(Commands::ExtractCoverage {
            file_path,
            kind,
            github_output,
        }) => {
            assert_eq!(file_path, PathBuf::from("report.txt"));
            assert_eq!(kind, ReportKind::Extension);
            assert!(!github_output);
        }
        other => panic!("expected ExtractCoverage, got {:?}", other.is_some()),
    }
}

#[test]
fn extract_coverage_accepts_webview_type() {
    let cli = Cli::parse_from([
        "prcov",
        "extract-coverage",
        "report.txt",
        "--type",
        "webview",
        "--github-output",
    ]);
    assert!(matches!(
        cli.command,
        Some(Commands::ExtractCoverage {
            kind: ReportKind::Webview,
            github_output: true,
            ..
        })
    ));
}

#[test]
fn unknown_report_type_is_rejected() {
    let result = Cli::try_parse_from(["prcov", "extract-coverage", "r.txt", "--type", "backend"]);
    assert!(result.is_err());
}

#[test]
fn compare_coverage_takes_prefix() {
    let cli = Cli::parse_from([
        "prcov",
        "compare-coverage",
        "80.0",
        "75.0",
        "--output-prefix",
        "ext_",
    ]);
    match cli.command {
        Some(Commands::CompareCoverage {
            base_cov,
            pr_cov,
            output_prefix,
            github_output,
        }) => {
            assert_eq!(base_cov, "80.0");
            assert_eq!(pr_cov, "75.0");
            assert_eq!(output_prefix, "ext_");
            assert!(!github_output);
        }
        other => panic!("expected CompareCoverage, got {:?}", other.is_some()),
    }
}

#[test]
fn generate_comment_accepts_negative_diffs() {
    let cli = Cli::parse_from([
        "prcov",
        "generate-comment",
        "80.0",
        "75.0",
        "true",
        "-5.0",
        "60.0",
        "59.5",
        "true",
        "-0.5",
    ]);
    match cli.command {
        Some(Commands::GenerateComment {
            ext_diff, web_diff, ..
        }) => {
            assert_eq!(ext_diff, "-5.0");
            assert_eq!(web_diff, "-0.5");
        }
        other => panic!("expected GenerateComment, got {:?}", other.is_some()),
    }
}

#[test]
fn generate_comment_requires_all_eight_values() {
    let result = Cli::try_parse_from(["prcov", "generate-comment", "80.0", "75.0", "true"]);
    assert!(result.is_err());
}

#[test]
fn post_comment_parses_pr_number() {
    let cli = Cli::parse_from([
        "prcov",
        "post-comment",
        "comment.md",
        "42",
        "acme/widgets",
        "--token",
        "secret",
    ]);
    match cli.command {
        Some(Commands::PostComment {
            pr_number,
            repo,
            token,
            ..
        }) => {
            assert_eq!(pr_number, 42);
            assert_eq!(repo, "acme/widgets");
            assert_eq!(token.as_deref(), Some("secret"));
        }
        other => panic!("expected PostComment, got {:?}", other.is_some()),
    }
}

#[test]
fn post_comment_rejects_non_numeric_pr() {
    for pr in ["abc", "0", "-3"] {
        let args = ["prcov", "post-comment", "c.md", pr, "acme/widgets"];
        assert!(Cli::try_parse_from(args).is_err(), "{pr} accepted");
    }
}

#[test]
fn process_workflow_requires_base_branch() {
    assert!(Cli::try_parse_from(["prcov", "process-workflow"]).is_err());

    let cli = Cli::parse_from([
        "prcov",
        "process-workflow",
        "--base-branch",
        "main",
        "--pr-number",
        "7",
        "--repo",
        "acme/widgets",
    ]);
    match cli.command {
        Some(Commands::ProcessWorkflow {
            base_branch,
            pr_number,
            repo,
            token,
        }) => {
            assert_eq!(base_branch, "main");
            assert_eq!(pr_number, Some(7));
            assert_eq!(repo.as_deref(), Some("acme/widgets"));
            assert!(token.is_none());
        }
        other => panic!("expected ProcessWorkflow, got {:?}", other.is_some()),
    }
}

#[test]
fn run_coverage_takes_command_and_output() {
    let cli = Cli::parse_from([
        "prcov",
        "run-coverage",
        "npm run test:coverage",
        "out.txt",
        "--type",
        "webview",
    ]);
    match cli.command {
        Some(Commands::RunCoverage {
            command,
            output_file,
            kind,
            github_output,
        }) => {
            assert_eq!(command, "npm run test:coverage");
            assert_eq!(output_file, PathBuf::from("out.txt"));
            assert_eq!(kind, ReportKind::Webview);
            assert!(!github_output);
        }
        other => panic!("expected RunCoverage, got {:?}", other.is_some()),
    }
}

#[test]
fn set_github_output_accepts_dash_values() {
    let cli = Cli::parse_from(["prcov", "set-github-output", "diff", "-5.0"]);
    match cli.command {
        Some(Commands::SetGithubOutput { name, value }) => {
            assert_eq!(name, "diff");
            assert_eq!(value, "-5.0");
        }
        other => panic!("expected SetGithubOutput, got {:?}", other.is_some()),
    }
}

#[test]
fn no_subcommand_parses_to_none() {
    let cli = Cli::parse_from(["prcov"]);
    assert!(cli.command.is_none());
}

// ── --verbose ────────────────────────────────────────────────────────

#[test]
fn verbose_before_subcommand() {
    let cli = Cli::parse_from(["prcov", "-v", "compare-coverage", "1", "2"]);
    assert!(cli.verbose);
}

#[test]
fn verbose_after_subcommand() {
    let cli = Cli::parse_from(["prcov", "set-github-output", "a", "b", "--verbose"]);
    assert!(cli.verbose);
}

#[test]
fn verbose_defaults_to_false() {
    let cli = Cli::parse_from(["prcov", "set-github-output", "a", "b"]);
    assert!(!cli.verbose);
}

// ── Shell completions ────────────────────────────────────────────────

#[test]
fn completions_bash_generates_output() {
    let mut buf = Vec::new();
    clap_complete::generate(
        clap_complete::Shell::Bash,
        &mut Cli::command(),
        "prcov",
        &mut buf,
    );
    let output = String::from_utf8(buf).unwrap();
    assert!(!output.is_empty(), "bash completions should produce output");
    assert!(output.contains("extract-coverage"));
}

#[test]
fn completions_subcommand_parses() {
    let cli = Cli::parse_from(["prcov", "completions", "zsh"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Completions {
            shell: clap_complete::Shell::Zsh
        })
    ));
}

// ── --markdown-help ──────────────────────────────────────────────────

#[test]
fn markdown_help_flag_is_recognized() {
    let cli = Cli::parse_from(["prcov", "--markdown-help"]);
    assert!(cli.markdown_help);
}

#[test]
fn markdown_help_documents_subcommands() {
    let markdown = clap_markdown::help_markdown::<Cli>();
    assert!(markdown.contains('#'), "markdown should contain headings");
    assert!(markdown.contains("compare-coverage"));
    assert!(markdown.contains("process-workflow"));
}

// ── --generate-man-pages ─────────────────────────────────────────────

#[test]
fn generate_man_pages_creates_files() {
    let tmp = TempDir::new().unwrap();
    let out_dir = tmp.path().join("man");
    fs::create_dir_all(&out_dir).unwrap();

    clap_mangen::generate_to(Cli::command(), &out_dir).unwrap();

    let man_files: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "1"))
        .collect();

    assert!(
        man_files
            .iter()
            .any(|f| f.file_name().to_string_lossy().starts_with("prcov")),
        "should generate a man page for prcov itself"
    );
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
