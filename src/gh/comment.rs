//! Markdown rendering of the coverage comment.

use std::fmt::Write;

/// Hidden line identifying comments this tool posted, so reruns update them.
pub const COMMENT_MARKER: &str = "<!-- prcov:coverage-report -->";

/// Base/PR numbers for one component, as text straight from the command line
/// or a previous step's outputs.
#[derive(Debug, Clone, Copy)]
pub struct ComponentCoverage<'a> {
    pub base: &'a str,
    pub pr: &'a str,
    pub decreased: &'a str,
    pub diff: &'a str,
}

impl ComponentCoverage<'_> {
    fn is_decreased(&self) -> bool {
        self.decreased.trim().eq_ignore_ascii_case("true")
    }

    fn magnitude(&self) -> &str {
        let diff = self.diff.trim();
        diff.strip_prefix('-').unwrap_or(diff)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommentInput<'a> {
    pub extension: ComponentCoverage<'a>,
    pub webview: ComponentCoverage<'a>,
}

/// Renders the PR comment. Output depends only on `input`.
pub fn generate_comment(input: &CommentInput<'_>) -> String {
    let components = [("Extension", &input.extension), ("Webview", &input.webview)];
    let mut out = String::new();

    out.push_str(COMMENT_MARKER);
    out.push('\n');
    out.push_str("## Coverage Report\n\n");

    out.push_str("| Component | Base | PR | Change |\n");
    out.push_str("|-----------|------|----|--------|\n");
    for (label, cov) in components {
        let icon = if cov.is_decreased() { "⚠️" } else { "✅" };
        let _ = writeln!(
            out,
            "| {} | {}% | {}% | {} {}% |",
            label,
            cov.base.trim(),
            cov.pr.trim(),
            icon,
            cov.diff.trim()
        );
    }

    for (label, cov) in components {
        let _ = write!(out, "\n### {} Coverage\n\n", label);
        if cov.is_decreased() {
            let _ = writeln!(
                out,
                "⚠️ **Coverage decreased by {}%** (from {}% to {}%)",
                cov.magnitude(),
                cov.base.trim(),
                cov.pr.trim()
            );
            out.push_str("\nConsider adding tests for the code this PR changes.\n");
        } else {
            out.push_str("✅ Coverage increased or stayed the same\n");
        }
    }

    out.push_str("\n### Overall Assessment\n\n");
    if components.iter().any(|(_, cov)| cov.is_decreased()) {
        out.push_str("⚠️ **Test coverage decreased in this PR.** ");
        out.push_str("Please add or update tests to keep coverage from dropping.\n");
    } else {
        out.push_str("✅ **Test coverage held steady or improved.** Nice work!\n");
    }

    out.push_str("\n---\n");
    out.push_str(
        "<sub>This comment updates automatically when new commits are pushed to the PR.</sub>\n",
    );

    out
}
