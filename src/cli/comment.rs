use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::path::Path;

use crate::config::Settings;
use crate::gh::{self, CommentInput, ComponentCoverage, Upsert};

/// Renders the comment from the eight `generate-comment` positionals, in
/// command-line order.
pub fn generate_comment(args: [&str; 8], out: &mut impl Write) -> Result<()> {
    let [ext @ .., _, _, _, _] = args;
    let [_, _, _, _, web @ ..] = args;

    let comment = gh::generate_comment(&CommentInput {
        extension: component(ext),
        webview: component(web),
    });

    write!(out, "{}", comment)?;
    Ok(())
}

fn component([base, pr, decreased, diff]: [&str; 4]) -> ComponentCoverage<'_> {
    ComponentCoverage {
        base,
        pr,
        decreased,
        diff,
    }
}

pub fn post_comment(
    comment_path: &Path,
    pr_number: u64,
    repo: &str,
    token: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let (verb, id) = match gh::post_comment(comment_path, pr_number, repo, token, settings)? {
        Upsert::Created(id) => ("Posted", id),
        Upsert::Updated(id) => ("Updated", id),
    };
    let target = format!("{}#{}", repo, pr_number);
    println!("{} {} comment {} on {}", "✓".green(), verb, id, target);
    Ok(())
}
