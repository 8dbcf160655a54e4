mod api;
mod comment;

pub use api::{
    resolve_api_url, resolve_token, upsert_comment, CommentApi, GhError, GitHubClient,
    IssueComment, RepoSlug, Upsert, GITHUB_API_URL_ENV, GITHUB_TOKEN_ENV,
};
pub use comment::{generate_comment, CommentInput, ComponentCoverage, COMMENT_MARKER};

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;

/// Posts the comment stored in `comment_path` to pull request `pr_number`.
pub fn post_comment(
    comment_path: &Path,
    pr_number: u64,
    repo: &str,
    token: Option<&str>,
    settings: &Settings,
) -> Result<Upsert> {
    let body = std::fs::read_to_string(comment_path).map_err(|source| GhError::ReadComment {
        path: comment_path.to_path_buf(),
        source,
    })?;
    let repo: RepoSlug = repo.parse()?;
    let client = client_for(token, settings)?;

    upsert_comment(&client, &repo, pr_number, &body)
        .with_context(|| format!("Failed to post coverage comment to {}#{}", repo, pr_number))
}

/// Builds an API client from an explicit token or the environment.
pub fn client_for(token: Option<&str>, settings: &Settings) -> Result<GitHubClient> {
    let token = resolve_token(token)?;
    let api_url = resolve_api_url(&settings.config.api_url);
    tracing::debug!("Using GitHub API at {}", api_url);
    Ok(GitHubClient::new(token, &api_url)?)
}
