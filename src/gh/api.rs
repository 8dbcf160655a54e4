//! GitHub REST client for pull-request (issue) comments.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::comment::COMMENT_MARKER;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

#[derive(Debug, Error)]
pub enum GhError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("no GitHub token: pass --token or set GITHUB_TOKEN")]
    MissingToken,

    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepo(String),

    #[error("failed to read comment file {}: {source}", .path.display())]
    ReadComment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = GhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GhError::InvalidRepo(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;

        let valid_part =
            |p: &str| !p.is_empty() && !p.contains('/') && !p.contains(char::is_whitespace);
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl IssueComment {
    fn is_coverage_report(&self) -> bool {
        self.body
            .as_deref()
            .is_some_and(|body| body.contains(COMMENT_MARKER))
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// The comment operations the poster needs.
pub trait CommentApi {
    fn list_comments(&self, repo: &RepoSlug, pr: u64) -> Result<Vec<IssueComment>, GhError>;

    fn create_comment(
        &self,
        repo: &RepoSlug,
        pr: u64,
        body: &str,
    ) -> Result<IssueComment, GhError>;

    fn update_comment(
        &self,
        repo: &RepoSlug,
        id: u64,
        body: &str,
    ) -> Result<IssueComment, GhError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created(u64),
    Updated(u64),
}

/// Updates the PR's existing coverage comment, or creates one.
pub fn upsert_comment(
    api: &dyn CommentApi,
    repo: &RepoSlug,
    pr: u64,
    body: &str,
) -> Result<Upsert, GhError> {
    let existing = api
        .list_comments(repo, pr)?
        .into_iter()
        .find(IssueComment::is_coverage_report);

    match existing {
        Some(comment) => {
            tracing::info!("Updating comment {} on {}#{}", comment.id, repo, pr);
            let updated = api.update_comment(repo, comment.id, body)?;
            Ok(Upsert::Updated(updated.id))
        }
        None => {
            tracing::info!("Creating coverage comment on {}#{}", repo, pr);
            let created = api.create_comment(repo, pr, body)?;
            Ok(Upsert::Created(created.id))
        }
    }
}

/// Explicit token first, then `GITHUB_TOKEN`.
pub fn resolve_token(explicit: Option<&str>) -> Result<String, GhError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    std::env::var(GITHUB_TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(GhError::MissingToken)
}

/// `GITHUB_API_URL` when set (GitHub Enterprise runners), else `fallback`.
pub fn resolve_api_url(fallback: &str) -> String {
    std::env::var(GITHUB_API_URL_ENV)
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string()
}

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    pub fn new(token: String, api_url: &str) -> Result<Self, GhError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn comments_url(&self, repo: &RepoSlug, pr: u64) -> String {
        format!("{}/repos/{}/issues/{}/comments", self.api_url, repo, pr)
    }

    pub fn comment_url(&self, repo: &RepoSlug, id: u64) -> String {
        format!("{}/repos/{}/issues/comments/{}", self.api_url, repo, id)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GhError> {
        let response = request.bearer_auth(&self.token).send()?;
        let status = response.status();

        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().unwrap_or_default();
            return Err(GhError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        Ok(response.json()?)
    }
}

impl CommentApi for GitHubClient {
    fn list_comments(&self, repo: &RepoSlug, pr: u64) -> Result<Vec<IssueComment>, GhError> {
        let url = self.comments_url(repo, pr);
        let mut comments = Vec::new();

        for page in 1.. {
            let batch: Vec<IssueComment> = self.send(
                self.http
                    .get(&url)
                    .query(&[("per_page", PER_PAGE), ("page", page)]),
            )?;
            let done = batch.len() < PER_PAGE;
            comments.extend(batch);
            if done {
                break;
            }
        }

        tracing::debug!("{} comments on {}#{}", comments.len(), repo, pr);
        Ok(comments)
    }

    fn create_comment(
        &self,
        repo: &RepoSlug,
        pr: u64,
        body: &str,
    ) -> Result<IssueComment, GhError> {
        self.send(
            self.http
                .post(self.comments_url(repo, pr))
                .json(&CommentBody { body }),
        )
    }

    fn update_comment(
        &self,
        repo: &RepoSlug,
        id: u64,
        body: &str,
    ) -> Result<IssueComment, GhError> {
        self.send(
            self.http
                .patch(self.comment_url(repo, id))
                .json(&CommentBody { body }),
        )
    }
}
