use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::comments::{Comment, LineRange};
use crate::error::Error;

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

// --- Public types ---

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub head: HeadRef,
}

#[derive(Debug, Deserialize)]
pub struct HeadRef {
    pub sha: String,
}

/// Body for `POST /repos/{repo}/pulls/{number}/comments`. Field names are
/// the API's; `side` is always the new-file side of the diff.
#[derive(Debug, Serialize)]
pub struct NewReviewComment {
    pub body: String,
    pub commit_id: String,
    pub path: String,
    pub side: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
}

impl NewReviewComment {
    /// A file-wide comment, not anchored to any line.
    pub fn for_file(body: &str, commit_id: &str, path: &str) -> Self {
        Self {
            body: body.to_string(),
            commit_id: commit_id.to_string(),
            path: path.to_string(),
            side: "RIGHT".to_string(),
            line: None,
            start_line: None,
            start_side: None,
            subject_type: Some("file".to_string()),
        }
    }

    /// Anchored to the end of `range`; the start fields are sent only for a
    /// true multi-line range.
    pub fn for_lines(body: &str, commit_id: &str, path: &str, range: LineRange) -> Self {
        let multi = !range.is_single();
        Self {
            body: body.to_string(),
            commit_id: commit_id.to_string(),
            path: path.to_string(),
            side: "RIGHT".to_string(),
            line: Some(range.end),
            start_line: multi.then_some(range.start),
            start_side: multi.then(|| "RIGHT".to_string()),
            subject_type: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateReview<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewResponse {
    pub id: u64,
    pub html_url: String,
}

/// True when a 422 from review-comment creation means the path is not part
/// of the PR diff. The API words this a few ways across subject types.
fn rejects_path_outside_diff(body: &str) -> bool {
    body.contains("must be part of the diff") || body.contains("path is invalid")
}

impl Client {
    pub fn new() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| Self::token_from_gh_cli())
            .context("Set GITHUB_TOKEN or install/auth gh CLI")?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("lgtm/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: "https://api.github.com".to_string(),
        })
    }

    fn token_from_gh_cli() -> Result<String> {
        let output = std::process::Command::new("gh")
            .args(["auth", "token"])
            .output()
            .context("Failed to run `gh auth token`")?;
        if !output.status.success() {
            anyhow::bail!("gh auth token failed");
        }
        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    // --- REST helpers ---

    async fn rest_get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let sep = if path.contains('?') { '&' } else { '?' };
            let url = format!(
                "{}{}{}per_page=100&page={}",
                self.base_url, path, sep, page
            );
            let resp = self.http.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("GitHub API error {status}: {body}");
            }
            let items: Vec<T> = resp.json().await?;
            if items.is_empty() {
                break;
            }
            all.extend(items);
            page += 1;
        }
        Ok(all)
    }

    async fn rest_post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error {status}: {body}");
        }
        Ok(resp.json().await?)
    }

    async fn rest_patch<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.patch(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error {status}: {body}");
        }
        Ok(resp.json().await?)
    }

    // --- Public API ---

    /// Fetch PR metadata. The head sha is what review-comment creation wants
    /// as `commit_id`; callers re-fetch right before creating because the
    /// API rejects shas that a push has made stale.
    pub async fn get_pr(&self, repo: &str, number: u64) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/pulls/{}", self.base_url, repo, number);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "pull request #{number} not found in {repo}"
            ))
            .into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error {status}: {body}");
        }
        Ok(resp.json().await?)
    }

    /// Review comments: everything anchored to a file or file+line.
    pub async fn list_review_comments(&self, repo: &str, number: u64) -> Result<Vec<Comment>> {
        self.rest_get_all_pages(&format!("/repos/{repo}/pulls/{number}/comments"))
            .await
    }

    /// Conversation comments on the PR itself; these never carry a path.
    pub async fn list_issue_comments(&self, repo: &str, number: u64) -> Result<Vec<Comment>> {
        self.rest_get_all_pages(&format!("/repos/{repo}/issues/{number}/comments"))
            .await
    }

    pub async fn create_issue_comment(&self, repo: &str, number: u64, body: &str) -> Result<Comment> {
        self.rest_post(
            &format!("/repos/{repo}/issues/{number}/comments"),
            &CommentBody { body },
        )
        .await
    }

    /// Start a new review thread. Maps the API's path-not-in-diff rejection
    /// to a message that points at the PR-level alternative.
    pub async fn create_review_comment(
        &self,
        repo: &str,
        number: u64,
        comment: &NewReviewComment,
    ) -> Result<Comment> {
        let url = format!("{}/repos/{}/pulls/{}/comments", self.base_url, repo, number);
        let resp = self.http.post(&url).json(comment).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::UNPROCESSABLE_ENTITY && rejects_path_outside_diff(&body) {
                return Err(Error::NotFound(format!(
                    "`{}` is not part of the diff of pull request #{number}; \
                     drop --file to leave a comment on the pull request instead",
                    comment.path
                ))
                .into());
            }
            anyhow::bail!("GitHub API error {status}: {body}");
        }
        Ok(resp.json().await?)
    }

    pub async fn create_reply(
        &self,
        repo: &str,
        number: u64,
        root_id: u64,
        body: &str,
    ) -> Result<Comment> {
        self.rest_post(
            &format!("/repos/{repo}/pulls/{number}/comments/{root_id}/replies"),
            &CommentBody { body },
        )
        .await
    }

    pub async fn update_review_comment(&self, repo: &str, id: u64, body: &str) -> Result<Comment> {
        self.rest_patch(
            &format!("/repos/{repo}/pulls/comments/{id}"),
            &CommentBody { body },
        )
        .await
    }

    pub async fn update_issue_comment(&self, repo: &str, id: u64, body: &str) -> Result<Comment> {
        self.rest_patch(
            &format!("/repos/{repo}/issues/comments/{id}"),
            &CommentBody { body },
        )
        .await
    }

    pub async fn approve(&self, repo: &str, number: u64, body: Option<&str>) -> Result<ReviewResponse> {
        self.rest_post(
            &format!("/repos/{repo}/pulls/{number}/reviews"),
            &CreateReview {
                event: "APPROVE",
                body,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_payload_omits_start_fields() {
        let c = NewReviewComment::for_lines("nit", "abc123", "src/lib.rs", LineRange { start: 5, end: 5 });
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["line"], 5);
        assert_eq!(v["side"], "RIGHT");
        assert!(v.get("start_line").is_none());
        assert!(v.get("start_side").is_none());
        assert!(v.get("subject_type").is_none());
    }

    #[test]
    fn multi_line_payload_anchors_on_the_end_line() {
        let c = NewReviewComment::for_lines("nit", "abc123", "src/lib.rs", LineRange { start: 3, end: 7 });
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["line"], 7);
        assert_eq!(v["start_line"], 3);
        assert_eq!(v["start_side"], "RIGHT");
    }

    #[test]
    fn file_payload_uses_subject_type_and_no_line() {
        let c = NewReviewComment::for_file("looks good", "abc123", "docs/setup.md");
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["subject_type"], "file");
        assert_eq!(v["commit_id"], "abc123");
        assert!(v.get("line").is_none());
        assert!(v.get("start_line").is_none());
    }

    #[test]
    fn detects_path_outside_diff_rejections() {
        assert!(rejects_path_outside_diff(
            r#"{"message":"Validation Failed","errors":[{"message":"pull_request_review_thread.path must be part of the diff"}]}"#
        ));
        assert!(rejects_path_outside_diff(r#"{"message":"path is invalid"}"#));
        assert!(!rejects_path_outside_diff(
            r#"{"message":"commit_id is not part of the pull request"}"#
        ));
    }

    #[test]
    fn comment_listing_deserializes_optional_fields() {
        let raw = r#"[
            {"id": 10, "body": "root", "path": "src/lib.rs", "line": 4,
             "user": {"login": "octocat"}},
            {"id": 11, "body": "reply", "path": "src/lib.rs", "line": 4,
             "in_reply_to_id": 10, "user": {"login": "hubot"}},
            {"id": 12, "body": "conversation", "user": {"login": "octocat"}}
        ]"#;
        let comments: Vec<Comment> = serde_json::from_str(raw).unwrap();
        assert!(comments[0].is_root());
        assert_eq!(comments[1].in_reply_to_id, Some(10));
        assert_eq!(comments[1].author(), "hubot");
        assert!(comments[2].path.is_none());
    }
}
