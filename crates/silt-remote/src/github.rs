//! GitHub adapter over the git data API.
//!
//! GitHub has no actions-style commit endpoint, so the adapter assembles
//! one itself: upload a blob per created or updated file, build a tree on
//! top of the parent commit's tree (deletions are `sha: null` entries),
//! create the commit, then move the branch ref.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use silt_types::{Change, ChangeKind};

use crate::error::{RemoteError, RemoteResult};
use crate::http::{expect_success, json_body, require_str, USER_AGENT};
use crate::traits::{RemoteAdapter, RemoteSnapshot};

const API_HOST: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const BLOB_MODE: &str = "100644";

/// Construction options for [`GitHubRemote`].
#[derive(Clone, Debug)]
pub struct GitHubOptions {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub branch: Option<String>,
}

/// Remote adapter for a GitHub repository.
pub struct GitHubRemote {
    client: reqwest::Client,
    owner: String,
    repo: String,
    token: String,
    branch: String,
}

impl GitHubRemote {
    pub fn new(options: GitHubOptions) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            owner: options.owner,
            repo: options.repo,
            token: options.token,
            branch: options.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{API_HOST}/repos/{}/{}/{tail}", self.owner, self.repo)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
    }

    async fn get_json(&self, url: &str) -> RemoteResult<serde_json::Value> {
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        json_body(expect_success(resp).await?).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> RemoteResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        json_body(expect_success(resp).await?).await
    }

    /// Upload one blob, returning its sha.
    async fn create_blob(&self, content: &str) -> RemoteResult<String> {
        let value = self
            .post_json(
                &self.repo_url("git/blobs"),
                &json!({ "content": content, "encoding": "utf-8" }),
            )
            .await?;
        Ok(require_str(&value, "/sha")?.to_string())
    }

    async fn fetch_raw_file(&self, branch: &str, path: &str) -> RemoteResult<String> {
        let url = self.repo_url(&format!("contents/{path}"));
        let resp = self
            .request(reqwest::Method::GET, &url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.raw")
            .query(&[("ref", branch)])
            .send()
            .await?;
        Ok(expect_success(resp).await?.text().await?)
    }
}

/// The tree entries for one actions commit: uploaded blob shas for creates
/// and updates, `sha: null` tombstones for deletes.
fn tree_entries(changes: &[Change], blob_shas: &BTreeMap<String, String>) -> Vec<serde_json::Value> {
    changes
        .iter()
        .map(|c| match c.kind {
            ChangeKind::Create | ChangeKind::Update => json!({
                "path": c.path,
                "mode": BLOB_MODE,
                "type": "blob",
                "sha": blob_shas.get(&c.path),
            }),
            ChangeKind::Delete => json!({
                "path": c.path,
                "mode": BLOB_MODE,
                "type": "blob",
                "sha": serde_json::Value::Null,
            }),
        })
        .collect()
}

#[async_trait]
impl RemoteAdapter for GitHubRemote {
    async fn fetch_snapshot(&self, branch: &str) -> RemoteResult<RemoteSnapshot> {
        let value = self
            .get_json(&self.repo_url(&format!("branches/{branch}")))
            .await?;
        let head = require_str(&value, "/commit/sha")?.to_string();

        let tree = self
            .get_json(&self.repo_url(&format!("git/trees/{head}?recursive=1")))
            .await?;
        let items = tree
            .get("tree")
            .and_then(|t| t.as_array())
            .ok_or_else(|| {
                RemoteError::UnexpectedResponse("tree listing is not an array".to_string())
            })?;

        let mut files = BTreeMap::new();
        for item in items {
            if item.get("type").and_then(|t| t.as_str()) != Some("blob") {
                continue;
            }
            let path = require_str(item, "/path")?.to_string();
            let content = self.fetch_raw_file(branch, &path).await?;
            files.insert(path, content);
        }
        tracing::debug!(head = %head, files = files.len(), "fetched github snapshot");
        Ok(RemoteSnapshot { head, files })
    }

    async fn create_commit_with_actions(
        &self,
        branch: &str,
        message: &str,
        changes: &[Change],
    ) -> RemoteResult<String> {
        // Parent commit and its tree anchor the new tree.
        let head_ref = self
            .get_json(&self.repo_url(&format!("git/refs/heads/{branch}")))
            .await?;
        let parent = require_str(&head_ref, "/object/sha")?.to_string();

        let parent_commit = self
            .get_json(&self.repo_url(&format!("git/commits/{parent}")))
            .await?;
        let base_tree = require_str(&parent_commit, "/tree/sha")?.to_string();

        let mut blob_shas = BTreeMap::new();
        for change in changes {
            if let Some(content) = &change.content {
                let sha = self.create_blob(content).await?;
                blob_shas.insert(change.path.clone(), sha);
            }
        }

        let tree = self
            .post_json(
                &self.repo_url("git/trees"),
                &json!({
                    "base_tree": base_tree,
                    "tree": tree_entries(changes, &blob_shas),
                }),
            )
            .await?;
        let tree_sha = require_str(&tree, "/sha")?.to_string();

        let commit = self
            .post_json(
                &self.repo_url("git/commits"),
                &json!({
                    "message": message,
                    "tree": tree_sha,
                    "parents": [parent],
                }),
            )
            .await?;
        let commit_sha = require_str(&commit, "/sha")?.to_string();

        self.update_ref(branch, &commit_sha).await?;
        tracing::debug!(commit = %commit_sha, actions = changes.len(), "created github commit");
        Ok(commit_sha)
    }

    async fn update_ref(&self, branch: &str, commit_sha: &str) -> RemoteResult<()> {
        let resp = self
            .request(
                reqwest::Method::PATCH,
                &self.repo_url(&format!("git/refs/heads/{branch}")),
            )
            .json(&json!({ "sha": commit_sha, "force": false }))
            .send()
            .await?;
        expect_success(resp).await?;
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

impl std::fmt::Debug for GitHubRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRemote")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish()
    }
}
