//! GitLab adapter over the repository commits API.
//!
//! GitLab can apply a list of `{action, file_path, content}` actions as one
//! commit, so [`RemoteAdapter::create_commit_with_actions`] maps onto a
//! single POST. The snapshot side reads the branch head, the recursive tree
//! listing (paginated), and each blob's raw contents.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use silt_types::Change;

use crate::error::{RemoteError, RemoteResult};
use crate::http::{expect_success, json_body, require_str, USER_AGENT};
use crate::traits::{RemoteAdapter, RemoteSnapshot};

const DEFAULT_HOST: &str = "https://gitlab.com";
const DEFAULT_BRANCH: &str = "main";
const TREE_PAGE_SIZE: usize = 100;

/// Construction options for [`GitLabRemote`].
#[derive(Clone, Debug)]
pub struct GitLabOptions {
    /// Path-with-namespace (`group/project`); URL-encoded by the adapter.
    pub project_id: String,
    pub token: String,
    pub host: Option<String>,
    pub branch: Option<String>,
}

/// Remote adapter for a GitLab project.
pub struct GitLabRemote {
    client: reqwest::Client,
    host: String,
    project_id: String,
    token: String,
    branch: String,
}

impl GitLabRemote {
    pub fn new(options: GitLabOptions) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            host: options
                .host
                .unwrap_or_else(|| DEFAULT_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
            project_id: options.project_id,
            token: options.token,
            branch: options.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        })
    }

    fn project_url(&self, tail: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/{tail}",
            self.host,
            urlencoding::encode(&self.project_id)
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("PRIVATE-TOKEN", &self.token)
    }

    /// Collect all blob paths of the branch tree, following pagination.
    async fn list_tree(&self, branch: &str) -> RemoteResult<Vec<String>> {
        let url = self.project_url("repository/tree");
        let mut paths = Vec::new();
        let mut page = 1u32;
        loop {
            let per_page = TREE_PAGE_SIZE.to_string();
            let page_number = page.to_string();
            let resp = self
                .request(reqwest::Method::GET, &url)
                .query(&[
                    ("ref", branch),
                    ("recursive", "true"),
                    ("per_page", per_page.as_str()),
                    ("page", page_number.as_str()),
                ])
                .send()
                .await?;
            let value = json_body(expect_success(resp).await?).await?;
            let items = value.as_array().ok_or_else(|| {
                RemoteError::UnexpectedResponse("tree listing is not an array".to_string())
            })?;
            for item in items {
                if item.get("type").and_then(|t| t.as_str()) == Some("blob") {
                    paths.push(require_str(item, "/path")?.to_string());
                }
            }
            if items.len() < TREE_PAGE_SIZE {
                return Ok(paths);
            }
            page += 1;
        }
    }

    async fn fetch_raw_file(&self, branch: &str, path: &str) -> RemoteResult<String> {
        let url = self.project_url(&format!(
            "repository/files/{}/raw",
            urlencoding::encode(path)
        ));
        let resp = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", branch)])
            .send()
            .await?;
        Ok(expect_success(resp).await?.text().await?)
    }
}

/// The commits API request body for an actions commit.
fn commit_body(branch: &str, message: &str, changes: &[Change]) -> serde_json::Value {
    let actions: Vec<serde_json::Value> = changes
        .iter()
        .map(|c| {
            let mut action = json!({
                "action": c.kind.as_str(),
                "file_path": c.path,
            });
            if let Some(content) = &c.content {
                action["content"] = json!(content);
            }
            action
        })
        .collect();
    json!({
        "branch": branch,
        "commit_message": message,
        "actions": actions,
    })
}

#[async_trait]
impl RemoteAdapter for GitLabRemote {
    async fn fetch_snapshot(&self, branch: &str) -> RemoteResult<RemoteSnapshot> {
        let url = self.project_url(&format!(
            "repository/branches/{}",
            urlencoding::encode(branch)
        ));
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        let value = json_body(expect_success(resp).await?).await?;
        let head = require_str(&value, "/commit/id")?.to_string();

        let mut files = BTreeMap::new();
        for path in self.list_tree(branch).await? {
            let content = self.fetch_raw_file(branch, &path).await?;
            files.insert(path, content);
        }
        tracing::debug!(head = %head, files = files.len(), "fetched gitlab snapshot");
        Ok(RemoteSnapshot { head, files })
    }

    async fn create_commit_with_actions(
        &self,
        branch: &str,
        message: &str,
        changes: &[Change],
    ) -> RemoteResult<String> {
        let url = self.project_url("repository/commits");
        let resp = self
            .request(reqwest::Method::POST, &url)
            .json(&commit_body(branch, message, changes))
            .send()
            .await?;
        let value = json_body(expect_success(resp).await?).await?;
        let id = require_str(&value, "/id")?.to_string();
        tracing::debug!(commit = %id, actions = changes.len(), "created gitlab commit");
        Ok(id)
    }

    async fn update_ref(&self, branch: &str, commit_sha: &str) -> RemoteResult<()> {
        // The commits API moves the branch as part of the commit.
        tracing::debug!(branch, commit = commit_sha, "gitlab ref already updated by commit");
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }
}

impl std::fmt::Debug for GitLabRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabRemote")
            .field("host", &self.host)
            .field("project_id", &self.project_id)
            .field("branch", &self.branch)
            .finish()
    }
}
