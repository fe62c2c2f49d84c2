use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

pub const GITHUB_API: &str = "https://api.github.com";

/// GitHub contents API client for one access token.
///
/// # Example
///
/// ```ignore
/// let client = GitHubClient::new("ghp_...")?;
/// let user = client.whoami().await?;
/// println!("Connected as {}", user.login);
///
/// if let Some(file) = client.get_file("octocat", "solutions", "Easy/two-sum.py", "main").await? {
///     println!("{}", file.decoded()?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

/// A file as returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// Base64, wrapped with newlines by the API.
    #[serde(default)]
    pub content: String,
    pub sha: String,
}

impl RemoteFile {
    pub fn decoded(&self) -> Result<String> {
        let compact: String = self.content.split_whitespace().collect();
        let bytes = BASE64
            .decode(compact)
            .map_err(|e| SyncError::RemoteRead(format!("invalid base64 content: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| SyncError::RemoteRead(format!("content is not UTF-8: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommittedContent {
    pub html_url: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct PutFileResponse {
    content: CommittedContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Outcome of `GET /repos/{owner}/{repo}`.
#[derive(Debug)]
pub enum RepoAccess {
    Accessible(Repository),
    NotFound,
    Denied(StatusCode),
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::new_with_base_url(token, GITHUB_API.to_string())
    }

    pub(crate) fn new_with_base_url(token: &str, base_url: String) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("neetcode-sync/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SyncError::Configuration("token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url)
    }

    /// `None` when the file does not exist on `branch`.
    pub async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>> {
        let url = self.contents_url(owner, repo, path);
        let response = self
            .client
            .get(&url)
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(path, "remote file does not exist yet");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SyncError::RemoteRead(format!(
                "{} reading {path}",
                response.status()
            )));
        }

        let file: RemoteFile = response.json().await?;
        Ok(Some(file))
    }

    /// Create or update a file. `sha` must be the current revision for updates.
    #[allow(clippy::too_many_arguments)]
    pub async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
        message: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<CommittedContent> {
        let body = PutFileBody {
            message,
            content: BASE64.encode(content.as_bytes()),
            branch,
            sha,
        };

        let url = self.contents_url(owner, repo, path);
        let response = self.client.put(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("Failed to push to GitHub: {status}"));
            return Err(SyncError::RemoteWrite(message));
        }

        let result: PutFileResponse = response.json().await?;
        tracing::info!(url = %result.content.html_url, "pushed file");
        Ok(result.content)
    }

    pub async fn whoami(&self) -> Result<User> {
        let url = format!("{}/user", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SyncError::Configuration("Invalid token".to_string()));
        }
        Ok(response.json().await?)
    }

    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<RepoAccess> {
        let url = format!("{}/repos/{owner}/{repo}", self.base_url);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            s if s.is_success() => Ok(RepoAccess::Accessible(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(RepoAccess::NotFound),
            s => Ok(RepoAccess::Denied(s)),
        }
    }
}
