//! Create-or-update write of a solution file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    api::GitHubClient,
    config::Settings,
    error::Result,
    problem::ProblemSubmission,
    template::{build_file_content, build_file_path, render_commit_message},
};

/// Message accepted by the publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PublisherRequest {
    #[serde(rename = "PUSH")]
    Push {
        data: ProblemSubmission,
        settings: Settings,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PushResponse {
    pub fn ok(published: &Published) -> Self {
        Self {
            success: true,
            url: Some(published.url.clone()),
            revision: Some(published.revision.clone()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            revision: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub path: String,
    pub url: String,
    pub revision: String,
    pub updated: bool,
}

pub struct Publisher<'a> {
    client: &'a GitHubClient,
}

impl<'a> Publisher<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    pub async fn handle(&self, request: PublisherRequest, date: NaiveDate) -> PushResponse {
        match request {
            PublisherRequest::Push { data, settings } => {
                match self.push(&data, &settings, date).await {
                    Ok(published) => PushResponse::ok(&published),
                    Err(e) => PushResponse::failed(e.to_string()),
                }
            }
        }
    }

    /// Write `submission`, updating in place when the file already exists.
    pub async fn push(
        &self,
        submission: &ProblemSubmission,
        settings: &Settings,
        date: NaiveDate,
    ) -> Result<Published> {
        let (_, owner, repo) = settings.credentials()?;
        let branch = settings.branch();
        let path = build_file_path(submission, settings.layout);
        let content = build_file_content(submission, settings.include_description, date);

        // A failed read is treated like a missing file; the write then
        // reports the real problem.
        let sha = match self.client.get_file(owner, repo, &path, branch).await {
            Ok(existing) => existing.map(|f| f.sha),
            Err(e) => {
                tracing::warn!(error = %e, %path, "could not read existing file");
                None
            }
        };

        let template = if sha.is_some() {
            &settings.update_template
        } else {
            &settings.commit_template
        };
        let message = render_commit_message(template, submission)?;

        tracing::info!(%path, update = sha.is_some(), "pushing solution");
        let committed = self
            .client
            .put_file(owner, repo, &path, branch, &message, &content, sha.as_deref())
            .await?;

        Ok(Published {
            path,
            url: committed.html_url,
            revision: committed.sha,
            updated: sha.is_some(),
        })
    }
}
