//! What happens after the judge accepts a submission.

use chrono::{DateTime, Utc};

use crate::{
    api::{GITHUB_API, GitHubClient},
    config::{Settings, SettingsStore},
    dedup,
    error::SyncError,
    metadata::extract_problem_data,
    notify::Notifier,
    problem::ProblemSubmission,
    publisher::{Publisher, PublisherRequest},
    session::PageSession,
};

pub const NOT_CONFIGURED: &str = "Configure GitHub settings in extension popup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    AutoPushDisabled,
    NotConfigured,
    NoCode,
    UpToDate,
    Pushed { url: String },
    Failed(String),
}

pub struct SyncPipeline<'a> {
    store: &'a dyn SettingsStore,
    notifier: &'a dyn Notifier,
    api_base: String,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(store: &'a dyn SettingsStore, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            notifier,
            api_base: GITHUB_API.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// `code` is the editor content captured when submit was clicked; the
    /// rest of the metadata is read from the page as it is now.
    pub async fn handle_success(
        &self,
        code: String,
        session: &PageSession,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        let settings = match self.store.load() {
            Ok(settings) => settings,
            Err(e) => return self.failed(e.to_string()),
        };
        if !settings.auto_push {
            tracing::info!("auto-push disabled");
            return CycleOutcome::AutoPushDisabled;
        }
        if !settings.is_configured() {
            self.notifier.error(NOT_CONFIGURED);
            return CycleOutcome::NotConfigured;
        }

        let Some(page) = session.page() else {
            return self.no_code();
        };
        let mut submission = extract_problem_data(
            page,
            session.cache(),
            session.extractor(),
            settings.include_description,
        );
        submission.code = code;

        self.sync(submission, &settings, now).await
    }

    /// Dedup then publish an already assembled submission.
    pub async fn sync(
        &self,
        submission: ProblemSubmission,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        if submission.code.trim().is_empty() {
            return self.no_code();
        }
        let client = match settings
            .credentials()
            .and_then(|(token, _, _)| GitHubClient::new_with_base_url(token, self.api_base.clone()))
        {
            Ok(client) => client,
            Err(e) => return self.failed(e.to_string()),
        };

        self.notifier.info("Checking GitHub...");
        if !dedup::is_different(&client, &submission, settings).await {
            tracing::info!(slug = %submission.slug, "remote already has this solution");
            self.notifier.success("Solution already up to date");
            return CycleOutcome::UpToDate;
        }

        self.notifier.info("Pushing solution to GitHub...");
        let title = submission.title.clone();
        let request = PublisherRequest::Push {
            data: submission,
            settings: settings.clone(),
        };
        let response = Publisher::new(&client)
            .handle(request, now.date_naive())
            .await;

        if !response.success {
            return self.failed(
                response
                    .error
                    .unwrap_or_else(|| "Failed to push".to_string()),
            );
        }

        self.notifier.success(&format!("Pushed: {title}"));
        match self.store.record_push(now) {
            Ok(stats) => tracing::debug!(total = stats.total_pushed, "recorded push"),
            Err(e) => tracing::warn!(error = %e, "could not update statistics"),
        }
        CycleOutcome::Pushed {
            url: response.url.unwrap_or_default(),
        }
    }

    fn no_code(&self) -> CycleOutcome {
        self.notifier.error(&SyncError::Extraction.to_string());
        CycleOutcome::NoCode
    }

    fn failed(&self, message: String) -> CycleOutcome {
        tracing::warn!(error = %message, "push failed");
        self.notifier.error(&message);
        CycleOutcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::{
        config::MemoryStore,
        notify::{NoticeKind, RecordingNotifier},
        page::PageSnapshot,
        template::build_file_content,
    };

    const PAGE: &str = r#"<html><body>
        <div class="difficulty-btn">Easy</div>
        <div class="monaco-editor"><div class="view-line">print("live")</div></div>
        <button>Submit</button>
    </body></html>"#;

    fn configured() -> Settings {
        Settings {
            token: Some("test_token".to_string()),
            owner: Some("octocat".to_string()),
            repo: Some("solutions".to_string()),
            include_description: false,
            ..Default::default()
        }
    }

    fn session() -> PageSession {
        let mut session = PageSession::default();
        session.on_snapshot(PageSnapshot::new(
            "https://neetcode.io/problems/two-sum/submissions",
            PAGE,
            HashMap::new(),
        ));
        session
    }

    fn committed() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": {
                "html_url": "https://github.com/octocat/solutions/blob/main/Easy/two-sum.py",
                "sha": "new-sha"
            }
        }))
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri doesn't support TCP sockets")]
    async fn test_accepted_submission_is_pushed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/solutions/contents/Easy/two-sum.py"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octocat/solutions/contents/Easy/two-sum.py"))
            .respond_with(committed())
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryStore::new(configured());
        let notifier = RecordingNotifier::default();
        let now = Utc::now();
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base(server.uri())
            .handle_success("print(1)".to_string(), &session(), now)
            .await;

        assert_eq!(
            outcome,
            CycleOutcome::Pushed {
                url: "https://github.com/octocat/solutions/blob/main/Easy/two-sum.py".to_string()
            }
        );
        assert_eq!(
            notifier.messages(),
            vec!["Checking GitHub...", "Pushing solution to GitHub...", "Pushed: Two Sum"]
        );
        let stats = store.snapshot().stats;
        assert_eq!(stats.total_pushed, 1);
        assert_eq!(stats.last_push, Some(now));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri doesn't support TCP sockets")]
    async fn test_click_time_code_is_published() {
        let server = MockServer::start().await;
        let now = Utc::now();
        let submission = ProblemSubmission {
            slug: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: Some(crate::problem::Difficulty::Easy),
            language: "py".to_string(),
            code: "print(1)".to_string(),
            url: "https://neetcode.io/problems/two-sum".to_string(),
            ..Default::default()
        };
        let remote = build_file_content(&submission, false, now.date_naive());
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": BASE64.encode(remote),
                "sha": "old-sha"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(committed())
            .expect(0)
            .mount(&server)
            .await;

        let store = MemoryStore::new(configured());
        let notifier = RecordingNotifier::default();
        // Editor now says print("live"), the snapshot said print(1)
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base(server.uri())
            .handle_success("print(1)".to_string(), &session(), now)
            .await;

        assert_eq!(outcome, CycleOutcome::UpToDate);
        assert_eq!(
            notifier.last(),
            Some((NoticeKind::Success, "Solution already up to date".to_string()))
        );
        assert_eq!(store.snapshot().stats.total_pushed, 0);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri doesn't support TCP sockets")]
    async fn test_write_error_is_shown_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "is at 3f2a but expected 9b1c"
            })))
            .mount(&server)
            .await;

        let store = MemoryStore::new(configured());
        let notifier = RecordingNotifier::default();
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base(server.uri())
            .handle_success("print(1)".to_string(), &session(), Utc::now())
            .await;

        assert_eq!(outcome, CycleOutcome::Failed("is at 3f2a but expected 9b1c".to_string()));
        assert_eq!(
            notifier.last(),
            Some((NoticeKind::Error, "is at 3f2a but expected 9b1c".to_string()))
        );
        assert_eq!(store.snapshot().stats.total_pushed, 0);
    }

    #[tokio::test]
    async fn test_auto_push_disabled_is_silent() {
        let store = MemoryStore::new(Settings {
            auto_push: false,
            ..configured()
        });
        let notifier = RecordingNotifier::default();
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base("http://127.0.0.1:9")
            .handle_success("print(1)".to_string(), &session(), Utc::now())
            .await;

        assert_eq!(outcome, CycleOutcome::AutoPushDisabled);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_missing_settings_are_reported() {
        let store = MemoryStore::new(Settings::default());
        let notifier = RecordingNotifier::default();
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base("http://127.0.0.1:9")
            .handle_success("print(1)".to_string(), &session(), Utc::now())
            .await;

        assert_eq!(outcome, CycleOutcome::NotConfigured);
        assert_eq!(notifier.messages(), vec![NOT_CONFIGURED]);
    }

    #[tokio::test]
    async fn test_empty_code_is_an_extraction_failure() {
        let store = MemoryStore::new(configured());
        let notifier = RecordingNotifier::default();
        let outcome = SyncPipeline::new(&store, &notifier)
            .with_api_base("http://127.0.0.1:9")
            .handle_success("  \n".to_string(), &session(), Utc::now())
            .await;

        assert_eq!(outcome, CycleOutcome::NoCode);
        assert_eq!(
            notifier.last(),
            Some((NoticeKind::Error, "Could not extract code from editor".to_string()))
        );
    }
}
