//! Push command - Sync a local solution file without the browser

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{
    config::{ConfyStore, SettingsStore},
    metadata::{DEFAULT_LANGUAGE, extension_for},
    notify::ConsoleNotifier,
    page::{canonical_url, problem_slug},
    pipeline::{CycleOutcome, SyncPipeline},
    problem::{Difficulty, ProblemSubmission, title_from_slug},
};

pub async fn execute(
    file: &Path,
    url: &str,
    difficulty: Option<Difficulty>,
    topic: Option<String>,
    language: Option<String>,
) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let submission = local_submission(file, url, code, difficulty, topic, language)?;

    let store = ConfyStore;
    let settings = store.load()?;
    settings.credentials()?;

    let notifier = ConsoleNotifier::default();
    let outcome = SyncPipeline::new(&store, &notifier)
        .sync(submission, &settings, Utc::now())
        .await;
    drop(notifier);

    match outcome {
        CycleOutcome::Pushed { url } => println!("{url}"),
        CycleOutcome::UpToDate => {}
        CycleOutcome::Failed(message) => anyhow::bail!(message),
        other => anyhow::bail!("push did not complete: {other:?}"),
    }
    Ok(())
}

fn local_submission(
    file: &Path,
    url: &str,
    code: String,
    difficulty: Option<Difficulty>,
    topic: Option<String>,
    language: Option<String>,
) -> Result<ProblemSubmission> {
    let slug = problem_slug(url).with_context(|| format!("not a problem URL: {url}"))?;

    let language = match language {
        Some(name) => {
            let name = name.to_lowercase();
            extension_for(&name).map(str::to_string).unwrap_or(name)
        }
        None => file
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
    };

    Ok(ProblemSubmission {
        title: title_from_slug(&slug),
        slug,
        difficulty,
        topic: topic.unwrap_or_default(),
        language,
        code,
        description: None,
        url: canonical_url(url),
    })
}
