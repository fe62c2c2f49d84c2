use crate::{
    api::GitHubClient,
    config::Settings,
    error::Result,
    problem::ProblemSubmission,
    template::{build_file_path, strip_header},
};

/// Whether `submission` would change the repository.
///
/// Fails open: a read error counts as "different" so a legitimate push is
/// never dropped.
pub async fn is_different(
    client: &GitHubClient,
    submission: &ProblemSubmission,
    settings: &Settings,
) -> bool {
    match remote_code(client, submission, settings).await {
        Ok(None) => true,
        Ok(Some(existing)) => {
            let different = existing != submission.code.trim();
            tracing::debug!(different, "compared with remote file");
            different
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not check existing file, assuming different");
            true
        }
    }
}

/// Code part of the remote file, `None` if the file does not exist.
async fn remote_code(
    client: &GitHubClient,
    submission: &ProblemSubmission,
    settings: &Settings,
) -> Result<Option<String>> {
    let (_, owner, repo) = settings.credentials()?;
    let path = build_file_path(submission, settings.layout);

    let Some(file) = client.get_file(owner, repo, &path, settings.branch()).await? else {
        return Ok(None);
    };
    Ok(Some(strip_header(&file.decoded()?)))
}
