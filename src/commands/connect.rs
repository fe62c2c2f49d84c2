//! Test-connection command - Check the token and repository

use anyhow::Result;
use colored::Colorize;

use crate::{
    api::{GitHubClient, RepoAccess},
    config::Settings,
};

pub async fn execute() -> Result<()> {
    let settings = Settings::load()?;
    let (token, owner, repo) = settings.credentials()?;
    let client = GitHubClient::new(token)?;

    println!("{}", "Testing connection...".cyan());
    let message = check(&client, owner, repo).await?;
    println!("{}", message.green());
    Ok(())
}

async fn check(client: &GitHubClient, owner: &str, repo: &str) -> Result<String> {
    let user = client.whoami().await?;

    match client.get_repo(owner, repo).await? {
        RepoAccess::Accessible(repository) => {
            tracing::debug!(
                repo = %repository.full_name,
                private = repository.private,
                default_branch = ?repository.default_branch,
                "repository reachable"
            );
            Ok(format!("✓ Connected as {}", user.login))
        }
        RepoAccess::NotFound => {
            anyhow::bail!("Repository \"{owner}/{repo}\" not found. Create it first!")
        }
        RepoAccess::Denied(status) => {
            tracing::debug!(%status, "repository check refused");
            anyhow::bail!("Cannot access repository")
        }
    }
}
