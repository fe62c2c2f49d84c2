//! Watch command - Run the sync host over bridge events

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::io::BufReader;

use crate::{
    config::{ConfyStore, SettingsStore},
    host::{Host, HostSummary},
    notify::ConsoleNotifier,
    pipeline::{CycleOutcome, SyncPipeline},
    session::PageSession,
};

pub async fn execute(input: Option<PathBuf>) -> Result<()> {
    let store = ConfyStore;
    let settings = store.load()?;
    let missing = settings.missing_fields();
    if !missing.is_empty() {
        eprintln!(
            "{}",
            format!("⚠ Missing {}; accepted solutions will not be pushed", missing.join(", "))
                .yellow()
        );
    }

    let notifier = ConsoleNotifier::default();
    notifier.banner();
    let mut host = Host::new(PageSession::default(), SyncPipeline::new(&store, &notifier));

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            host.run(BufReader::new(file)).await?
        }
        None => host.run(BufReader::new(tokio::io::stdin())).await?,
    };
    drop(notifier);

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &HostSummary) {
    let pushed = summary
        .cycles
        .iter()
        .filter(|c| matches!(c, CycleOutcome::Pushed { .. }))
        .count();
    let unchanged = summary
        .cycles
        .iter()
        .filter(|c| **c == CycleOutcome::UpToDate)
        .count();

    println!("{}", "Session finished".bold());
    println!("  Events:   {}", summary.events);
    println!("  Accepted: {}", summary.cycles.len());
    println!("  Pushed:   {}", pushed.to_string().green());
    println!("  Unchanged: {unchanged}");
    println!("  Rejected: {}", summary.rejected);
    println!("  Timed out: {}", summary.timed_out);
    if summary.malformed > 0 {
        println!("  Malformed events: {}", summary.malformed.to_string().red());
    }
}
