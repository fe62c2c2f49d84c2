//! Stats command - Show push statistics

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::config::Settings;

pub async fn execute() -> Result<()> {
    let stats = Settings::load()?.stats;
    println!("{} {}", "Pushed:".bold(), stats.total_pushed);
    let last = stats
        .last_push
        .map_or_else(|| "Never".to_string(), |at| format_relative_time(at, Utc::now()));
    println!("{} {}", "Last push:".bold(), last);
    Ok(())
}

pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}
