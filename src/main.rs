use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod dedup;
mod difficulty;
mod error;
mod events;
mod extractor;
mod host;
mod metadata;
mod notify;
mod page;
mod pipeline;
mod problem;
mod publisher;
mod session;
mod template;
mod watcher;

use commands::configure::ConfigAction;
use problem::Difficulty;

#[derive(Parser)]
#[command(name = "neetcode-sync")]
#[command(about = "Push accepted NeetCode solutions to a GitHub repository")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch page events from the browser bridge and sync accepted solutions
    Watch {
        /// Read recorded events from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the submission that would be built from a saved page
    Extract {
        /// Saved page HTML
        #[arg(long)]
        html: PathBuf,
        /// Page URL
        #[arg(long)]
        url: String,
        /// Include the problem description
        #[arg(short, long)]
        description: bool,
    },
    /// Push a local solution file
    Push {
        /// Solution file
        #[arg(short, long)]
        file: PathBuf,
        /// Problem URL, e.g. https://neetcode.io/problems/two-sum
        #[arg(short, long)]
        url: String,
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,
        #[arg(short, long)]
        topic: Option<String>,
        /// Language name or extension (default: from the file extension)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Check the token and repository access
    TestConnection,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show push statistics
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Watch { input } => commands::watch::execute(input).await?,
        Commands::Extract {
            html,
            url,
            description,
        } => commands::extract::execute(&html, &url, description).await?,
        Commands::Push {
            file,
            url,
            difficulty,
            topic,
            language,
        } => commands::push::execute(&file, &url, difficulty, topic, language).await?,
        Commands::TestConnection => commands::connect::execute().await?,
        Commands::Config { action } => commands::configure::execute(action).await?,
        Commands::Stats => commands::stats::execute().await?,
    }

    Ok(())
}
