//! Config command - Inspect and edit the settings file

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::{Settings, get_config_path, reset_config};

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print current settings (token masked)
    Show,
    /// Set one key, e.g. `config set layout by-topic`
    Set { key: String, value: String },
    /// Print the settings file location
    Path,
    /// Restore defaults
    Reset,
}

pub async fn execute(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
            let missing = settings.missing_fields();
            if !missing.is_empty() {
                println!("{}", format!("⚠ Not configured: {}", missing.join(", ")).yellow());
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_file()?;
            settings.set(&key, &value)?;
            settings.save()?;
            println!("{}", "Settings saved successfully!".green());
        }
        ConfigAction::Path => println!("{}", get_config_path()?.display()),
        ConfigAction::Reset => {
            reset_config()?;
            println!("{}", "✓ Settings reset to defaults".green());
        }
    }
    Ok(())
}
