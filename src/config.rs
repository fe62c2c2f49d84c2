use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SyncError},
    problem::Layout,
    template::{DEFAULT_COMMIT_TEMPLATE, DEFAULT_UPDATE_TEMPLATE},
};

const APP_NAME: &str = "neetcode-sync";

/// Token override for machines where the settings file should not hold secrets.
pub const TOKEN_ENV: &str = "NEETCODE_SYNC_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_pushed: u64,
    pub last_push: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub layout: Layout,
    pub auto_push: bool,
    pub include_description: bool,
    pub commit_template: String,
    pub update_template: String,
    pub stats: Stats,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            branch: "main".to_string(),
            layout: Layout::ByDifficulty,
            auto_push: true,
            include_description: true,
            commit_template: DEFAULT_COMMIT_TEMPLATE.to_string(),
            update_template: DEFAULT_UPDATE_TEMPLATE.to_string(),
            stats: Stats::default(),
        }
    }
}

impl Settings {
    /// Settings file plus the environment token override.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_file()?;
        settings.apply_env();
        Ok(settings)
    }

    /// Settings file only. Use this before `save` so an environment token
    /// never lands in the file.
    pub fn load_file() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn save(&self) -> Result<()> {
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.token = Some(token.trim().to_string());
            }
        }
    }

    pub fn branch(&self) -> &str {
        if self.branch.trim().is_empty() {
            "main"
        } else {
            self.branch.trim()
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.token) {
            missing.push("token");
        }
        if blank(&self.owner) {
            missing.push("owner");
        }
        if blank(&self.repo) {
            missing.push("repo");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Token, owner and repo, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str, &str)> {
        match (&self.token, &self.owner, &self.repo) {
            (Some(token), Some(owner), Some(repo)) if self.is_configured() => {
                Ok((token.trim(), owner.trim(), repo.trim()))
            }
            _ => Err(SyncError::Configuration(format!(
                "missing {}; run `neetcode-sync config set <key> <value>`",
                self.missing_fields().join(", ")
            ))),
        }
    }

    /// Set a key from its command-line spelling.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "token" => self.token = optional(value),
            "owner" => self.owner = optional(value),
            "repo" => self.repo = optional(value),
            "branch" => {
                self.branch = (if value.is_empty() { "main" } else { value }).to_string()
            }
            "layout" => {
                self.layout = serde_json::from_value(serde_json::Value::String(value.to_string()))
                    .map_err(|_| {
                        SyncError::Configuration(format!(
                            "unknown layout {value:?}; expected flat, by-difficulty or by-topic"
                        ))
                    })?
            }
            "auto_push" | "auto-push" => self.auto_push = parse_bool(key, value)?,
            "include_description" | "include-description" => {
                self.include_description = parse_bool(key, value)?
            }
            "commit_template" | "commit-template" => self.commit_template = value.to_string(),
            "update_template" | "update-template" => self.update_template = value.to_string(),
            _ => {
                return Err(SyncError::Configuration(format!("unknown setting {key:?}")));
            }
        }
        Ok(())
    }

    /// Copy safe to print: the token is masked.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        if let Some(token) = &copy.token {
            let skip = token.chars().count().saturating_sub(4);
            let tail: String = token.chars().skip(skip).collect();
            copy.token = Some(format!("****{tail}"));
        }
        copy
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SyncError::Configuration(format!(
            "{key} expects true or false, got {value:?}"
        ))),
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(confy::get_configuration_file_path(APP_NAME, None)?)
}

pub fn reset_config() -> Result<()> {
    Settings::default().save()
}

/// Where the sync pipeline reads settings and records push statistics.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;

    fn record_push(&self, at: DateTime<Utc>) -> Result<Stats>;
}

/// Settings file managed by confy.
#[derive(Debug, Default)]
pub struct ConfyStore;

impl SettingsStore for ConfyStore {
    fn load(&self) -> Result<Settings> {
        Settings::load()
    }

    fn record_push(&self, at: DateTime<Utc>) -> Result<Stats> {
        let mut settings = Settings::load_file()?;
        settings.stats.total_pushed += 1;
        settings.stats.last_push = Some(at);
        settings.save()?;
        Ok(settings.stats)
    }
}

/// In-process store.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: std::cell::RefCell<Settings>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: std::cell::RefCell::new(settings),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.settings.borrow().clone()
    }
}

#[cfg(test)]
impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.settings.borrow().clone())
    }

    fn record_push(&self, at: DateTime<Utc>) -> Result<Stats> {
        let mut settings = self.settings.borrow_mut();
        settings.stats.total_pushed += 1;
        settings.stats.last_push = Some(at);
        Ok(settings.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.branch, "main");
        assert_eq!(settings.layout, Layout::ByDifficulty);
        assert!(settings.auto_push);
        assert!(settings.include_description);
        assert_eq!(settings.stats.total_pushed, 0);
        assert!(settings.stats.last_push.is_none());
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_missing_fields() {
        let mut settings = Settings::default();
        assert_eq!(settings.missing_fields(), vec!["token", "owner", "repo"]);
        assert!(settings.credentials().is_err());

        settings.token = Some("ghp_abc".to_string());
        settings.owner = Some("  ".to_string());
        settings.repo = Some("solutions".to_string());
        assert_eq!(settings.missing_fields(), vec!["owner"]);

        let err = settings.credentials().unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("owner"));

        settings.owner = Some("octocat".to_string());
        assert_eq!(settings.credentials().unwrap(), ("ghp_abc", "octocat", "solutions"));
    }

    #[test]
    fn test_set_keys() {
        let mut settings = Settings::default();
        settings.set("owner", "octocat").unwrap();
        settings.set("layout", "by-topic").unwrap();
        settings.set("auto-push", "off").unwrap();
        settings.set("include_description", "false").unwrap();
        settings.set("branch", "").unwrap();

        assert_eq!(settings.owner.as_deref(), Some("octocat"));
        assert_eq!(settings.layout, Layout::ByTopic);
        assert!(!settings.auto_push);
        assert!(!settings.include_description);
        assert_eq!(settings.branch, "main");

        assert!(settings.set("layout", "nested").is_err());
        assert!(settings.set("auto_push", "maybe").is_err());
        assert!(settings.set("colour", "blue").is_err());
    }

    #[test]
    fn test_blank_branch_falls_back_to_main() {
        let settings = Settings {
            branch: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.branch(), "main");
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"owner": "octocat", "layout": "topic"}"#).unwrap();
        assert_eq!(settings.owner.as_deref(), Some("octocat"));
        assert_eq!(settings.layout, Layout::ByTopic);
        assert_eq!(settings.branch, "main");
        assert!(settings.auto_push);
    }

    #[test]
    fn test_redacted() {
        let settings = Settings {
            token: Some("ghp_secret1234".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.redacted().token.as_deref(), Some("****1234"));
        assert!(Settings::default().redacted().token.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_token_from_env() {
        let original = env::var(TOKEN_ENV).ok();
        env::set_var(TOKEN_ENV, " ghp_from_env ");

        let mut settings = Settings::default();
        settings.apply_env();
        assert_eq!(settings.token.as_deref(), Some("ghp_from_env"));

        match original {
            Some(val) => env::set_var(TOKEN_ENV, val),
            None => env::remove_var(TOKEN_ENV),
        }
    }

    #[test]
    fn test_memory_store_records_push() {
        let store = MemoryStore::new(Settings::default());
        let at = Utc::now();
        let stats = store.record_push(at).unwrap();
        assert_eq!(stats.total_pushed, 1);
        assert_eq!(store.snapshot().stats.last_push, Some(at));
        store.record_push(at).unwrap();
        assert_eq!(store.load().unwrap().stats.total_pushed, 2);
    }
}
