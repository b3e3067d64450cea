use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::editable::DEFAULT_EDITABLE_MINUTES;
use crate::error::{AppError, Result};
use crate::models::{CronJob, PostJob};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_topic_editable_minutes")]
    pub topic_editable_minutes: i64,

    #[serde(default)]
    pub default_cron_posts: Vec<PostJob>,

    #[serde(default = "default_cron_jobs")]
    pub default_cron_jobs: Vec<CronJob>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("forum-store");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("forum.db").to_string_lossy().to_string()
}

fn default_topic_editable_minutes() -> i64 {
    DEFAULT_EDITABLE_MINUTES
}

fn default_cron_jobs() -> Vec<CronJob> {
    vec![CronJob {
        id: "expireTopTopic".to_string(),
        schedule: "*/1 * * * *".to_string(),
        state: "active".to_string(),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            topic_editable_minutes: default_topic_editable_minutes(),
            default_cron_posts: Vec::new(),
            default_cron_jobs: default_cron_jobs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read the config at `path`, writing the defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("forum-store")
            .join("config.toml")
    }
}
