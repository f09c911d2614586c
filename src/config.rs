use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Feed locations: a gviz `tqx=out:json` URL or a path to a CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub performance: String,
    pub visits_done: String,
    pub visits_scheduled: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    pub feeds: FeedConfig,
}

impl Config {
    pub fn template() -> Self {
        let sheet = "https://docs.google.com/spreadsheets/d/<sheet-id>/gviz/tq?tqx=out:json";
        Self {
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            feeds: FeedConfig {
                performance: sheet.to_string(),
                visits_done: format!("{sheet}&gid=<done-tab-gid>"),
                visits_scheduled: format!("{sheet}&gid=<scheduled-tab-gid>"),
            },
        }
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let var = |name: &str| {
            std::env::var(name).with_context(|| {
                format!("{name} must be set when no --config file is given")
            })
        };

        let request_timeout_secs = match std::env::var("FEED_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .context("FEED_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            request_timeout_secs,
            feeds: FeedConfig {
                performance: var("PERFORMANCE_FEED")?,
                visits_done: var("VISITS_DONE_FEED")?,
                visits_scheduled: var("VISITS_SCHEDULED_FEED")?,
            },
        })
    }

    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
