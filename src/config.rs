use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CONFIG_FILE: &str = "tracker.json";
pub const DEFAULT_REFRESH_HOURS: i64 = 6;
/// One year; anything longer is treated as a typo.
pub const MAX_REFRESH_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    /// Fixed classification instant; `None` means "now".
    pub reference_time: Option<String>,
    pub refresh_interval_hours: i64,
    pub source_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub india_subset: bool,
    pub disabled_sources: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            reference_time: None,
            refresh_interval_hours: DEFAULT_REFRESH_HOURS,
            source_delay_ms: 1000,
            request_timeout_secs: 20,
            user_agent: format!("HackathonTracker/{}", env!("CARGO_PKG_VERSION")),
            india_subset: true,
            disabled_sources: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads `tracker.json` (or `$TRACKER_CONFIG`) when present, then applies
    /// `TRACKER_*` environment overrides. Never fails; a broken file falls back
    /// to defaults.
    pub fn load() -> Self {
        let path = std::env::var("TRACKER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let mut config = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("ignoring config file {}: {err}", path.display());
                AppConfig::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TRACKER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(reference) = lookup("TRACKER_REFERENCE_TIME") {
            self.reference_time = Some(reference);
        }
        if let Some(hours) = lookup("TRACKER_REFRESH_HOURS").and_then(|s| s.parse().ok()) {
            if valid_refresh_hours(hours) {
                self.refresh_interval_hours = hours;
            } else {
                warn!("ignoring TRACKER_REFRESH_HOURS={hours}: expected 1..={MAX_REFRESH_HOURS}");
            }
        }
        if let Some(delay) = lookup("TRACKER_SOURCE_DELAY_MS").and_then(|s| s.parse().ok()) {
            self.source_delay_ms = delay;
        }
        if let Some(timeout) = lookup("TRACKER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.request_timeout_secs = timeout;
        }
        if let Some(agent) = lookup("TRACKER_USER_AGENT") {
            self.user_agent = agent;
        }
        if let Some(disabled) = lookup("TRACKER_DISABLED_SOURCES") {
            self.disabled_sources = disabled
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
        }
    }

    pub fn reference_instant(&self) -> anyhow::Result<DateTime<Utc>> {
        match self.reference_time.as_deref() {
            None => Ok(Utc::now()),
            Some(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("invalid reference time {text:?}")),
        }
    }

    /// Configured refresh interval, or the default when the configured hours
    /// are non-positive or longer than [`MAX_REFRESH_HOURS`].
    pub fn refresh_interval(&self) -> Duration {
        let hours = if valid_refresh_hours(self.refresh_interval_hours) {
            self.refresh_interval_hours
        } else {
            warn!(
                "refresh interval of {} hours out of range, using {DEFAULT_REFRESH_HOURS}",
                self.refresh_interval_hours
            );
            DEFAULT_REFRESH_HOURS
        };
        Duration::hours(hours)
    }

    pub fn is_enabled(&self, source_id: &str) -> bool {
        !self
            .disabled_sources
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(source_id))
    }
}

fn valid_refresh_hours(hours: i64) -> bool {
    (1..=MAX_REFRESH_HOURS).contains(&hours)
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
