use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{ClassifiedEvent, RegistrationStatus};
use crate::normalize::format_utc;
use crate::stats::{build_statistics, into_buckets, Statistics};
use crate::utils;

const DISPLAY_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const SUMMARY_PREVIEW: usize = 3;

#[derive(Serialize, Debug)]
pub struct Dataset {
    pub ongoing: Vec<ClassifiedEvent>,
    pub upcoming: Vec<ClassifiedEvent>,
    pub completed: Vec<ClassifiedEvent>,
    pub statistics: Statistics,
    pub last_updated: String,
    pub update_info: UpdateInfo,
    pub sources: Vec<SourceSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UpdateInfo {
    pub timezone: String,
    pub current_date: String,
    pub next_update: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub source: String,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateInfo {
    /// `next_update` is `reference + refresh`; an interval that would leave
    /// the representable range collapses to `reference`.
    pub fn new(reference: DateTime<Utc>, refresh: Duration) -> Self {
        let next = reference.checked_add_signed(refresh).unwrap_or_else(|| {
            warn!("refresh interval {refresh} overflows, next update set to now");
            reference
        });
        Self {
            timezone: "UTC".to_string(),
            current_date: reference.format(DISPLAY_FORMAT).to_string(),
            next_update: format_utc(next),
        }
    }
}

impl Dataset {
    pub fn build(
        events: Vec<ClassifiedEvent>,
        excluded: usize,
        reference: DateTime<Utc>,
        refresh: Duration,
        sources: Vec<SourceSummary>,
    ) -> Self {
        let mut statistics = build_statistics(&events);
        statistics.excluded = excluded;
        let buckets = into_buckets(events);

        Self {
            ongoing: buckets.ongoing,
            upcoming: buckets.upcoming,
            completed: buckets.completed,
            statistics,
            last_updated: format_utc(reference),
            update_info: UpdateInfo::new(reference, refresh),
            sources,
        }
    }

    /// Minimal valid document written when a run cannot complete.
    pub fn empty(reference: DateTime<Utc>, refresh: Duration) -> Self {
        Self::build(Vec::new(), 0, reference, refresh, Vec::new())
    }

    pub fn log_summary(&self) {
        let stats = &self.statistics;
        info!("ongoing hackathons: {}", stats.ongoing_count);
        for item in self.ongoing.iter().take(SUMMARY_PREVIEW) {
            info!(
                "  {} ({} days left)",
                item.event.title(),
                item.days_remaining.unwrap_or(0)
            );
        }
        info!("upcoming hackathons: {}", stats.upcoming_count);
        for item in self.upcoming.iter().take(SUMMARY_PREVIEW) {
            let registration = match item.registration_status {
                RegistrationStatus::Open => "registration open",
                RegistrationStatus::Closed => "registration closed",
            };
            info!("  {} - {registration}", item.event.title());
        }
        info!("completed hackathons: {}", stats.completed_count);
        for item in self.completed.iter().take(SUMMARY_PREVIEW) {
            info!(
                "  {} (ended {} days ago)",
                item.event.title(),
                item.days_passed.unwrap_or(0)
            );
        }
        info!("total prize pool: {}", stats.total_prize_pool);
        info!("average duration: {} days", stats.avg_duration_days);
        for category in &stats.top_categories {
            info!("  category {}: {} hackathons", category.name, category.count);
        }
        if stats.excluded > 0 {
            info!("excluded (unclassifiable): {}", stats.excluded);
        }
        info!("next update: {}", self.update_info.next_update);
    }
}

/// Writes pretty JSON via a sibling temp file and rename, so readers never
/// observe a half-written document.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<usize> {
    utils::ensure_parent(path)?;
    let contents =
        serde_json::to_string_pretty(dataset).context("failed to serialize dataset")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &contents).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move dataset into {}", path.display()))?;
    Ok(contents.len())
}

pub fn write_timestamp(path: &Path, instant: DateTime<Utc>) -> Result<()> {
    utils::ensure_parent(path)?;
    fs::write(path, format_utc(instant))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// True when `path` holds a dataset document: an object with a `statistics`
/// object and the three bucket arrays.
pub fn has_valid_dataset(path: &Path) -> bool {
    let value = match fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<Value>(&contents).ok())
    {
        Some(value) => value,
        None => return false,
    };
    value.get("statistics").is_some_and(Value::is_object)
        && ["ongoing", "upcoming", "completed"]
            .iter()
            .all(|bucket| value.get(*bucket).is_some_and(Value::is_array))
}
