mod classify;
mod config;
mod identity;
mod merge;
pub mod models;
mod normalize;
mod output;
mod region;
pub mod scraping;
mod stats;
mod utils;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

pub use config::AppConfig;
pub use output::{Dataset, SourceSummary};

use models::{ClassifiedEvent, RawRecord};
use scraping::SourceOutcome;

/// Result of the pure part of a run: everything after fetching and before
/// writing files.
#[derive(Debug)]
pub struct Processed {
    pub events: Vec<ClassifiedEvent>,
    pub dropped_nameless: usize,
    pub excluded: usize,
}

/// Normalizes, flags, merges and classifies raw records given in source
/// priority order.
pub fn process_records(records: Vec<RawRecord>, reference: DateTime<Utc>) -> Processed {
    let mut dropped_nameless = 0;
    let normalized = records.iter().filter_map(|raw| {
        let mut event = normalize::normalize_record(raw);
        if event.name.is_empty() {
            dropped_nameless += 1;
            debug!("dropping record without a name from {:?}", event.source);
            return None;
        }
        region::mark_region(&mut event);
        Some(event)
    });
    let merged = merge::merge_records(normalized);
    debug!("{} records after merge", merged.len());

    let (events, rejected) = classify::classify_all(merged, reference);
    Processed {
        events,
        dropped_nameless,
        excluded: rejected.len(),
    }
}

/// Splits source outcomes into the concatenated records and a per-source
/// summary for the output document.
pub fn collect_outcomes(outcomes: Vec<SourceOutcome>) -> (Vec<RawRecord>, Vec<SourceSummary>) {
    let mut records = Vec::new();
    let mut summaries = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let summary = SourceSummary {
            source: outcome.source.clone(),
            records: outcome.records(),
            error: outcome.result.as_ref().err().cloned(),
        };
        if let Ok(mut batch) = outcome.result {
            records.append(&mut batch);
        }
        summaries.push(summary);
    }
    (records, summaries)
}

pub fn build_datasets(
    processed: Processed,
    reference: DateTime<Utc>,
    refresh: Duration,
    sources: Vec<SourceSummary>,
    with_india: bool,
) -> (Dataset, Option<Dataset>) {
    let india = with_india.then(|| {
        let subset = region::india_subset(&processed.events);
        Dataset::build(subset, 0, reference, refresh, sources.clone())
    });
    let main = Dataset::build(
        processed.events,
        processed.excluded,
        reference,
        refresh,
        sources,
    );
    (main, india)
}

fn execute(config: &AppConfig, root: &Path) -> Result<()> {
    let reference = config.reference_instant()?;
    info!("classifying against {}", normalize::format_utc(reference));

    let (records, sources) = collect_outcomes(scraping::run_all(config));
    let failed = sources.iter().filter(|s| s.error.is_some()).count();
    info!(
        "collected {} raw records from {} sources ({failed} failed)",
        records.len(),
        sources.len()
    );

    let processed = process_records(records, reference);
    if processed.dropped_nameless > 0 {
        warn!("dropped {} records without a name", processed.dropped_nameless);
    }
    let (main, india) = build_datasets(
        processed,
        reference,
        config.refresh_interval(),
        sources,
        config.india_subset,
    );

    let main_path = utils::dataset_path(root);
    let bytes = output::write_dataset(&main_path, &main)?;
    info!("wrote {} ({bytes} bytes)", main_path.display());
    if let Some(india) = india {
        let india_path = utils::india_dataset_path(root);
        output::write_dataset(&india_path, &india)?;
        info!(
            "wrote {} ({} events)",
            india_path.display(),
            india.statistics.total
        );
    }
    output::write_timestamp(&utils::timestamp_path(root), Utc::now())?;

    main.log_summary();
    Ok(())
}

/// Leaves a previously written dataset alone; otherwise writes an empty one so
/// consumers always find a valid document.
fn write_fallback(config: &AppConfig, root: &Path) -> Result<()> {
    let path = utils::dataset_path(root);
    if output::has_valid_dataset(&path) {
        warn!("keeping previous dataset at {}", path.display());
        return Ok(());
    }
    let reference = config.reference_instant().unwrap_or_else(|_| Utc::now());
    let empty = Dataset::empty(reference, config.refresh_interval());
    output::write_dataset(&path, &empty)
        .with_context(|| format!("failed to write fallback dataset {}", path.display()))?;
    warn!("wrote empty fallback dataset to {}", path.display());
    Ok(())
}

/// Runs the whole batch once with configuration from the working directory
/// and environment.
pub fn run() -> Result<()> {
    let config = AppConfig::load();
    run_with(&config)
}

pub fn run_with(config: &AppConfig) -> Result<()> {
    let root = config.output_dir.as_path();
    match execute(config, root) {
        Ok(()) => Ok(()),
        Err(err) => {
            error!("hackathon run failed: {err:#}");
            if let Err(fallback_err) = write_fallback(config, root) {
                error!("{fallback_err:#}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use serde_json::{json, Value};
    use std::fs;

    fn reference() -> DateTime<Utc> {
        classify::parse_instant("reference", Some("2025-10-02T04:00:00Z")).expect("reference")
    }

    fn record(value: Value) -> RawRecord {
        scraping::base::into_record(value)
    }

    fn curated() -> Vec<RawRecord> {
        serde_json::from_str(include_str!("scraping/curated_hackathons.json"))
            .expect("curated listings")
    }

    #[test]
    fn curated_listings_classify_for_october_second() {
        let processed = process_records(curated(), reference());
        assert_eq!(processed.excluded, 0);
        assert_eq!(processed.events.len(), 15);

        let status_of = |name: &str| {
            processed
                .events
                .iter()
                .find(|e| e.event.name == name)
                .map(|e| e.status)
        };
        assert_eq!(status_of("Hacktoberfest 2025"), Some(Status::Ongoing));
        assert_eq!(status_of("Intel AI Innovation Challenge"), Some(Status::Completed));
        assert_eq!(status_of("TechCrunch Disrupt Hackathon"), Some(Status::Upcoming));

        let (main, india) =
            build_datasets(processed, reference(), Duration::hours(6), Vec::new(), true);
        assert_eq!(main.statistics.ongoing_count, 3);
        assert_eq!(main.statistics.upcoming_count, 8);
        assert_eq!(main.statistics.completed_count, 4);
        assert_eq!(main.ongoing[0].event.name, "MongoDB Atlas Hackathon October");
        assert_eq!(main.completed[0].event.name, "DevPost Fall Global Championship 2025");
        assert_eq!(main.statistics.top_categories[0].name, "ai");
        assert_eq!(main.statistics.top_categories[0].count, 7);

        let india = india.expect("india subset");
        assert!(india
            .ongoing
            .iter()
            .chain(&india.upcoming)
            .chain(&india.completed)
            .all(|e| e.event.location.as_deref() == Some("Global/Virtual")));
        assert_eq!(india.statistics.total, 8);
    }

    #[test]
    fn duplicates_across_sources_collapse() {
        let records = vec![
            record(json!({
                "name": "Forty Two Hack",
                "start_date": "2025-10-10T00:00:00Z",
                "end_date": "2025-10-12T00:00:00Z",
                "registration_deadline": "2025-10-09T00:00:00Z",
                "registration_link": "https://x.com/e/42",
                "prizePool": "$5,000",
                "source": "Official",
            })),
            record(json!({
                "name": "42 Hack (listing)",
                "description": "Longer listing description from the scraper",
                "start_date": "Oct 10, 2025",
                "end_date": "Oct 12, 2025",
                "registration_link": "HTTP://WWW.X.COM/e/42/?utm=abc",
                "prizePool": "$10,000",
                "location": "Bengaluru, India",
                "source": "Devpost",
            })),
            record(json!({ "description": "no name at all" })),
        ];
        let processed = process_records(records, reference());
        assert_eq!(processed.dropped_nameless, 1);
        assert_eq!(processed.events.len(), 1);

        let merged = &processed.events[0].event;
        assert_eq!(merged.name, "Forty Two Hack");
        assert_eq!(merged.source, "Official");
        assert_eq!(merged.prize_pool.as_deref(), Some("$10,000"));
        assert_eq!(merged.prize_amount, 10_000);
        assert_eq!(
            merged.description.as_deref(),
            Some("Longer listing description from the scraper")
        );
        assert_eq!(merged.region.as_deref(), Some("India"));
    }

    #[test]
    fn unclassifiable_records_are_counted_not_bucketed() {
        let records = vec![record(json!({
            "name": "Someday Hack",
            "start_date": "soon",
            "end_date": "later",
            "registration_deadline": "2025-10-01T00:00:00Z",
        }))];
        let processed = process_records(records, reference());
        assert!(processed.events.is_empty());
        assert_eq!(processed.excluded, 1);
    }

    #[test]
    fn absurd_prize_amounts_do_not_abort_the_batch() {
        let whale = |link: &str| {
            record(json!({
                "name": format!("Whale Hack {link}"),
                "start_date": "2025-10-01T00:00:00Z",
                "end_date": "2025-10-05T00:00:00Z",
                "registration_deadline": "2025-10-01T00:00:00Z",
                "registration_link": link,
                "prizePool": "$9,000,000,000,000,000,000",
            }))
        };
        let records = vec![whale("https://a.dev"), whale("https://b.dev")];
        let processed = process_records(records, reference());
        let (main, _) =
            build_datasets(processed, reference(), Duration::hours(6), Vec::new(), false);
        assert_eq!(main.statistics.ongoing_count, 2);
        assert_eq!(main.statistics.total_prize_pool, i64::MAX);
    }

    #[test]
    fn failed_sources_are_summarized_and_skipped() {
        let outcomes = vec![
            SourceOutcome {
                source: "curated".to_string(),
                result: Ok(vec![record(json!({ "name": "A" }))]),
            },
            SourceOutcome {
                source: "mlh".to_string(),
                result: Err("non-success status".to_string()),
            },
        ];
        let (records, summaries) = collect_outcomes(outcomes);
        assert_eq!(records.len(), 1);
        assert_eq!(summaries[0].records, 1);
        assert_eq!(summaries[0].error, None);
        assert_eq!(summaries[1].records, 0);
        assert_eq!(summaries[1].error.as_deref(), Some("non-success status"));
    }

    #[test]
    fn failed_run_still_leaves_a_valid_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            output_dir: dir.path().join("data"),
            reference_time: Some("not a timestamp".to_string()),
            ..AppConfig::default()
        };
        assert!(run_with(&config).is_err());

        let contents = fs::read_to_string(utils::dataset_path(&config.output_dir))
            .expect("fallback dataset");
        let value: Value = serde_json::from_str(&contents).expect("valid json");
        assert_eq!(value["statistics"]["total"], 0);
        assert_eq!(value["ongoing"], json!([]));
    }

    #[test]
    fn oversized_refresh_interval_still_writes_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            reference_time: Some("2025-10-02T04:00:00Z".to_string()),
            refresh_interval_hours: 1_000_000_000_000,
            source_delay_ms: 0,
            disabled_sources: vec!["devpost".to_string(), "mlh".to_string()],
            ..AppConfig::default()
        };
        run_with(&config).expect("run with clamped refresh");

        let main: Value = serde_json::from_str(
            &fs::read_to_string(utils::dataset_path(dir.path())).expect("main dataset"),
        )
        .expect("main json");
        assert_eq!(main["update_info"]["next_update"], "2025-10-02T10:00:00Z");
    }

    #[test]
    fn offline_run_writes_all_outputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            output_dir: dir.path().to_path_buf(),
            reference_time: Some("2025-10-02T04:00:00Z".to_string()),
            source_delay_ms: 0,
            disabled_sources: vec!["devpost".to_string(), "mlh".to_string()],
            ..AppConfig::default()
        };
        run_with(&config).expect("offline run");

        let main: Value = serde_json::from_str(
            &fs::read_to_string(utils::dataset_path(dir.path())).expect("main dataset"),
        )
        .expect("main json");
        assert_eq!(main["statistics"]["total"], 15);
        assert_eq!(main["update_info"]["next_update"], "2025-10-02T10:00:00Z");
        assert_eq!(main["sources"][0]["source"], "curated");
        assert!(utils::india_dataset_path(dir.path()).exists());
        assert!(utils::timestamp_path(dir.path()).exists());
    }
}
