pub mod base;
pub mod curated;
pub mod devpost_json;
pub mod mlh_html;

use std::{thread, time::Duration};

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::RawRecord;

pub trait HackathonSource: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn source_name(&self) -> &'static str;
    fn source_url(&self) -> &'static str;
    /// `client` is `None` when no HTTP client could be built; sources that
    /// need the network fail, bundled ones still load.
    fn fetch(&self, client: Option<&Client>) -> anyhow::Result<Vec<RawRecord>>;
}

/// What one source contributed to a run.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub result: Result<Vec<RawRecord>, String>,
}

impl SourceOutcome {
    pub fn records(&self) -> usize {
        self.result.as_ref().map_or(0, Vec::len)
    }
}

/// Sources in merge priority order; earlier sources win sticky fields.
fn active_sources(config: &AppConfig) -> Vec<Box<dyn HackathonSource>> {
    let all: Vec<Box<dyn HackathonSource>> = vec![
        Box::new(curated::Curated),
        Box::new(devpost_json::Devpost),
        Box::new(mlh_html::Mlh),
    ];
    all.into_iter()
        .filter(|source| config.is_enabled(source.source_id()))
        .collect()
}

/// Queries every enabled source in order. A failing source is logged and
/// contributes nothing; it never stops the others.
pub fn run_all(config: &AppConfig) -> Vec<SourceOutcome> {
    let client = match base::http_client(config) {
        Ok(client) => Some(client),
        Err(err) => {
            warn!("http client unavailable, network sources will fail: {err:#}");
            None
        }
    };
    let delay = Duration::from_millis(config.source_delay_ms);
    run_sources(&active_sources(config), client.as_ref(), delay)
}

fn run_sources(
    sources: &[Box<dyn HackathonSource>],
    client: Option<&Client>,
    delay: Duration,
) -> Vec<SourceOutcome> {
    let mut outcomes = Vec::with_capacity(sources.len());
    for (position, source) in sources.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        outcomes.push(SourceOutcome {
            source: source.source_id().to_string(),
            result: run_source(source.as_ref(), client),
        });
    }
    outcomes
}

fn run_source(
    source: &dyn HackathonSource,
    client: Option<&Client>,
) -> Result<Vec<RawRecord>, String> {
    info!("fetching {} ({})", source.source_name(), source.source_url());
    match source.fetch(client) {
        Ok(mut records) => {
            for record in records.iter_mut() {
                tag_source(record, source.source_name());
            }
            info!("{}: {} records", source.source_id(), records.len());
            Ok(records)
        }
        Err(err) => {
            warn!("{} failed: {err:#}", source.source_id());
            Err(format!("{err:#}"))
        }
    }
}

/// Stamps provenance unless the adapter already supplied a `source`.
fn tag_source(record: &mut RawRecord, source_name: &str) {
    let missing = match record.get("source") {
        Some(Value::String(text)) => text.trim().is_empty(),
        _ => true,
    };
    if missing {
        record.insert("source".to_string(), Value::String(source_name.to_string()));
    }
}
