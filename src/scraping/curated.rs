use anyhow::Result;
use reqwest::blocking::Client;

use super::base;
use super::HackathonSource;
use crate::models::RawRecord;

const SOURCE_ID: &str = "curated";
const SOURCE_NAME: &str = "Curated";
const LISTINGS: &str = include_str!("curated_hackathons.json");

/// Hand-maintained listings bundled into the binary.
pub struct Curated;

impl HackathonSource for Curated {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn source_url(&self) -> &'static str {
        "bundled:curated_hackathons.json"
    }

    fn fetch(&self, _client: Option<&Client>) -> Result<Vec<RawRecord>> {
        let records: Vec<RawRecord> = base::parse_json(LISTINGS, SOURCE_ID)?;
        base::fail_if_empty(SOURCE_ID, records)
    }
}
