use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::base;
use super::HackathonSource;
use crate::models::RawRecord;

const URL: &str = "https://devpost.com/api/hackathons?status[]=upcoming&status[]=open";
const SOURCE_ID: &str = "devpost";
const SOURCE_NAME: &str = "Devpost";

// "Sep 10 - Oct 15, 2025", "Oct 01 - 15, 2025", "Dec 20, 2025 - Jan 05, 2026"
static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([A-Za-z]{3,9})\s+(\d{1,2})(?:,\s*(\d{4}))?\s*-\s*(?:([A-Za-z]{3,9})\s+)?(\d{1,2}),\s*(\d{4})$",
    )
    .expect("devpost period regex")
});

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    hackathons: Vec<HackathonDoc>,
}

#[derive(Debug, Deserialize)]
struct HackathonDoc {
    title: Option<String>,
    url: Option<String>,
    submission_period_dates: Option<String>,
    prize_amount: Option<String>,
    #[serde(default)]
    themes: Vec<ThemeDoc>,
    displayed_location: Option<LocationDoc>,
    organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThemeDoc {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LocationDoc {
    location: Option<String>,
}

pub struct Devpost;

impl HackathonSource for Devpost {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn fetch(&self, client: Option<&Client>) -> Result<Vec<RawRecord>> {
        let body = base::fetch_text(base::require_client(client)?, URL)?;
        self.parse_listing(&body)
    }
}

impl Devpost {
    pub(crate) fn parse_listing(&self, body: &str) -> Result<Vec<RawRecord>> {
        let listing: ListingResponse = base::parse_json(body, SOURCE_ID)?;
        let mut records = Vec::with_capacity(listing.hackathons.len());

        for doc in listing.hackathons {
            let period = doc.submission_period_dates.as_deref().and_then(split_period);
            let (start, end) =
                period.unwrap_or_else(|| (None, doc.submission_period_dates.clone()));
            let prize = doc
                .prize_amount
                .as_deref()
                .map(base::fragment_text)
                .filter(|text| !text.is_empty());
            let tags: Vec<String> = doc.themes.into_iter().map(|theme| theme.name).collect();
            let location = doc.displayed_location.and_then(|loc| loc.location);

            // Submissions close at the end of the period.
            records.push(base::into_record(json!({
                "name": doc.title,
                "start_date": start,
                "end_date": end,
                "registration_deadline": end,
                "location": location,
                "prizePool": prize,
                "registration_link": doc.url,
                "website_link": doc.url,
                "organizer": doc.organization_name,
                "tags": tags,
                "source": SOURCE_NAME,
            })));
        }

        base::fail_if_empty(SOURCE_ID, records)
    }
}

/// Splits a submission period into `"Mon DD, YYYY"` start and end strings.
fn split_period(text: &str) -> Option<(Option<String>, Option<String>)> {
    let caps = PERIOD_RE.captures(text.trim())?;
    let start_month = caps.get(1)?.as_str();
    let start_day = caps.get(2)?.as_str();
    let end_year = caps.get(6)?.as_str();
    let start_year = caps.get(3).map_or(end_year, |m| m.as_str());
    let end_month = caps.get(4).map_or(start_month, |m| m.as_str());
    let end_day = caps.get(5)?.as_str();
    Some((
        Some(format!("{start_month} {start_day}, {start_year}")),
        Some(format!("{end_month} {end_day}, {end_year}")),
    ))
}
