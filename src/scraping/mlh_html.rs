use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde_json::json;

use super::base;
use super::HackathonSource;
use crate::models::RawRecord;

const URL: &str = "https://mlh.io/seasons/2026/events";
const SOURCE_ID: &str = "mlh";
const SOURCE_NAME: &str = "MLH";
const ORGANIZER: &str = "Major League Hacking";

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.event-wrapper").expect("mlh card selector"));
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-name").expect("mlh name selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.event-link").expect("mlh link selector"));
static START_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[itemprop='startDate']").expect("mlh start selector"));
static END_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[itemprop='endDate']").expect("mlh end selector"));
static CITY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemprop='city']").expect("mlh city selector"));
static STATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemprop='state']").expect("mlh state selector"));
static HYBRID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-hybrid-notes").expect("mlh hybrid selector"));

pub struct Mlh;

impl HackathonSource for Mlh {
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
        let html = base::fetch_text(base::require_client(client)?, URL)?;
        self.parse_document(&html)
    }
}

impl Mlh {
    pub(crate) fn parse_document(&self, html: &str) -> Result<Vec<RawRecord>> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let name = match base::first_text(&card, &NAME_SELECTOR) {
                Some(text) => text,
                None => continue,
            };
            let start = base::first_attr(&card, &START_SELECTOR, "content");
            // the listing gives whole days; the event runs through its last one
            let end = base::first_attr(&card, &END_SELECTOR, "content")
                .map(|date| format!("{date} 23:59:59"));
            let link = base::absolute_url(URL, base::first_attr(&card, &LINK_SELECTOR, "href"));

            let location = [
                base::first_text(&card, &CITY_SELECTOR),
                base::first_text(&card, &STATE_SELECTOR),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
            let notes = base::first_text(&card, &HYBRID_SELECTOR);
            let event_type = notes.as_deref().and_then(event_type_from_notes);

            records.push(base::into_record(json!({
                "name": name,
                "start_date": start,
                "end_date": end,
                "registration_deadline": start,
                "location": location,
                "type": event_type,
                "registration_link": link,
                "website_link": link,
                "organizer": ORGANIZER,
                "tags": ["mlh", "student"],
                "source": SOURCE_NAME,
            })));
        }

        base::fail_if_empty(SOURCE_ID, records)
    }
}

fn event_type_from_notes(notes: &str) -> Option<&'static str> {
    let lower = notes.to_lowercase();
    if lower.contains("hybrid") {
        Some("hybrid")
    } else if lower.contains("digital") || lower.contains("online") {
        Some("online")
    } else if lower.contains("in-person") || lower.contains("in person") {
        Some("in-person")
    } else {
        None
    }
}
