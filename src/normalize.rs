use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{Event, RawRecord};

pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static STRICT_ISO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid iso regex")
});
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal regex"));
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

// Tried in order; first match wins.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M",
    "%b %d, %Y %I:%M %p",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Coerces a raw source mapping into the canonical record. Missing or
/// mistyped fields become empty defaults; this never fails.
pub fn normalize_record(raw: &RawRecord) -> Event {
    let prize_pool = string_field(raw, &["prizePool", "prize_pool", "prize"]);
    let prize_amount = prize_pool.as_deref().map(parse_prize_amount).unwrap_or(0);
    let location = string_field(raw, &["location"]);
    let event_type = string_field(raw, &["type", "event_type"])
        .or_else(|| location.as_deref().and_then(infer_event_type));

    Event {
        name: string_field(raw, &["name", "title"]).unwrap_or_default(),
        description: string_field(raw, &["description"]),
        start_date: date_field(raw, &["start_date", "startDate"]),
        end_date: date_field(raw, &["end_date", "endDate"]),
        registration_deadline: date_field(raw, &["registration_deadline", "registrationDeadline"]),
        location,
        event_type,
        prize_pool,
        prize_amount,
        registration_link: string_field(raw, &["registration_link", "registrationLink"]),
        website_link: string_field(raw, &["website_link", "websiteLink", "url"]),
        organizer: string_field(raw, &["organizer"]),
        tags: tags_field(raw),
        source: string_field(raw, &["source"]).unwrap_or_default(),
        region: string_field(raw, &["region"]),
    }
}

/// Best-effort date parsing. Strict `YYYY-MM-DDTHH:MM:SSZ` input is returned
/// unchanged; other recognised forms are rewritten to that shape in UTC.
pub fn parse_date(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if STRICT_ISO_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(format_utc(dt.with_timezone(&Utc)));
    }

    let cleaned = ORDINAL_RE.replace_all(trimmed, "$1");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(format_utc(naive.and_utc()));
        }
    }
    for fmt in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| format_utc(naive.and_utc()));
        }
    }
    None
}

pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Integer amount from a display string such as `"$75,000"`: separators and
/// currency symbols are dropped and the longest digit run wins. Anything
/// unparseable is 0.
pub fn parse_prize_amount(text: &str) -> i64 {
    let stripped: String = text
        .chars()
        .filter(|ch| !matches!(ch, ',' | '$' | '₹' | '€' | '£'))
        .collect();
    let mut best: Option<&str> = None;
    for found in DIGIT_RUN_RE.find_iter(&stripped) {
        if best.map_or(true, |current| found.as_str().len() > current.len()) {
            best = Some(found.as_str());
        }
    }
    best.and_then(|digits| digits.parse::<i64>().ok()).unwrap_or(0)
}

pub fn infer_event_type(location: &str) -> Option<String> {
    let lower = location.to_lowercase();
    if lower.contains("hybrid") {
        Some("hybrid".to_string())
    } else if lower.contains("online") || lower.contains("virtual") || lower.contains("remote") {
        Some("online".to_string())
    } else {
        None
    }
}

fn string_field(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

fn date_field(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    let text = string_field(raw, keys)?;
    parse_date(&text).or(Some(text))
}

fn tags_field(raw: &RawRecord) -> Vec<String> {
    let value = match raw.get("tags").or_else(|| raw.get("themes")) {
        Some(value) => value,
        None => return Vec::new(),
    };
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}
