use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::identity::identity_key;
use crate::models::Event;
use crate::normalize::parse_prize_amount;

// Letters may not touch the code, digits may: "USD10,000" and "10000INR" count.
static CURRENCY_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:usd|inr)(?:[^a-z]|$)").expect("valid currency regex")
});

/// Folds records (in source-arrival order) into one record per identity key.
/// Output keeps the order in which each key was first seen.
pub fn merge_records<I>(records: I) -> Vec<Event>
where
    I: IntoIterator<Item = Event>,
{
    let mut merged: Vec<Event> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = identity_key(&record);
        match index.get(&key) {
            Some(&slot) => {
                debug!(key = %key, source = %record.source, "merging duplicate record");
                merge_into(&mut merged[slot], record);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// Canonical fields are sticky once set, except `description` (longer wins)
/// and `prize_pool` (see [`prefer_incoming_prize`]).
pub fn merge_into(canonical: &mut Event, incoming: Event) {
    let Event {
        name,
        description,
        start_date,
        end_date,
        registration_deadline,
        location,
        event_type,
        prize_pool,
        prize_amount: _,
        registration_link,
        website_link,
        organizer,
        tags,
        source,
        region,
    } = incoming;

    if canonical.name.is_empty() {
        canonical.name = name;
    }
    if canonical.source.is_empty() {
        canonical.source = source;
    }
    if canonical.tags.is_empty() {
        canonical.tags = tags;
    }
    fill(&mut canonical.start_date, start_date);
    fill(&mut canonical.end_date, end_date);
    fill(&mut canonical.registration_deadline, registration_deadline);
    fill(&mut canonical.location, location);
    fill(&mut canonical.event_type, event_type);
    fill(&mut canonical.registration_link, registration_link);
    fill(&mut canonical.website_link, website_link);
    fill(&mut canonical.organizer, organizer);
    fill(&mut canonical.region, region);

    if char_len(&description) > char_len(&canonical.description) {
        canonical.description = description;
    }

    if prefer_incoming_prize(canonical.prize_pool.as_deref(), prize_pool.as_deref()) {
        canonical.prize_pool = prize_pool;
        canonical.prize_amount = canonical
            .prize_pool
            .as_deref()
            .map(parse_prize_amount)
            .unwrap_or(0);
    }
}

/// Incoming prize text wins when the canonical one is empty, when only the
/// incoming one carries a currency marker, or when both do and the incoming
/// amount is strictly larger.
pub fn prefer_incoming_prize(current: Option<&str>, incoming: Option<&str>) -> bool {
    match (current, incoming) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(current), Some(incoming)) => {
            match (has_currency_marker(current), has_currency_marker(incoming)) {
                (false, true) => true,
                (true, true) => parse_prize_amount(incoming) > parse_prize_amount(current),
                _ => false,
            }
        }
    }
}

pub fn has_currency_marker(text: &str) -> bool {
    text.contains('$') || text.contains('₹') || CURRENCY_TOKEN_RE.is_match(text)
}

fn fill(slot: &mut Option<String>, incoming: Option<String>) {
    if slot.as_deref().map_or(true, str::is_empty) {
        if let Some(value) = incoming.filter(|value| !value.is_empty()) {
            *slot = Some(value);
        }
    }
}

fn char_len(text: &Option<String>) -> usize {
    text.as_deref().map_or(0, |t| t.chars().count())
}
