use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ClassifiedEvent, Event};

pub const INDIA_REGION: &str = "India";

static INDIA_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(india|indian|bharat|bangalore|bengaluru|mumbai|delhi|new delhi|hyderabad|chennai|pune|kolkata|ahmedabad|jaipur|kochi|noida|gurgaon|gurugram|chandigarh|indore|bhubaneswar|iit|iiit|nit|devfolio|unstop|hackerearth|inr)\b",
    )
    .expect("valid india terms regex")
});

static GLOBAL_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(global|virtual|online)\b").expect("valid global regex"));

/// True when location, name, description, organizer or a tag mentions an
/// India-associated term.
pub fn mentions_india(event: &Event) -> bool {
    let texts = [
        Some(event.name.as_str()),
        event.location.as_deref(),
        event.description.as_deref(),
        event.organizer.as_deref(),
        event.prize_pool.as_deref(),
    ];
    texts
        .into_iter()
        .flatten()
        .any(|text| text.contains('₹') || INDIA_TERMS_RE.is_match(text))
        || event.tags.iter().any(|tag| INDIA_TERMS_RE.is_match(tag))
}

/// Sets `region` when the record itself points at India. Region-agnostic
/// events are left unflagged.
pub fn mark_region(event: &mut Event) {
    if event.region.is_none() && mentions_india(event) {
        event.region = Some(INDIA_REGION.to_string());
    }
}

/// Membership in the India subset: flagged, mentions India, or located
/// somewhere global/virtual/online.
pub fn is_india_relevant(event: &Event) -> bool {
    let flagged = event
        .region
        .as_deref()
        .is_some_and(|region| region.eq_ignore_ascii_case(INDIA_REGION));
    let global = event
        .location
        .as_deref()
        .is_some_and(|location| GLOBAL_MARKER_RE.is_match(location));
    flagged || global || mentions_india(event)
}

pub fn india_subset(events: &[ClassifiedEvent]) -> Vec<ClassifiedEvent> {
    events
        .iter()
        .filter(|item| is_india_relevant(&item.event))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(name: &str, location: &str) -> Event {
        Event {
            name: name.to_string(),
            location: Some(location.to_string()),
            ..Event::default()
        }
    }

    #[test]
    fn flags_indian_cities() {
        let mut event = located("Smart India Hack", "Bengaluru, KA");
        mark_region(&mut event);
        assert_eq!(event.region.as_deref(), Some("India"));
        assert!(is_india_relevant(&event));
    }

    #[test]
    fn rupee_prize_counts_as_india() {
        let mut event = located("Prize Hack", "TBA");
        event.prize_pool = Some("₹1,00,000".to_string());
        assert!(mentions_india(&event));
    }

    #[test]
    fn virtual_events_join_subset_without_flag() {
        let mut event = located("Cloud Jam", "Global/Virtual");
        mark_region(&mut event);
        assert_eq!(event.region, None);
        assert!(is_india_relevant(&event));
    }

    #[test]
    fn unrelated_in_person_events_are_excluded() {
        let mut event = located("Community Summit Hack", "Miami, FL");
        event.tags = vec!["unity".to_string(), "submit".to_string()];
        mark_region(&mut event);
        assert_eq!(event.region, None);
        assert!(!is_india_relevant(&event));
    }
}
