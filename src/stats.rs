use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ClassifiedEvent, Status};

pub const TOP_CATEGORY_LIMIT: usize = 5;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub ongoing_count: usize,
    pub upcoming_count: usize,
    pub completed_count: usize,
    pub excluded: usize,
    pub total_prize_pool: i64,
    pub avg_duration_days: f64,
    pub top_categories: Vec<CategoryCount>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct Buckets {
    pub ongoing: Vec<ClassifiedEvent>,
    pub upcoming: Vec<ClassifiedEvent>,
    pub completed: Vec<ClassifiedEvent>,
}

pub fn build_statistics(events: &[ClassifiedEvent]) -> Statistics {
    let count = |status: Status| events.iter().filter(|e| e.status == status).count();
    let total_duration: i64 = events.iter().map(|e| e.duration_days).sum();
    let avg_duration_days = if events.is_empty() {
        0.0
    } else {
        (total_duration as f64 / events.len() as f64 * 10.0).round() / 10.0
    };

    Statistics {
        total: events.len(),
        ongoing_count: count(Status::Ongoing),
        upcoming_count: count(Status::Upcoming),
        completed_count: count(Status::Completed),
        excluded: 0,
        total_prize_pool: events
            .iter()
            .map(|e| e.event.prize_amount)
            .fold(0i64, i64::saturating_add),
        avg_duration_days,
        top_categories: top_categories(events, TOP_CATEGORY_LIMIT),
    }
}

/// Most frequent tags by exact match, descending by count; ties keep the
/// order in which tags were first seen.
pub fn top_categories(events: &[ClassifiedEvent], limit: usize) -> Vec<CategoryCount> {
    let mut order: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tag in events.iter().flat_map(|e| e.event.tags.iter()) {
        match index.get(tag.as_str()) {
            Some(&slot) => order[slot].count += 1,
            None => {
                index.insert(tag.as_str(), order.len());
                order.push(CategoryCount {
                    name: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(limit);
    order
}

/// Splits classified events into status buckets, each in display order:
/// ongoing by end ascending, upcoming by (deadline, start), completed by end
/// descending.
pub fn into_buckets(events: Vec<ClassifiedEvent>) -> Buckets {
    let mut buckets = Buckets::default();
    for event in events {
        match event.status {
            Status::Ongoing => buckets.ongoing.push(event),
            Status::Upcoming => buckets.upcoming.push(event),
            Status::Completed => buckets.completed.push(event),
        }
    }

    buckets.ongoing.sort_by_key(|e| e.end);
    buckets.upcoming.sort_by_key(|e| (e.deadline, e.start));
    buckets.completed.sort_by(|a, b| b.end.cmp(&a.end));
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, parse_instant};
    use crate::models::Event;
    use crate::normalize::parse_prize_amount;

    fn classified(name: &str, start: &str, end: &str, deadline: &str) -> ClassifiedEvent {
        let event = Event {
            name: name.to_string(),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            registration_deadline: Some(deadline.to_string()),
            ..Event::default()
        };
        let reference =
            parse_instant("reference", Some("2025-10-02T04:00:00Z")).expect("reference");
        classify(event, reference).expect("classify fixture")
    }

    fn with_prize(mut item: ClassifiedEvent, prize: &str) -> ClassifiedEvent {
        item.event.prize_pool = Some(prize.to_string());
        item.event.prize_amount = parse_prize_amount(prize);
        item
    }

    fn with_tags(mut item: ClassifiedEvent, tags: &[&str]) -> ClassifiedEvent {
        item.event.tags = tags.iter().map(|t| t.to_string()).collect();
        item
    }

    #[test]
    fn sums_prize_pools() {
        let events = vec![
            with_prize(
                classified(
                    "A",
                    "2025-10-01T00:00:00Z",
                    "2025-10-31T23:59:59Z",
                    "2025-10-31T23:59:59Z",
                ),
                "$75,000",
            ),
            with_prize(
                classified(
                    "B",
                    "2025-09-28T00:00:00Z",
                    "2025-10-12T23:59:59Z",
                    "2025-10-10T23:59:59Z",
                ),
                "$100,000",
            ),
            with_prize(
                classified(
                    "C",
                    "2025-10-01T09:00:00Z",
                    "2025-10-08T21:00:00Z",
                    "2025-10-07T23:59:59Z",
                ),
                "$65,000",
            ),
        ];
        let stats = build_statistics(&events);
        assert_eq!(stats.total_prize_pool, 240_000);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.ongoing_count, 3);
        // durations 30, 14, 7
        assert_eq!(stats.avg_duration_days, 17.0);
    }

    #[test]
    fn huge_prize_pools_saturate_instead_of_overflowing() {
        let base = || {
            classified(
                "Whale",
                "2025-10-01T00:00:00Z",
                "2025-10-03T00:00:00Z",
                "2025-10-01T00:00:00Z",
            )
        };
        let events = vec![
            with_prize(base(), "$9,000,000,000,000,000,000"),
            with_prize(base(), "$9,000,000,000,000,000,000"),
        ];
        assert_eq!(events[0].event.prize_amount, 9_000_000_000_000_000_000);
        let stats = build_statistics(&events);
        assert_eq!(stats.total_prize_pool, i64::MAX);
    }

    #[test]
    fn empty_set_has_zeroed_statistics() {
        let stats = build_statistics(&[]);
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn top_categories_count_and_break_ties_by_first_seen() {
        let base = || {
            classified(
                "T",
                "2025-10-01T00:00:00Z",
                "2025-10-03T00:00:00Z",
                "2025-10-01T00:00:00Z",
            )
        };
        let events = vec![
            with_tags(base(), &["ai", "web"]),
            with_tags(base(), &["ai", "ml"]),
            with_tags(base(), &["ml", "ai", "AI"]),
            with_tags(base(), &["cloud", "rust", "go", "web"]),
        ];
        let top = top_categories(&events, 5);
        assert_eq!(
            top[0],
            CategoryCount {
                name: "ai".to_string(),
                count: 3
            }
        );
        let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ai", "web", "ml", "AI", "cloud"]);
    }

    #[test]
    fn buckets_are_sorted_per_status() {
        let events = vec![
            classified(
                "late-ongoing",
                "2025-10-01T00:00:00Z",
                "2025-10-31T00:00:00Z",
                "2025-10-01T00:00:00Z",
            ),
            classified(
                "early-ongoing",
                "2025-10-01T00:00:00Z",
                "2025-10-05T00:00:00Z",
                "2025-10-01T00:00:00Z",
            ),
            classified(
                "up-b",
                "2025-11-01T00:00:00Z",
                "2025-11-02T00:00:00Z",
                "2025-10-20T00:00:00Z",
            ),
            classified(
                "up-a2",
                "2025-10-25T00:00:00Z",
                "2025-10-26T00:00:00Z",
                "2025-10-10T00:00:00Z",
            ),
            classified(
                "up-a1",
                "2025-10-15T00:00:00Z",
                "2025-10-16T00:00:00Z",
                "2025-10-10T00:00:00Z",
            ),
            classified(
                "old",
                "2025-08-01T00:00:00Z",
                "2025-08-02T00:00:00Z",
                "2025-07-01T00:00:00Z",
            ),
            classified(
                "recent",
                "2025-09-20T00:00:00Z",
                "2025-09-21T00:00:00Z",
                "2025-09-01T00:00:00Z",
            ),
        ];
        let buckets = into_buckets(events);
        let names = |bucket: &[ClassifiedEvent]| {
            bucket
                .iter()
                .map(|e| e.event.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&buckets.ongoing), vec!["early-ongoing", "late-ongoing"]);
        assert_eq!(names(&buckets.upcoming), vec!["up-a1", "up-a2", "up-b"]);
        assert_eq!(names(&buckets.completed), vec!["recent", "old"]);
    }
}
