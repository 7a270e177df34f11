use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::models::{
    ClassifiedEvent, CompletionStatus, Event, RegistrationStatus, RegistrationUrgency, Status,
    Urgency,
};

const RECENTLY_ENDED_DAYS: i64 = 7;
const STARTING_SOON_DAYS: i64 = 7;
const THIS_MONTH_DAYS: i64 = 30;
const URGENT_REGISTRATION_DAYS: i64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("{field} is missing")]
    MissingDate { field: &'static str },
    #[error("{field} is not a valid instant: {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("start {start} is after end {end}")]
    InvertedRange { start: String, end: String },
}

pub fn parse_instant(
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<Utc>, ClassifyError> {
    let value = value.ok_or(ClassifyError::MissingDate { field })?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ClassifyError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Status is decided from start/end against `reference` alone; registration
/// fields are derived independently of it.
pub fn classify(
    event: Event,
    reference: DateTime<Utc>,
) -> Result<ClassifiedEvent, ClassifyError> {
    let start = parse_instant("start_date", event.start_date.as_deref())?;
    let end = parse_instant("end_date", event.end_date.as_deref())?;
    let deadline = parse_instant(
        "registration_deadline",
        event.registration_deadline.as_deref(),
    )?;
    if start > end {
        return Err(ClassifyError::InvertedRange {
            start: event.start_date.clone().unwrap_or_default(),
            end: event.end_date.clone().unwrap_or_default(),
        });
    }

    let mut classified = ClassifiedEvent {
        event,
        status: Status::Upcoming,
        duration_days: (end - start).num_days(),
        days_remaining: None,
        hours_remaining: None,
        progress_percentage: None,
        urgency: None,
        days_passed: None,
        completion_status: None,
        registration_status: RegistrationStatus::Closed,
        registration_days_remaining: None,
        registration_hours_remaining: None,
        registration_urgency: None,
        start,
        end,
        deadline,
    };

    if end < reference {
        let days_passed = (reference - end).num_days();
        classified.status = Status::Completed;
        classified.days_passed = Some(days_passed);
        classified.completion_status = Some(if days_passed <= RECENTLY_ENDED_DAYS {
            CompletionStatus::RecentlyEnded
        } else {
            CompletionStatus::Ended
        });
    } else {
        let remaining = end - reference;
        classified.days_remaining = Some(remaining.num_days());
        classified.hours_remaining = Some(remaining.num_hours());

        if start <= reference {
            classified.status = Status::Ongoing;
            classified.progress_percentage = Some(progress_percentage(start, end, reference));
        } else {
            let days_until_start = (start - reference).num_days();
            classified.status = Status::Upcoming;
            classified.urgency = Some(if days_until_start <= STARTING_SOON_DAYS {
                Urgency::StartingSoon
            } else if days_until_start <= THIS_MONTH_DAYS {
                Urgency::ThisMonth
            } else {
                Urgency::Future
            });
        }
    }

    if reference < deadline {
        let remaining = deadline - reference;
        classified.registration_status = RegistrationStatus::Open;
        classified.registration_days_remaining = Some(remaining.num_days());
        classified.registration_hours_remaining = Some(remaining.num_hours());
        classified.registration_urgency =
            Some(if remaining.num_days() <= URGENT_REGISTRATION_DAYS {
                RegistrationUrgency::Urgent
            } else {
                RegistrationUrgency::Normal
            });
    }

    Ok(classified)
}

/// Truncated (floor) percentage of the interval already elapsed, clamped to
/// 0..=100. A zero-length interval counts as complete.
pub fn progress_percentage(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    reference: DateTime<Utc>,
) -> i64 {
    let total = (end - start).num_seconds();
    if total <= 0 {
        return 100;
    }
    let elapsed = (reference - start).num_seconds();
    (elapsed * 100 / total).clamp(0, 100)
}

/// Classifies every record; records that cannot be classified are returned
/// alongside their error instead of being given a default status.
pub fn classify_all(
    events: Vec<Event>,
    reference: DateTime<Utc>,
) -> (Vec<ClassifiedEvent>, Vec<(String, ClassifyError)>) {
    let mut classified = Vec::with_capacity(events.len());
    let mut rejected = Vec::new();

    for event in events {
        let name = event.title().to_string();
        match classify(event, reference) {
            Ok(item) => classified.push(item),
            Err(err) => {
                warn!(event = %name, "excluding unclassifiable event: {err}");
                rejected.push((name, err));
            }
        }
    }

    (classified, rejected)
}
