use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name -> value mapping as produced by a source adapter.
pub type RawRecord = Map<String, Value>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<String>, // ISO-8601 UTC when parseable, raw text otherwise
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(rename = "prizePool")]
    pub prize_pool: Option<String>,
    pub prize_amount: i64,
    pub registration_link: Option<String>,
    pub website_link: Option<String>,
    pub organizer: Option<String>,
    pub tags: Vec<String>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ongoing,
    Upcoming,
    Completed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    StartingSoon,
    ThisMonth,
    Future,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    RecentlyEnded,
    Ended,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Open,
    Closed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationUrgency {
    Urgent,
    Normal,
}

/// An event plus everything the classifier derives from the reference instant.
#[derive(Serialize, Clone, Debug)]
pub struct ClassifiedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub status: Status,
    pub duration_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_passed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<CompletionStatus>,
    pub registration_status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_hours_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_urgency: Option<RegistrationUrgency>,
    #[serde(skip)]
    pub start: DateTime<Utc>,
    #[serde(skip)]
    pub end: DateTime<Utc>,
    #[serde(skip)]
    pub deadline: DateTime<Utc>,
}

impl Event {
    pub fn title(&self) -> &str {
        if self.name.is_empty() {
            "Untitled Hackathon"
        } else {
            &self.name
        }
    }
}
