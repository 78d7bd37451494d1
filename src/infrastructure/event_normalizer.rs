use crate::domain::models::{
    parse_hhmm, parse_weekday, Event, EventKind, EventOrigin, RecurringMeetingRule,
};
use crate::infrastructure::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const TASK_ID_PREFIX: &str = "task-";
pub const TEAM_ID_PREFIX: &str = "team-";
pub const STUDY_ID_PREFIX: &str = "study-";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawMeeting {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPersonalEvent {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub cleared: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawMeetingSchedule {
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub meetings: Vec<RawMeeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<RawMeetingSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawStudyGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub meetings: Vec<RawMeeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<RawMeetingSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    #[serde(default)]
    pub tasks: Vec<RawTask>,
    #[serde(default)]
    pub events: Vec<RawPersonalEvent>,
    #[serde(default)]
    pub teams: Vec<RawTeam>,
    #[serde(default)]
    pub study_groups: Vec<RawStudyGroup>,
}

/// Task deadlines collapse to a zero-length interval on the due date.
pub fn normalize_task(raw: &RawTask) -> Result<Event, CoreError> {
    let due = parse_instant(raw.due_date.as_deref(), "dueDate")?;
    Ok(Event {
        id: format!("{TASK_ID_PREFIX}{}", raw.id),
        title: required_title(raw.title.as_deref())?,
        description: normalized_text(raw.description.as_deref()),
        start_at: due,
        end_at: due,
        origin: EventOrigin::Personal,
        origin_id: String::new(),
        origin_name: None,
        kind: EventKind::Other,
        location: None,
        completed: false,
        cleared: false,
    })
}

pub fn normalize_team_meeting(
    raw: &RawMeeting,
    team_id: &str,
    team_name: &str,
) -> Result<Event, CoreError> {
    normalize_meeting(raw, EventOrigin::Team, TEAM_ID_PREFIX, team_id, team_name)
}

pub fn normalize_study_meeting(
    raw: &RawMeeting,
    group_id: &str,
    group_name: &str,
) -> Result<Event, CoreError> {
    normalize_meeting(raw, EventOrigin::StudyGroup, STUDY_ID_PREFIX, group_id, group_name)
}

pub fn normalize_personal(raw: &RawPersonalEvent) -> Result<Event, CoreError> {
    Ok(Event {
        // Personal ids come straight from the backend and are already unique.
        id: raw.id.clone(),
        title: required_title(raw.title.as_deref())?,
        description: normalized_text(raw.description.as_deref()),
        start_at: parse_instant(raw.start_at.as_deref(), "startAt")?,
        end_at: parse_instant(raw.end_at.as_deref(), "endAt")?,
        origin: EventOrigin::Personal,
        origin_id: String::new(),
        origin_name: None,
        kind: raw
            .kind
            .as_deref()
            .map(parse_event_kind)
            .transpose()?
            .unwrap_or(EventKind::Other),
        location: optional_text(raw.location.as_deref()),
        completed: raw.completed,
        cleared: raw.cleared,
    })
}

pub fn normalize_schedule(
    raw: &RawMeetingSchedule,
    origin: EventOrigin,
    origin_id: &str,
    origin_name: &str,
) -> Result<RecurringMeetingRule, CoreError> {
    let days_of_week = raw
        .days
        .iter()
        .filter_map(|day| parse_weekday(day))
        .collect::<HashSet<_>>();
    if days_of_week.is_empty() {
        return Err(CoreError::InvalidEventData(format!(
            "schedule for '{origin_id}' has no recognizable days: {:?}",
            raw.days
        )));
    }

    let start_time = parse_hhmm(&raw.start_time).ok_or_else(|| {
        CoreError::InvalidEventData(format!("invalid schedule startTime '{}'", raw.start_time))
    })?;
    let end_time = parse_hhmm(&raw.end_time).ok_or_else(|| {
        CoreError::InvalidEventData(format!("invalid schedule endTime '{}'", raw.end_time))
    })?;

    let rule = RecurringMeetingRule {
        origin,
        origin_id: origin_id.to_string(),
        origin_name: origin_name.to_string(),
        days_of_week,
        start_time,
        end_time,
        kind: raw
            .meeting_type
            .as_deref()
            .map(parse_event_kind)
            .transpose()?
            .unwrap_or(EventKind::Meeting),
        location: optional_text(raw.location.as_deref()),
    };
    rule.validate().map_err(CoreError::InvalidEventData)?;
    Ok(rule)
}

fn normalize_meeting(
    raw: &RawMeeting,
    origin: EventOrigin,
    prefix: &str,
    origin_id: &str,
    origin_name: &str,
) -> Result<Event, CoreError> {
    Ok(Event {
        id: format!("{prefix}{}", raw.id),
        title: required_title(raw.title.as_deref())?,
        description: normalized_text(raw.description.as_deref()),
        start_at: parse_instant(raw.start_at.as_deref(), "startAt")?,
        end_at: parse_instant(raw.end_at.as_deref(), "endAt")?,
        origin,
        origin_id: origin_id.to_string(),
        origin_name: Some(origin_name.to_string()),
        kind: EventKind::Meeting,
        location: optional_text(raw.location.as_deref()),
        completed: false,
        cleared: false,
    })
}

fn required_title(value: Option<&str>) -> Result<String, CoreError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| CoreError::InvalidEventData("title is missing or empty".to_string()))
}

fn normalized_text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_instant(value: Option<&str>, field_name: &str) -> Result<DateTime<Utc>, CoreError> {
    let raw = value.map(str::trim).filter(|value| !value.is_empty()).ok_or_else(|| {
        CoreError::InvalidEventData(format!("{field_name} is missing"))
    })?;
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| {
            CoreError::InvalidEventData(format!("invalid {field_name} '{raw}': {error}"))
        })
}

fn parse_event_kind(value: &str) -> Result<EventKind, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "homework" => Ok(EventKind::Homework),
        "study" => Ok(EventKind::Study),
        "meeting" => Ok(EventKind::Meeting),
        "other" | "" => Ok(EventKind::Other),
        other => Err(CoreError::InvalidEventData(format!(
            "unsupported event kind: {other}"
        ))),
    }
}
