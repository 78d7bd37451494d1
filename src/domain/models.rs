use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    Team,
    StudyGroup,
    Personal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Homework,
    Study,
    Meeting,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub origin: EventOrigin,
    pub origin_id: String,
    pub origin_name: Option<String>,
    pub kind: EventKind,
    pub location: Option<String>,
    pub completed: bool,
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringMeetingRule {
    pub origin: EventOrigin,
    pub origin_id: String,
    pub origin_name: String,
    pub days_of_week: HashSet<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub kind: EventKind,
    pub location: Option<String>,
}

impl RecurringMeetingRule {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.origin_id, "rule.origin_id")?;
        validate_non_empty(&self.origin_name, "rule.origin_name")?;
        if self.days_of_week.is_empty() {
            return Err("rule.days_of_week must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarCategory {
    Done,
    Team,
    StudyGroup,
    Homework,
    Study,
    Meeting,
    Personal,
}

impl CalendarCategory {
    pub fn color(self) -> &'static str {
        match self {
            Self::Done => "#9ca3af",
            Self::Team => "#3b82f6",
            Self::StudyGroup => "#8b5cf6",
            Self::Homework => "#ef4444",
            Self::Study => "#10b981",
            Self::Meeting => "#f59e0b",
            Self::Personal => "#14b8a6",
        }
    }
}

/// Total over the closed (origin, kind, completed) tuple. Completed personal
/// events always render as the muted done category.
pub fn category_for(origin: EventOrigin, kind: EventKind, completed: bool) -> CalendarCategory {
    match origin {
        EventOrigin::Personal if completed => CalendarCategory::Done,
        EventOrigin::Team => CalendarCategory::Team,
        EventOrigin::StudyGroup => CalendarCategory::StudyGroup,
        EventOrigin::Personal => match kind {
            EventKind::Homework => CalendarCategory::Homework,
            EventKind::Study => CalendarCategory::Study,
            EventKind::Meeting => CalendarCategory::Meeting,
            EventKind::Other => CalendarCategory::Personal,
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarInterval {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: CalendarCategory,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub auto_start: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            auto_start: false,
        }
    }
}

impl TimerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.work_minutes == 0 {
            return Err("timer.work_minutes must be > 0".to_string());
        }
        if self.short_break_minutes == 0 {
            return Err("timer.short_break_minutes must be > 0".to_string());
        }
        if self.long_break_minutes == 0 {
            return Err("timer.long_break_minutes must be > 0".to_string());
        }
        Ok(())
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

pub fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_event() -> Event {
        Event {
            id: "evt-1".to_string(),
            title: "Algorithms problem set".to_string(),
            description: "Chapters 4-5".to_string(),
            start_at: fixed_time("2026-03-02T14:00:00Z"),
            end_at: fixed_time("2026-03-02T16:00:00Z"),
            origin: EventOrigin::Personal,
            origin_id: String::new(),
            origin_name: None,
            kind: EventKind::Homework,
            location: None,
            completed: false,
            cleared: false,
        }
    }

    fn sample_rule() -> RecurringMeetingRule {
        RecurringMeetingRule {
            origin: EventOrigin::StudyGroup,
            origin_id: "sg-7".to_string(),
            origin_name: "Linear Algebra Study Group".to_string(),
            days_of_week: HashSet::from([Weekday::Tue, Weekday::Thu]),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).expect("valid fixed time"),
            end_time: NaiveTime::from_hms_opt(19, 30, 0).expect("valid fixed time"),
            kind: EventKind::Meeting,
            location: Some("Library room 204".to_string()),
        }
    }

    #[test]
    fn rule_validate_accepts_valid_rule() {
        assert!(sample_rule().validate().is_ok());
    }

    #[test]
    fn rule_validate_rejects_empty_day_set() {
        let mut rule = sample_rule();
        rule.days_of_week.clear();
        assert!(rule.validate().is_err());
    }

    #[test]
    fn timer_config_validate_rejects_zero_durations() {
        let mut config = TimerConfig::default();
        assert!(config.validate().is_ok());
        config.work_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn completed_personal_events_map_to_done_for_every_kind() {
        for kind in [
            EventKind::Homework,
            EventKind::Study,
            EventKind::Meeting,
            EventKind::Other,
        ] {
            assert_eq!(
                category_for(EventOrigin::Personal, kind, true),
                CalendarCategory::Done
            );
        }
    }

    #[test]
    fn category_follows_origin_before_kind() {
        assert_eq!(
            category_for(EventOrigin::Team, EventKind::Homework, false),
            CalendarCategory::Team
        );
        assert_eq!(
            category_for(EventOrigin::StudyGroup, EventKind::Other, true),
            CalendarCategory::StudyGroup
        );
        assert_eq!(
            category_for(EventOrigin::Personal, EventKind::Study, false),
            CalendarCategory::Study
        );
    }

    #[test]
    fn parse_weekday_accepts_long_and_short_names() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("thu"), Some(Weekday::Thu));
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn event_and_timer_config_support_serde_roundtrip() {
        let event = sample_event();
        let config = TimerConfig::default();

        let event_roundtrip: Event =
            serde_json::from_str(&serde_json::to_string(&event).expect("serialize event"))
                .expect("deserialize event");
        let config_roundtrip: TimerConfig =
            serde_json::from_str(&serde_json::to_string(&config).expect("serialize config"))
                .expect("deserialize config");

        assert_eq!(event_roundtrip, event);
        assert_eq!(config_roundtrip, config);
    }
}
