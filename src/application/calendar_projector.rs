use crate::domain::models::{category_for, CalendarInterval, Event, RecurringMeetingRule};
use chrono::{Datelike, Months, NaiveDate};

/// Default projection horizon for weekly rules.
pub const DEFAULT_HORIZON_MONTHS: u32 = 3;

pub fn default_window_end(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(DEFAULT_HORIZON_MONTHS))
        .unwrap_or(today)
}

/// Projects the canonical collection plus weekly rules onto view-ready
/// intervals. Pure and idempotent: recurring occurrences are recomputed from
/// the rules on every call, never persisted.
///
/// Cleared events are skipped here; they stay visible in day-level views only.
/// Malformed `start > end` intervals pass through unchanged for the renderer
/// to deal with.
pub fn project(
    events: &[Event],
    rules: &[RecurringMeetingRule],
    today: NaiveDate,
    window_end: NaiveDate,
) -> Vec<CalendarInterval> {
    let mut intervals: Vec<CalendarInterval> = events
        .iter()
        .filter(|event| !event.cleared)
        .map(|event| CalendarInterval {
            id: event.id.clone(),
            title: event.title.clone(),
            start: event.start_at,
            end: event.end_at,
            category: category_for(event.origin, event.kind, event.completed),
            location: event.location.clone(),
        })
        .collect();

    for rule in rules {
        intervals.extend(expand_rule(rule, today, window_end));
    }

    intervals.sort_by_key(|interval| interval.start);
    intervals
}

fn expand_rule(
    rule: &RecurringMeetingRule,
    today: NaiveDate,
    window_end: NaiveDate,
) -> Vec<CalendarInterval> {
    let mut occurrences = Vec::new();
    let mut day = today;
    while day <= window_end {
        if rule.days_of_week.contains(&day.weekday()) {
            occurrences.push(CalendarInterval {
                id: format!("{}-{}", rule.origin_id, day),
                title: rule.origin_name.clone(),
                start: day.and_time(rule.start_time).and_utc(),
                end: day.and_time(rule.end_time).and_utc(),
                category: category_for(rule.origin, rule.kind, false),
                location: rule.location.clone(),
            });
        }
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CalendarCategory, EventKind, EventOrigin};
    use chrono::{DateTime, NaiveTime, Utc, Weekday};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_event(id: &str, start: &str, end: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            description: String::new(),
            start_at: fixed_time(start),
            end_at: fixed_time(end),
            origin: EventOrigin::Personal,
            origin_id: String::new(),
            origin_name: None,
            kind: EventKind::Homework,
            location: None,
            completed: false,
            cleared: false,
        }
    }

    fn sample_rule(days: &[Weekday]) -> RecurringMeetingRule {
        RecurringMeetingRule {
            origin: EventOrigin::StudyGroup,
            origin_id: "sg-7".to_string(),
            origin_name: "Linear Algebra Study Group".to_string(),
            days_of_week: days.iter().copied().collect::<HashSet<_>>(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).expect("valid fixed time"),
            end_time: NaiveTime::from_hms_opt(19, 30, 0).expect("valid fixed time"),
            kind: EventKind::Meeting,
            location: Some("Library room 204".to_string()),
        }
    }

    fn day(value: &str) -> NaiveDate {
        value.parse().expect("valid date")
    }

    #[test]
    fn cleared_events_are_excluded_from_projection() {
        let mut cleared = sample_event("gone", "2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z");
        cleared.cleared = true;
        let kept = sample_event("kept", "2026-03-02T12:00:00Z", "2026-03-02T13:00:00Z");

        let intervals = project(&[cleared, kept], &[], day("2026-03-01"), day("2026-03-31"));

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].id, "kept");
    }

    #[test]
    fn categories_follow_origin_kind_and_completion() {
        let homework = sample_event("hw", "2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z");
        let mut done = sample_event("done", "2026-03-02T12:00:00Z", "2026-03-02T13:00:00Z");
        done.completed = true;
        let mut team = sample_event("team-5", "2026-03-02T14:00:00Z", "2026-03-02T15:00:00Z");
        team.origin = EventOrigin::Team;
        team.kind = EventKind::Meeting;

        let intervals = project(&[homework, done, team], &[], day("2026-03-01"), day("2026-03-31"));

        assert_eq!(intervals[0].category, CalendarCategory::Homework);
        assert_eq!(intervals[1].category, CalendarCategory::Done);
        assert_eq!(intervals[2].category, CalendarCategory::Team);
    }

    #[test]
    fn weekly_rule_expands_once_per_matching_day() {
        // 2026-03-01 is a Sunday; two Tuesdays and two Thursdays fall in the
        // two-week window ending on the 14th.
        let rule = sample_rule(&[Weekday::Tue, Weekday::Thu]);
        let intervals = project(&[], &[rule], day("2026-03-01"), day("2026-03-14"));

        assert_eq!(intervals.len(), 4);
        assert_eq!(intervals[0].id, "sg-7-2026-03-03");
        assert_eq!(intervals[0].start, fixed_time("2026-03-03T18:00:00Z"));
        assert_eq!(intervals[0].end, fixed_time("2026-03-03T19:30:00Z"));
        assert_eq!(intervals[0].category, CalendarCategory::StudyGroup);
        assert_eq!(intervals[0].title, "Linear Algebra Study Group");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let rule = sample_rule(&[Weekday::Mon]);
        // Both endpoints are Mondays.
        let intervals = project(&[], &[rule], day("2026-03-02"), day("2026-03-09"));
        assert_eq!(intervals.len(), 2);
    }

    #[test]
    fn default_window_end_adds_three_months() {
        assert_eq!(default_window_end(day("2026-03-01")), day("2026-06-01"));
        // Clamped to the shorter month.
        assert_eq!(default_window_end(day("2026-03-31")), day("2026-06-30"));
    }

    #[test]
    fn output_is_sorted_by_start() {
        let events = vec![
            sample_event("late", "2026-03-05T10:00:00Z", "2026-03-05T11:00:00Z"),
            sample_event("early", "2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z"),
        ];
        let rule = sample_rule(&[Weekday::Tue]);

        let intervals = project(&events, &[rule], day("2026-03-01"), day("2026-03-07"));
        let starts: Vec<_> = intervals.iter().map(|interval| interval.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn malformed_intervals_pass_through_unchanged() {
        let backwards = sample_event("odd", "2026-03-02T11:00:00Z", "2026-03-02T10:00:00Z");
        let intervals = project(
            &[backwards.clone()],
            &[],
            day("2026-03-01"),
            day("2026-03-31"),
        );
        assert_eq!(intervals[0].start, backwards.start_at);
        assert_eq!(intervals[0].end, backwards.end_at);
    }

    proptest! {
        #[test]
        fn projection_is_idempotent(offset in 0u32..365, span in 0u32..120) {
            let today = day("2026-01-01") + chrono::Days::new(offset as u64);
            let window_end = today + chrono::Days::new(span as u64);
            let events = vec![
                sample_event("a", "2026-03-05T10:00:00Z", "2026-03-05T11:00:00Z"),
                sample_event("b", "2026-04-01T10:00:00Z", "2026-04-01T11:00:00Z"),
            ];
            let rules = vec![sample_rule(&[Weekday::Wed, Weekday::Fri])];

            let first = project(&events, &rules, today, window_end);
            let second = project(&events, &rules, today, window_end);
            prop_assert_eq!(first, second);
        }
    }
}
