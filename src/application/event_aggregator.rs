use crate::domain::models::{Event, EventOrigin, RecurringMeetingRule};
use crate::infrastructure::error::CoreError;
use crate::infrastructure::event_normalizer::{
    normalize_personal, normalize_schedule, normalize_study_meeting, normalize_task,
    normalize_team_meeting, DashboardPayload,
};
use crate::infrastructure::portal_client::{EventDraft, PortalApi};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Everything that has not been cleared.
    Upcoming,
    /// Everything starting on the given calendar day, cleared events included.
    OnDate(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshOutcome {
    pub loaded: usize,
    /// Records the portal sent that failed normalization and were skipped.
    pub dropped: usize,
}

#[derive(Debug, Default)]
struct AggregatorStore {
    events: Vec<Event>,
    rules: Vec<RecurringMeetingRule>,
}

/// Canonical in-memory event collection. Every mutation round-trips through the
/// portal API before the collection changes, so a failed request leaves the
/// collection exactly as it was.
pub struct EventAggregator<C>
where
    C: PortalApi,
{
    portal_client: Arc<C>,
    store: Mutex<AggregatorStore>,
}

impl<C> EventAggregator<C>
where
    C: PortalApi,
{
    pub fn new(portal_client: Arc<C>) -> Self {
        Self {
            portal_client,
            store: Mutex::new(AggregatorStore::default()),
        }
    }

    /// One dashboard fetch replaces the whole collection. Individual records
    /// that fail normalization are skipped without aborting the rest.
    pub async fn refresh(&self, access_token: &str) -> Result<RefreshOutcome, CoreError> {
        let payload = self.portal_client.fetch_dashboard(access_token).await?;
        let (events, rules, dropped) = Self::normalize_payload(&payload);

        let mut store = self.lock_store()?;
        let outcome = RefreshOutcome {
            loaded: events.len(),
            dropped,
        };
        store.events = events;
        store.rules = rules;
        Ok(outcome)
    }

    /// Creates the event on the portal first, then inserts the echoed record.
    /// Nothing is inserted when the request or the echo fails.
    pub async fn add_personal(
        &self,
        access_token: &str,
        draft: &EventDraft,
    ) -> Result<Event, CoreError> {
        let raw = self.portal_client.create_event(access_token, draft).await?;
        let event = normalize_personal(&raw)?;

        let mut store = self.lock_store()?;
        store.events.push(event.clone());
        Ok(event)
    }

    pub async fn mark_complete(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.ensure_personal(event_id, "complete")?;
        self.portal_client
            .complete_event(access_token, event_id)
            .await?;
        self.update_event(event_id, |event| event.completed = true)
    }

    pub async fn clear(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.ensure_personal(event_id, "clear")?;
        self.portal_client.clear_event(access_token, event_id).await?;
        self.update_event(event_id, |event| event.cleared = true)
    }

    pub async fn unclear(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.ensure_personal(event_id, "unclear")?;
        self.portal_client
            .unclear_event(access_token, event_id)
            .await?;
        self.update_event(event_id, |event| event.cleared = false)
    }

    pub async fn delete(&self, access_token: &str, event_id: &str) -> Result<(), CoreError> {
        self.ensure_personal(event_id, "delete")?;
        self.portal_client
            .delete_event(access_token, event_id)
            .await?;

        let mut store = self.lock_store()?;
        store.events.retain(|event| event.id != event_id);
        Ok(())
    }

    /// Filtered view sorted by `start_at` ascending; ties keep insertion order.
    pub fn view(&self, filter: EventFilter) -> Result<Vec<Event>, CoreError> {
        let store = self.lock_store()?;
        let mut events: Vec<Event> = store
            .events
            .iter()
            .filter(|event| match filter {
                EventFilter::Upcoming => !event.cleared,
                EventFilter::OnDate(date) => event.start_at.date_naive() == date,
            })
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start_at);
        Ok(events)
    }

    pub fn snapshot(&self) -> Result<Vec<Event>, CoreError> {
        Ok(self.lock_store()?.events.clone())
    }

    pub fn recurring_rules(&self) -> Result<Vec<RecurringMeetingRule>, CoreError> {
        Ok(self.lock_store()?.rules.clone())
    }

    fn normalize_payload(
        payload: &DashboardPayload,
    ) -> (Vec<Event>, Vec<RecurringMeetingRule>, usize) {
        let mut events = Vec::new();
        let mut rules = Vec::new();
        let mut dropped = 0usize;

        for task in &payload.tasks {
            match normalize_task(task) {
                Ok(event) => events.push(event),
                Err(_) => dropped += 1,
            }
        }
        for raw in &payload.events {
            match normalize_personal(raw) {
                Ok(event) => events.push(event),
                Err(_) => dropped += 1,
            }
        }
        for team in &payload.teams {
            for meeting in &team.meetings {
                match normalize_team_meeting(meeting, &team.id, &team.name) {
                    Ok(event) => events.push(event),
                    Err(_) => dropped += 1,
                }
            }
            if let Some(schedule) = &team.schedule {
                match normalize_schedule(schedule, EventOrigin::Team, &team.id, &team.name) {
                    Ok(rule) => rules.push(rule),
                    Err(_) => dropped += 1,
                }
            }
        }
        for group in &payload.study_groups {
            for meeting in &group.meetings {
                match normalize_study_meeting(meeting, &group.id, &group.name) {
                    Ok(event) => events.push(event),
                    Err(_) => dropped += 1,
                }
            }
            if let Some(schedule) = &group.schedule {
                match normalize_schedule(schedule, EventOrigin::StudyGroup, &group.id, &group.name) {
                    Ok(rule) => rules.push(rule),
                    Err(_) => dropped += 1,
                }
            }
        }

        (events, rules, dropped)
    }

    // Mutations are legal only on personal events; everything team- or
    // group-owned is read-only here and must be edited at its source.
    fn ensure_personal(&self, event_id: &str, action: &str) -> Result<(), CoreError> {
        let store = self.lock_store()?;
        let Some(event) = store.events.iter().find(|event| event.id == event_id) else {
            return Err(CoreError::IllegalMutation(format!(
                "cannot {action} unknown event '{event_id}'"
            )));
        };
        if event.origin != EventOrigin::Personal {
            return Err(CoreError::IllegalMutation(format!(
                "cannot {action} event '{event_id}' owned by {:?}",
                event.origin
            )));
        }
        Ok(())
    }

    fn update_event(
        &self,
        event_id: &str,
        apply: impl FnOnce(&mut Event),
    ) -> Result<(), CoreError> {
        let mut store = self.lock_store()?;
        if let Some(event) = store.events.iter_mut().find(|event| event.id == event_id) {
            apply(event);
        }
        Ok(())
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, AggregatorStore>, CoreError> {
        self.store
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))
    }
}
