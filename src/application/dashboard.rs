use crate::application::calendar_projector::{default_window_end, project};
use crate::application::event_aggregator::{EventAggregator, EventFilter, RefreshOutcome};
use crate::domain::models::{CalendarInterval, Event, TimerConfig};
use crate::domain::timer::{FocusTimer, TimerMode};
use crate::infrastructure::credential_store::TokenStore;
use crate::infrastructure::error::CoreError;
use crate::infrastructure::portal_client::{EventDraft, PortalApi};
use crate::infrastructure::preferences::PreferencesRepository;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Orchestration point shared by every dashboard command. Owns the aggregator,
/// the focus timer, and the local stores; command handlers stay thin wrappers
/// around the `*_impl` functions here.
pub struct DashboardState<C, P, T>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    aggregator: EventAggregator<C>,
    timer: Mutex<FocusTimer>,
    preferences: Arc<P>,
    token_store: Arc<T>,
    logs_dir: PathBuf,
    log_guard: Mutex<()>,
}

impl<C, P, T> DashboardState<C, P, T>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    pub fn new(
        portal_client: Arc<C>,
        preferences: Arc<P>,
        token_store: Arc<T>,
        logs_dir: PathBuf,
    ) -> Self {
        let timer_config = preferences
            .load_timer_config()
            .ok()
            .flatten()
            .unwrap_or_default();
        Self {
            aggregator: EventAggregator::new(portal_client),
            timer: Mutex::new(FocusTimer::new(timer_config)),
            preferences,
            token_store,
            logs_dir,
            log_guard: Mutex::new(()),
        }
    }

    pub fn aggregator(&self) -> &EventAggregator<C> {
        &self.aggregator
    }

    pub fn command_error(&self, command: &str, error: &CoreError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }

    fn required_token(&self) -> Result<String, CoreError> {
        self.token_store
            .load_token()?
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(CoreError::Unauthorized)
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, FocusTimer>, CoreError> {
        self.timer
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RefreshDashboardResponse {
    pub loaded: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimerStateResponse {
    pub mode: String,
    pub remaining_seconds: u32,
    pub cycle_count: u32,
    pub running: bool,
    pub config: TimerConfig,
}

pub async fn refresh_dashboard_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<RefreshDashboardResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let access_token = state.required_token()?;
    let RefreshOutcome { loaded, dropped } = state.aggregator.refresh(&access_token).await?;

    if dropped > 0 {
        state.log_error(
            "refresh_dashboard",
            &format!("dropped {dropped} malformed records during refresh"),
        );
    }
    state.log_info(
        "refresh_dashboard",
        &format!("loaded {loaded} events (dropped={dropped})"),
    );
    Ok(RefreshDashboardResponse { loaded, dropped })
}

pub async fn add_event_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    title: String,
    description: Option<String>,
    start_at: String,
    end_at: String,
    kind: Option<String>,
    location: Option<String>,
) -> Result<Event, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidEventData(
            "title must not be empty".to_string(),
        ));
    }
    let start = parse_rfc3339_input(&start_at, "start_at")?;
    let end = parse_rfc3339_input(&end_at, "end_at")?;

    let draft = EventDraft {
        title: title.to_string(),
        description: normalize_optional(description),
        start_at: start.to_rfc3339(),
        end_at: end.to_rfc3339(),
        kind: normalize_optional(kind),
        location: normalize_optional(location),
    };

    let access_token = state.required_token()?;
    let event = state.aggregator.add_personal(&access_token, &draft).await?;
    state.log_info("add_event", &format!("added event_id={}", event.id));
    Ok(event)
}

pub async fn complete_event_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    event_id: String,
) -> Result<(), CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let event_id = required_event_id(&event_id)?;
    let access_token = state.required_token()?;
    state.aggregator.mark_complete(&access_token, event_id).await?;
    state.log_info("complete_event", &format!("completed event_id={event_id}"));
    Ok(())
}

pub async fn clear_event_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    event_id: String,
) -> Result<(), CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let event_id = required_event_id(&event_id)?;
    let access_token = state.required_token()?;
    state.aggregator.clear(&access_token, event_id).await?;
    state.log_info("clear_event", &format!("cleared event_id={event_id}"));
    Ok(())
}

pub async fn unclear_event_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    event_id: String,
) -> Result<(), CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let event_id = required_event_id(&event_id)?;
    let access_token = state.required_token()?;
    state.aggregator.unclear(&access_token, event_id).await?;
    state.log_info("unclear_event", &format!("restored event_id={event_id}"));
    Ok(())
}

pub async fn delete_event_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    event_id: String,
) -> Result<(), CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let event_id = required_event_id(&event_id)?;
    let access_token = state.required_token()?;
    state.aggregator.delete(&access_token, event_id).await?;
    state.log_info("delete_event", &format!("deleted event_id={event_id}"));
    Ok(())
}

pub fn upcoming_events_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<Vec<Event>, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    state.aggregator.view(EventFilter::Upcoming)
}

/// Day-granular view: cleared events stay visible here.
pub fn day_view_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    date: String,
) -> Result<Vec<Event>, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let date = parse_date_input(&date, "date")?;
    state.aggregator.view(EventFilter::OnDate(date))
}

pub fn calendar_view_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    from: Option<String>,
    to: Option<String>,
) -> Result<Vec<CalendarInterval>, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let today = match from {
        Some(raw) => parse_date_input(&raw, "from")?,
        None => Utc::now().date_naive(),
    };
    let window_end = match to {
        Some(raw) => parse_date_input(&raw, "to")?,
        None => default_window_end(today),
    };

    let events = state.aggregator.snapshot()?;
    let rules = state.aggregator.recurring_rules()?;
    Ok(project(&events, &rules, today, window_end))
}

pub fn start_timer_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let mut timer = state.lock_timer()?;
    timer.start();
    Ok(to_timer_response(&timer))
}

pub fn pause_timer_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let mut timer = state.lock_timer()?;
    timer.pause();
    Ok(to_timer_response(&timer))
}

pub fn reset_timer_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let mut timer = state.lock_timer()?;
    timer.reset();
    Ok(to_timer_response(&timer))
}

pub fn tick_timer_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let mut timer = state.lock_timer()?;
    timer.tick();
    Ok(to_timer_response(&timer))
}

pub fn timer_state_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    let timer = state.lock_timer()?;
    Ok(to_timer_response(&timer))
}

/// Persists the new configuration and applies it to the timer. A stopped timer
/// picks the new duration up immediately; a running session keeps its remaining
/// time until the next mode transition.
pub fn update_timer_config_impl<C, P, T>(
    state: &DashboardState<C, P, T>,
    config: TimerConfig,
) -> Result<TimerStateResponse, CoreError>
where
    C: PortalApi,
    P: PreferencesRepository,
    T: TokenStore,
{
    config.validate().map_err(CoreError::InvalidConfig)?;
    state.preferences.save_timer_config(&config)?;

    let mut timer = state.lock_timer()?;
    let was_running = timer.running();
    timer.update_config(config);
    if !was_running {
        timer.apply_config();
    }

    state.log_info("update_timer_config", "saved timer configuration");
    Ok(to_timer_response(&timer))
}

fn to_timer_response(timer: &FocusTimer) -> TimerStateResponse {
    TimerStateResponse {
        mode: match timer.mode() {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
        .to_string(),
        remaining_seconds: timer.remaining_seconds(),
        cycle_count: timer.cycle_count(),
        running: timer.running(),
        config: timer.config().clone(),
    }
}

fn required_event_id(value: &str) -> Result<&str, CoreError> {
    let event_id = value.trim();
    if event_id.is_empty() {
        return Err(CoreError::InvalidEventData(
            "event_id must not be empty".to_string(),
        ));
    }
    Ok(event_id)
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_rfc3339_input(value: &str, field_name: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| {
            CoreError::InvalidEventData(format!("{field_name} must be RFC3339 date-time: {error}"))
        })
}

fn parse_date_input(value: &str, field_name: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|error| {
        CoreError::InvalidEventData(format!("{field_name} must be YYYY-MM-DD: {error}"))
    })
}
