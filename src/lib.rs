pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{
    bootstrap_workspace, build_dashboard_state, BootstrapResult, PortalDashboardState,
};
pub use application::calendar_projector::{default_window_end, project};
pub use application::dashboard::{
    add_event_impl, calendar_view_impl, clear_event_impl, complete_event_impl, day_view_impl,
    delete_event_impl, pause_timer_impl, refresh_dashboard_impl, reset_timer_impl,
    start_timer_impl, tick_timer_impl, timer_state_impl, unclear_event_impl,
    update_timer_config_impl, upcoming_events_impl, DashboardState, RefreshDashboardResponse,
    TimerStateResponse,
};
pub use application::event_aggregator::{EventAggregator, EventFilter, RefreshOutcome};
pub use domain::models::{
    category_for, CalendarCategory, CalendarInterval, Event, EventKind, EventOrigin,
    RecurringMeetingRule, TimerConfig,
};
pub use domain::timer::{FocusTimer, TimerMode};
pub use infrastructure::credential_store::{KeyringTokenStore, TokenStore};
pub use infrastructure::error::CoreError;
pub use infrastructure::portal_client::{EventDraft, PortalApi, ReqwestPortalApi};
pub use infrastructure::preferences::{PreferencesRepository, SqlitePreferencesRepository};
