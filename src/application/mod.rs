pub mod bootstrap;
pub mod calendar_projector;
pub mod dashboard;
pub mod event_aggregator;
