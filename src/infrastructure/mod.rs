pub mod config;
pub mod credential_store;
pub mod error;
pub mod event_normalizer;
pub mod portal_client;
pub mod preferences;
