use crate::application::dashboard::DashboardState;
use crate::infrastructure::config::{ensure_default_configs, read_portal_base_url};
use crate::infrastructure::credential_store::KeyringTokenStore;
use crate::infrastructure::error::CoreError;
use crate::infrastructure::portal_client::ReqwestPortalApi;
use crate::infrastructure::preferences::{initialize_preferences, SqlitePreferencesRepository};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Dashboard state wired to the production portal client and local stores.
pub type PortalDashboardState =
    DashboardState<ReqwestPortalApi, SqlitePreferencesRepository, KeyringTokenStore>;

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub preferences_path: PathBuf,
}

/// Creates the workspace layout (`config/`, `state/`, `logs/`), seeds the
/// default config files, and initializes the preferences database. Safe to
/// call on every launch.
pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, CoreError> {
    let config_dir = workspace_root.join("config");
    let state_dir = workspace_root.join("state");
    let logs_dir = workspace_root.join("logs");
    let preferences_path = state_dir.join("studyhub.sqlite");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&state_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    initialize_preferences(&preferences_path)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
        preferences_path,
    })
}

pub fn build_dashboard_state(workspace_root: &Path) -> Result<PortalDashboardState, CoreError> {
    let bootstrap = bootstrap_workspace(workspace_root)?;
    let base_url = read_portal_base_url(&bootstrap.config_dir)?;

    Ok(DashboardState::new(
        Arc::new(ReqwestPortalApi::new(&base_url)?),
        Arc::new(SqlitePreferencesRepository::new(&bootstrap.preferences_path)),
        Arc::new(KeyringTokenStore::default()),
        bootstrap.logs_dir,
    ))
}
