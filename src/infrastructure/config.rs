use crate::domain::models::TimerConfig;
use crate::infrastructure::error::CoreError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const TIMER_JSON: &str = "timer.json";
const DEFAULT_PORTAL_BASE_URL: &str = "https://portal.studyhub.app";

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "StudyHub",
                "portalBaseUrl": DEFAULT_PORTAL_BASE_URL
            }),
        ),
        (
            TIMER_JSON,
            serde_json::json!({
                "schema": 1,
                "workMinutes": 25,
                "shortBreakMinutes": 5,
                "longBreakMinutes": 15,
                "autoStart": false
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), CoreError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, CoreError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| CoreError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(CoreError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn read_portal_base_url(config_dir: &Path) -> Result<String, CoreError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    let base_url = app
        .get("portalBaseUrl")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PORTAL_BASE_URL);
    Ok(base_url.to_string())
}

/// Tolerant read: any missing file, bad schema, or out-of-range value falls
/// back to the hard-coded defaults.
pub fn load_timer_config(config_dir: &Path) -> TimerConfig {
    let mut config = TimerConfig::default();
    let Ok(parsed) = read_config(&config_dir.join(TIMER_JSON)) else {
        return config;
    };

    if let Some(value) = parsed.get("workMinutes").and_then(serde_json::Value::as_u64) {
        if value > 0 {
            config.work_minutes = value as u32;
        }
    }
    if let Some(value) = parsed
        .get("shortBreakMinutes")
        .and_then(serde_json::Value::as_u64)
    {
        if value > 0 {
            config.short_break_minutes = value as u32;
        }
    }
    if let Some(value) = parsed
        .get("longBreakMinutes")
        .and_then(serde_json::Value::as_u64)
    {
        if value > 0 {
            config.long_break_minutes = value as u32;
        }
    }
    if let Some(value) = parsed.get("autoStart").and_then(serde_json::Value::as_bool) {
        config.auto_start = value;
    }

    config
}
