use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid event data: {0}")]
    InvalidEventData(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Portal API error: http {status}; body={body}")]
    Http { status: u16, body: String },
    #[error("Unauthorized; re-authentication required")]
    Unauthorized,
    #[error("Illegal mutation: {0}")]
    IllegalMutation(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("State lock poisoned: {0}")]
    Lock(String),
}
