use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Text reported by the driver (or by this crate) without the variant prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            DbError::ConfigError(msg)
            | DbError::ConnectionError(msg)
            | DbError::ExecutionError(msg)
            | DbError::ParameterError(msg) => msg.clone(),
            DbError::Json(err) => err.to_string(),
            DbError::Io(err) => err.to_string(),
        }
    }
}
