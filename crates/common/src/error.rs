use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown strategy '{id}'. Registered strategies: {}", registered.join(", "))]
    UnknownStrategy { id: String, registered: Vec<String> },

    #[error("Strategy '{0}' is already registered")]
    DuplicateStrategy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
