use thiserror::Error;

/// Errors raised while talking to the interview platform backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status: {0}")]
    Status(reqwest::StatusCode),

    /// The envelope came back with a non-zero `code`.
    #[error("Backend error {code}: {message}")]
    Business { code: i32, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Response carried no data for {0}")]
    MissingData(&'static str),

    /// The stored message history of an interview could not be parsed.
    #[error("Interview history is unreadable: {0}")]
    CorruptHistory(String),

    #[error("View already holds interview {loaded}, cannot load {requested}")]
    SessionMismatch { loaded: String, requested: String },

    #[error("Access denied: {0}")]
    AccessDenied(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid config value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;
