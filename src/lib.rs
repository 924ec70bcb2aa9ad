pub mod access;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod interview;
pub mod notify;


pub use api::ApiClient;
pub use error::{ApiError, ConfigError};
pub use interview::{InterviewSessionViewModel, SessionView};
