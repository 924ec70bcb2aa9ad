pub mod backend;
pub mod history;
pub mod types;
pub mod view_model;

pub use backend::InterviewBackend;
pub use types::*;
pub use view_model::{DispatchOutcome, InterviewSessionViewModel, SessionView};
