pub mod service;
pub mod types;

pub use service::HomeFeed;
pub use types::*;
