//! Request handlers for the Axum server

pub mod chat;
pub mod error;
pub mod execute;
pub mod health;
pub mod history;
pub mod structures;

pub use chat::*;
pub use error::{ApiError, ApiResult};
pub use execute::*;
pub use health::*;
pub use history::*;
pub use structures::*;
