pub mod confirmation;
pub mod error;
pub mod telemetry;
pub mod types;

pub use error::{Error, ErrorKind, Result};
