use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input, rejected before any external call.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Completion service failure of any kind, including timeouts.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Strict filtering left nothing. Carries the raw model text for diagnosis.
    #[error("No valid PyMOL commands produced")]
    EmptyOutput { raw: String },

    #[error("Validation warning: {0}")]
    Validation(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Critical execution error: {0}")]
    Critical(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse fault category, used by front ends to choose status and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArguments,
    NotFound,
    Upstream,
    EmptyOutput,
    Validation,
    Execution,
    Critical,
    Configuration,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::EmptyOutput { .. } => ErrorKind::EmptyOutput,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Execution(_) => ErrorKind::Execution,
            Error::Critical(_) => ErrorKind::Critical,
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Io(_) | Error::Serialization(_) => ErrorKind::Internal,
        }
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Error::Upstream(err.to_string())
    }
}

impl ErrorKind {
    /// HTTP status code mirroring the fault category.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidArguments | ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::EmptyOutput => 422,
            ErrorKind::Upstream => 502,
            _ => 500,
        }
    }

    /// Process exit code for the command-line front end.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::EmptyOutput => 2,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON error: {}", err))
    }
}
