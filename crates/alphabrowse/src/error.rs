use alphabrowse_core::access::AccessError;
use alphabrowse_core::browse::{BackendError, BrowseError};
use alphabrowse_core::config::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<BrowseError> for Error {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::InvalidRequest(msg) => Error::InvalidRequest(msg),
        }
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::PermissionDenied(err.to_string())
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Error::Backend(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
