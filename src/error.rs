use std::{error::Error, fmt, io};

/// The crate's result type.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Failures at the edges of the dashboard: configuration and preference files.
///
/// The training driver itself never fails; invalid calls are ignored.
#[derive(Debug)]
pub enum DashboardError {
    /// Invalid configuration, caught before a driver is built.
    InvalidConfig(String),
    /// Reading or writing a file failed.
    Io(io::Error),
    /// A stored document could not be (de)serialized.
    Serde(serde_json::Error),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Serde(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl Error for DashboardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serde(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for DashboardError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}
