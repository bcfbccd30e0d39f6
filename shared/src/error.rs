use std::fmt;

/// Why the sightings list could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The request never produced a response (offline, CORS, DNS...).
    Network(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The body was not a sightings array.
    Parse(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(msg) => write!(f, "fetch error: {msg}"),
            LoadError::Status(code) => write!(f, "HTTP {code}"),
            LoadError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}
