use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// Project data failed validation or could not be (de)serialized.
    Project(String),
    /// Storage-level failure in a project repository.
    Repository(String),
    /// Failure reported by the audio-engine collaborator.
    Engine(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::Project(msg) => write!(f, "Project error: {}", msg),
            CoreError::Repository(msg) => write!(f, "Repository error: {}", msg),
            CoreError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;

// Conversion helpers
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Repository(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Project(err.to_string())
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Repository(err.to_string())
    }
}
