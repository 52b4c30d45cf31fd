pub mod activity_log;

pub use activity_log::ExportFileSource;

/// Error while reading an activity-log export.
#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(err) => write!(f, "activity log io error: {err}"),
            SourceError::Parse(err) => write!(f, "activity log parse error: {err}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err)
    }
}
