use thiserror::Error;

pub type Result<T> = std::result::Result<T, GhReportError>;

#[derive(Error, Debug)]
pub enum GhReportError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
    #[error("Upstream returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Export input error: {0}")]
    ExportInput(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GhReportError {
    /// Errors that abort a whole run instead of degrading it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GhReportError::Validation(_) | GhReportError::ExportInput(_))
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for GhReportError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        GhReportError::Io(err.into_error())
    }
}
