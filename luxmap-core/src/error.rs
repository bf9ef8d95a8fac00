use thiserror::Error;

#[derive(Debug, Error)]
pub enum LuxmapError {
    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("Malformed {field} value '{value}' in '{file}'")]
    MalformedNumber {
        file: String,
        field: String,
        value: String,
    },

    #[error("Missing required field '{field}' in '{file}'")]
    MissingField { file: String, field: String },

    #[error("No data rows in '{0}'")]
    EmptySpectrum(String),

    #[error("Invalid filename pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("A background job is already running")]
    WorkerBusy,

    #[error("The background worker stopped without reporting a result")]
    WorkerDisconnected,
}

impl LuxmapError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        LuxmapError::FileIO(path.as_ref().display().to_string(), err)
    }
}
