use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("sheet fetch failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error in {field}: {reason}")]
    ConfigError { field: String, reason: String },

    #[error("validation failed for {field}: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("no recipients for {selector}")]
    NoRecipients { selector: String },

    #[error("mail delivery failed: {reason}")]
    DeliveryError { reason: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
