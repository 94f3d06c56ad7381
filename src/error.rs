use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendingSummaryError {
    #[error("Month offset {month_offset} cannot be as large as the amount of months ({span})")]
    MonthOffsetTooLarge { month_offset: i64, span: i64 },

    #[error("Month offset {0} must not be negative")]
    NegativeMonthOffset(i64),

    #[error("No valid expense or income records found")]
    NoRecords,

    #[error("Invalid separator {0:?}: must be a single ASCII character")]
    InvalidSeparator(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpendingSummaryError>;
