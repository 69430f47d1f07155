//! Error types for calindex.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in calindex operations.
#[derive(Error, Debug)]
pub enum CalIndexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("No calendars loaded")]
    NoCalendars,

    #[error("Event '{uid}' not found on {date}")]
    EventNotFound { uid: String, date: NaiveDate },

    #[error("Invalid date format: {0}")]
    InvalidDateTime(String),

    #[error("Please provide search criteria")]
    EmptySearch,

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calindex operations.
pub type CalIndexResult<T> = Result<T, CalIndexError>;
