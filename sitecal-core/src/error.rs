//! Error types for the sitecal pipeline.

use thiserror::Error;

/// Errors that can occur while resolving or exporting events.
#[derive(Error, Debug)]
pub enum SiteCalError {
    #[error(
        "Unknown time multiplier '{chunk}' in the 'event-duration' field of the event '{title}'. Supported multipliers are: w d h m s"
    )]
    InvalidUnit { chunk: String, title: String },

    #[error("Unable to parse '{chunk}' in the 'event-duration' field of the event '{title}'")]
    InvalidNumber { chunk: String, title: String },

    #[error("Duration '{value}' of the event '{title}' is out of range")]
    DurationOutOfRange { value: String, title: String },

    #[error(
        "Unable to parse the '{field}' field in the event '{title}': expected YYYY-MM-DD HH:MM, got '{value}'"
    )]
    MalformedTimestamp {
        field: String,
        title: String,
        value: String,
    },

    #[error("Either 'event-end' or 'event-duration' must be specified in the event '{title}'")]
    MissingEndSpecification { title: String },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Local time {time} does not exist in timezone {timezone}")]
    NonexistentLocalTime { time: String, timezone: String },

    #[error("Missing '{field}' metadata in {source_id}")]
    MissingField { field: String, source_id: String },

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sitecal operations.
pub type SiteCalResult<T> = Result<T, SiteCalError>;
