//! Event timestamps in the fixed `YYYY-MM-DD HH:MM` format.

use chrono::NaiveDateTime;

use crate::error::{SiteCalError, SiteCalResult};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a timestamp string in format "YYYY-MM-DD HH:MM".
///
/// The shape is checked byte by byte before handing off to chrono, which on
/// its own would accept unpadded fields. `field` and `title` only feed the
/// error.
pub fn parse_timestamp(value: &str, field: &str, title: &str) -> SiteCalResult<NaiveDateTime> {
    let parsed = if has_timestamp_shape(value) {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
    } else {
        None
    };

    parsed.ok_or_else(|| {
        tracing::error!(field, title, value, "Unable to parse event timestamp");
        SiteCalError::MalformedTimestamp {
            field: field.to_string(),
            title: title.to_string(),
            value: value.to_string(),
        }
    })
}

/// Format a timestamp the same way it is written in metadata.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn has_timestamp_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 16 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 => b == b'-',
        10 => b == b' ',
        13 => b == b':',
        _ => b.is_ascii_digit(),
    })
}
