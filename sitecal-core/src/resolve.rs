//! Event window resolution for a single content item.

use chrono::NaiveDateTime;

use crate::content::{ContentItem, EventWindow, Metadata};
use crate::duration::Duration;
use crate::error::{SiteCalError, SiteCalResult};
use crate::timestamp::parse_timestamp;

pub const EVENT_START: &str = "event-start";
pub const EVENT_END: &str = "event-end";
pub const EVENT_DURATION: &str = "event-duration";

/// Compute the event window described by `metadata`.
///
/// Returns `Ok(None)` when there is no `event-start`, i.e. the item is not an
/// event. An end is taken from `event-end`, or else from `event-start` plus
/// `event-duration`.
pub fn resolve_window(metadata: &Metadata) -> SiteCalResult<Option<EventWindow>> {
    let title = metadata.display_title();

    let Some(start) = timestamp_field(metadata, EVENT_START, title)? else {
        return Ok(None);
    };

    let end = if let Some(end) = timestamp_field(metadata, EVENT_END, title)? {
        end
    } else if let Some(raw) = metadata.get_str(EVENT_DURATION) {
        let delta = Duration::parse(raw, title)?
            .to_time_delta()
            .ok_or_else(|| out_of_range(raw, title))?;
        start
            .checked_add_signed(delta)
            .ok_or_else(|| out_of_range(raw, title))?
    } else {
        tracing::error!(title, "Event has neither 'event-end' nor 'event-duration'");
        return Err(SiteCalError::MissingEndSpecification {
            title: title.to_string(),
        });
    };

    if end < start {
        tracing::warn!(title, %start, %end, "Event ends before it starts");
    }

    Ok(Some(EventWindow { start, end }))
}

/// Resolve `item` and attach the window to it.
///
/// Items without event metadata end up with no window. Running this again on
/// an already resolved item recomputes the same window.
pub fn resolve_event(item: &mut ContentItem) -> SiteCalResult<Option<EventWindow>> {
    let window = resolve_window(&item.metadata)?;
    item.event = window;
    Ok(window)
}

/// Read a timestamp field. Hosts may hand over already parsed datetimes.
fn timestamp_field(
    metadata: &Metadata,
    field: &str,
    title: &str,
) -> SiteCalResult<Option<NaiveDateTime>> {
    if let Some(dt) = metadata.get_datetime(field) {
        return Ok(Some(dt));
    }

    metadata
        .get_str(field)
        .map(|raw| parse_timestamp(raw, field, title))
        .transpose()
}

fn out_of_range(value: &str, title: &str) -> SiteCalError {
    tracing::error!(value, title, "Event end is out of range");
    SiteCalError::DurationOutOfRange {
        value: value.to_string(),
        title: title.to_string(),
    }
}
