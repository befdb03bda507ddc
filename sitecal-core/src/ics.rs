//! iCalendar export of the collected events.
//!
//! The whole document is rendered in memory first, then written through a
//! temporary file that is renamed over the target, so a failed export never
//! leaves a partial calendar behind.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike, Property};
use tempfile::Builder;

use crate::error::{SiteCalError, SiteCalResult};
use crate::markup::strip_tags;
use crate::settings::SiteSettings;
use crate::store::Event;

/// Write `events` to the configured calendar file.
///
/// Returns the written path, or `None` when no calendar file is configured.
pub fn export_calendar(events: &[Event], settings: &SiteSettings) -> SiteCalResult<Option<PathBuf>> {
    let Some(path) = settings.ics_path() else {
        tracing::debug!("No calendar file configured, skipping export");
        return Ok(None);
    };

    tracing::debug!(path = %path.display(), count = events.len(), "Generating calendar");
    let content = render_calendar(events, settings)?;

    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;

    let mut file = Builder::new()
        .prefix(".sitecal-")
        .suffix(".ics.tmp")
        .tempfile_in(&dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;

    // Temp files are created owner-only; the calendar is published
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    file.persist(&path).map_err(|e| SiteCalError::Io(e.error))?;

    tracing::info!(path = %path.display(), count = events.len(), "Wrote calendar");
    Ok(Some(path))
}

/// Render `events` as an iCalendar document.
pub fn render_calendar(events: &[Event], settings: &SiteSettings) -> SiteCalResult<String> {
    let tz = settings.tz()?;

    let mut cal = Calendar::new();
    cal.append_property(Property::new("METHOD", "PUBLISH"));
    if !settings.site_name.is_empty() {
        cal.append_property(Property::new("X-WR-CALNAME", settings.site_name.as_str()));
    }

    for event in events {
        cal.push(render_event(event, tz, settings)?);
    }

    let cal = cal.done();
    Ok(strip_ics_bloat(&cal.to_string(), &settings.events.prodid))
}

fn render_event(event: &Event, tz: Tz, settings: &SiteSettings) -> SiteCalResult<icalendar::Event> {
    let meta = event.metadata();
    let title = meta.title().ok_or_else(|| missing_field(event, "title"))?;
    let slug = meta.slug().ok_or_else(|| missing_field(event, "slug"))?;
    let date = meta
        .get_datetime("date")
        .ok_or_else(|| missing_field(event, "date"))?;

    let mut ics_event = icalendar::Event::new();
    ics_event.summary(&strip_tags(title)?);
    ics_event.add_property("DTSTART", format_utc(to_utc(event.start, tz)?));
    ics_event.add_property("DTEND", format_utc(to_utc(event.end, tz)?));
    ics_event.add_property("DTSTAMP", format_utc(to_utc(date, tz)?));
    ics_event.uid(&format!("{}@{}", slug, settings.site_name));
    ics_event.add_property("CLASS", "PUBLIC");

    let summary = event.item.summary(&settings.site_url);
    ics_event.description(&strip_tags(&summary)?);

    if let Some(location) = meta.location() {
        ics_event.location(location);
    }

    Ok(ics_event.done())
}

/// Interpret a naive site-local time in `tz` and convert it to UTC.
///
/// Ambiguous times (clocks going back) resolve to the later instant, the
/// standard-time reading. Times skipped by a DST jump are read with the
/// offset in effect before the jump.
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> SiteCalResult<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(a, b) => Ok(a.max(b).with_timezone(&Utc)),
        LocalResult::None => {
            tracing::warn!(time = %local, timezone = %tz, "Local time skipped by DST, using the earlier offset");
            before_gap(local, tz).ok_or_else(|| {
                tracing::error!(time = %local, timezone = %tz, "Local time does not exist");
                SiteCalError::NonexistentLocalTime {
                    time: local.to_string(),
                    timezone: tz.to_string(),
                }
            })
        }
    }
}

/// `local` read with the UTC offset `tz` had a day earlier. Gaps last hours,
/// so that is the offset right before the transition.
fn before_gap(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    let earlier = local.checked_sub_signed(TimeDelta::days(1))?;
    let offset = tz.offset_from_utc_datetime(&earlier).fix();
    let utc = local.checked_sub_signed(TimeDelta::seconds(offset.local_minus_utc().into()))?;
    Some(Utc.from_utc_datetime(&utc))
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn missing_field(event: &Event, field: &str) -> SiteCalError {
    tracing::error!(source = %event.item.source.display(), field, "Event is missing required metadata");
    SiteCalError::MissingField {
        field: field.to_string(),
        source_id: event.item.source.display().to_string(),
    }
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with the configured product identifier
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str, prodid: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prodid);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
