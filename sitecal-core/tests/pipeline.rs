use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use icalendar::parser::{read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use sitecal_core::{
    ContentItem, EVENTS_LIST_KEY, EventListing, EventStore, Metadata, SiteSettings,
    on_content_init, on_generator_finalized, on_generator_init,
};

fn settings(output: &Path) -> SiteSettings {
    let mut settings = SiteSettings {
        output_path: output.to_path_buf(),
        site_url: "https://example.org/".to_string(),
        site_name: "example.org".to_string(),
        ..Default::default()
    };
    settings.events.ics_fname = Some("calendar/events.ics".to_string());
    settings
}

fn event_item(slug: &str, start: &str, lang: &str) -> ContentItem {
    let meta = Metadata::new()
        .with("title", format!("<em>{slug}</em>"))
        .with("slug", slug)
        .with("lang", lang)
        .with(
            "date",
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        )
        .with("event-start", start)
        .with("event-duration", "1h 30m")
        .with("location", "Town hall");
    ContentItem::new(format!("content/{slug}.md"), meta)
        .with_summary(r#"<p>Details on <a href="{siteurl}/events/">the site</a>.</p>"#)
}

fn utc(value: DatePerhapsTime) -> DateTime<Utc> {
    match value {
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt,
        other => panic!("expected a UTC datetime, got {other:?}"),
    }
}

fn run_pass(store: &mut EventStore, items: Vec<ContentItem>, settings: &SiteSettings) -> sitecal_core::Finalized {
    on_generator_init(store);
    let items: Vec<Arc<ContentItem>> = items
        .into_iter()
        .map(|mut item| {
            on_content_init(&mut item).unwrap();
            Arc::new(item)
        })
        .collect();
    on_generator_finalized(store, &items, settings).unwrap()
}

#[test]
fn calendar_round_trips_through_parser() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut store = EventStore::new();

    let done = run_pass(
        &mut store,
        vec![
            event_item("meetup", "2024-06-01 09:00", "en"),
            ContentItem::new("content/about.md", Metadata::new().with("title", "About")),
        ],
        &settings,
    );

    let path = done.calendar.expect("calendar should be written");
    assert_eq!(path, dir.path().join("calendar/events.ics"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\r\n"));
    assert!(content.contains("METHOD:PUBLISH"));

    let unfolded = unfold(&content);
    let calendar = read_calendar(&unfolded).unwrap();
    let vevents: Vec<_> = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .collect();
    assert_eq!(vevents.len(), 1);
    let vevent = vevents[0];

    let start = DatePerhapsTime::try_from(vevent.find_prop("DTSTART").unwrap()).unwrap();
    assert_eq!(utc(start), Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    let end = DatePerhapsTime::try_from(vevent.find_prop("DTEND").unwrap()).unwrap();
    assert_eq!(utc(end), Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap());

    assert_eq!(vevent.find_prop("SUMMARY").unwrap().val.to_string(), "meetup");
    assert_eq!(vevent.find_prop("UID").unwrap().val.to_string(), "meetup@example.org");
    assert_eq!(vevent.find_prop("LOCATION").unwrap().val.to_string(), "Town hall");
    let description = vevent.find_prop("DESCRIPTION").unwrap().val.to_string();
    assert!(description.contains("Details on"));
    assert!(!description.contains('<'));
}

#[test]
fn listing_is_published_per_language() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.plugins = vec!["i18n_subsites".to_string()];
    let mut store = EventStore::new();

    let done = run_pass(
        &mut store,
        vec![
            event_item("old", "2024-03-01 18:00", "en"),
            event_item("new", "2024-09-01 18:00", "en"),
            event_item("nuovo", "2024-09-02 18:00", "it"),
        ],
        &settings,
    );

    let context = done.listing.to_context().unwrap();
    let en = context[EVENTS_LIST_KEY]["en"].as_array().unwrap();
    assert_eq!(en.len(), 2);
    assert_eq!(en[0]["slug"], "new");
    assert_eq!(en[0]["event_start"], "2024-09-01 18:00");
    assert_eq!(context[EVENTS_LIST_KEY]["it"][0]["slug"], "nuovo");

    // Only the default language goes into the calendar
    let content = std::fs::read_to_string(done.calendar.unwrap()).unwrap();
    assert_eq!(content.matches("BEGIN:VEVENT").count(), 2);
    assert!(!content.contains("nuovo@"));
}

#[test]
fn consecutive_passes_do_not_accumulate() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let mut store = EventStore::new();

    let first = run_pass(&mut store, vec![event_item("a", "2024-06-01 09:00", "en")], &settings);
    assert_eq!(first.listing.len(), 1);

    let second = run_pass(
        &mut store,
        vec![
            event_item("a", "2024-06-01 09:00", "en"),
            event_item("b", "2024-06-02 09:00", "en"),
        ],
        &settings,
    );
    assert_eq!(second.listing.len(), 2);
    assert!(matches!(second.listing, EventListing::All(ref events) if events[0].title() == "<em>b</em>"));
}

#[test]
fn invalid_event_metadata_is_reported() {
    let meta = Metadata::new()
        .with("title", "Broken")
        .with("event-start", "2024-06-01 09:00")
        .with("event-duration", "2x");
    let mut item = ContentItem::new("content/broken.md", meta);

    let err = on_content_init(&mut item).unwrap_err();
    assert!(matches!(err, sitecal_core::SiteCalError::InvalidUnit { .. }));
    assert_eq!(item.event, None);
}
