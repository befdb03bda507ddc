//! Per-pass collection of resolved events.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::content::{ContentItem, Metadata};
use crate::timestamp::format_timestamp;

/// A content item with a resolved event window.
///
/// Equality is structural: two events are equal when their windows match and
/// their items (metadata included) are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item: Arc<ContentItem>,
}

impl Event {
    /// Build an event from an item; `None` unless the item has been resolved.
    pub fn from_item(item: &Arc<ContentItem>) -> Option<Self> {
        let window = item.event?;
        Some(Event {
            start: window.start,
            end: window.end,
            item: Arc::clone(item),
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.item.metadata
    }

    pub fn title(&self) -> &str {
        self.metadata().display_title()
    }

    pub fn lang(&self) -> Option<&str> {
        self.metadata().lang()
    }

    /// Sort key used for listings.
    pub fn sort_key(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let meta = self.metadata();
        let mut s = serializer.serialize_struct("Event", 8)?;
        s.serialize_field("title", &meta.title())?;
        s.serialize_field("slug", &meta.slug())?;
        s.serialize_field("lang", &meta.lang())?;
        s.serialize_field("location", &meta.location())?;
        s.serialize_field("event_start", &format_timestamp(&self.start))?;
        s.serialize_field("event_end", &format_timestamp(&self.end))?;
        s.serialize_field("source", &self.item.source)?;
        s.serialize_field("metadata", meta)?;
        s.end()
    }
}

/// Events gathered during one generation pass.
///
/// `localized` is a filtered view of `events`: every event in it is also in
/// `events`.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
    localized: BTreeMap<String, Vec<Event>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything collected so far. Called at the start of each pass.
    pub fn reset(&mut self) {
        self.events.clear();
        self.localized.clear();
    }

    /// Add an event for every resolved item not already in the store.
    ///
    /// Returns how many events were added.
    pub fn collect<'a, I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a Arc<ContentItem>>,
    {
        let before = self.events.len();

        for event in items.into_iter().filter_map(Event::from_item) {
            if !self.events.contains(&event) {
                self.events.push(event);
            }
        }

        let added = self.events.len() - before;
        tracing::debug!(added, total = self.events.len(), "Collected events");
        added
    }

    /// Group the collected events by their `lang` metadata.
    ///
    /// The view is rebuilt on every call, and left empty unless `enabled`.
    /// Events without a language are left out of the localized view.
    pub fn partition_by_language(&mut self, enabled: bool) {
        self.localized.clear();
        if !enabled {
            return;
        }

        for event in &self.events {
            match event.lang() {
                Some(lang) => self
                    .localized
                    .entry(lang.to_string())
                    .or_default()
                    .push(event.clone()),
                None => {
                    tracing::debug!(title = event.title(), "Event contains no lang attribute")
                }
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn localized(&self) -> &BTreeMap<String, Vec<Event>> {
        &self.localized
    }

    pub fn is_localized(&self) -> bool {
        !self.localized.is_empty()
    }

    /// Events that go into the calendar file: the default language's subset
    /// when the store is localized, every event otherwise.
    pub fn calendar_events(&self, default_lang: &str) -> &[Event] {
        if self.is_localized() {
            self.localized
                .get(default_lang)
                .map(Vec::as_slice)
                .unwrap_or_default()
        } else {
            &self.events
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::EventWindow;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn event_item(slug: &str, lang: Option<&str>, day: u32) -> Arc<ContentItem> {
        let mut meta = Metadata::new().with("title", slug).with("slug", slug);
        if let Some(lang) = lang {
            meta.insert("lang", lang);
        }
        let mut item = ContentItem::new(format!("content/{slug}.md"), meta);
        item.event = Some(EventWindow {
            start: ts(day, 10),
            end: ts(day, 12),
        });
        Arc::new(item)
    }

    #[test]
    fn test_collect_skips_unresolved_items() {
        let plain = Arc::new(ContentItem::new(
            "content/about.md",
            Metadata::new().with("title", "About"),
        ));
        let items = vec![event_item("a", None, 1), plain];

        let mut store = EventStore::new();
        assert_eq!(store.collect(&items), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.events()[0].title(), "a");
    }

    #[test]
    fn test_collect_dedups_across_calls() {
        let items = vec![event_item("a", None, 1), event_item("b", None, 2)];

        let mut store = EventStore::new();
        assert_eq!(store.collect(&items), 2);
        assert_eq!(store.collect(&items), 0);
        assert_eq!(store.len(), 2);

        // A structurally equal item behind a different handle is a duplicate too
        let copy = Arc::new((*items[0]).clone());
        assert_eq!(store.collect([&copy]), 0);
    }

    #[test]
    fn test_collect_keeps_insertion_order() {
        let items = vec![
            event_item("c", None, 3),
            event_item("a", None, 1),
            event_item("b", None, 2),
        ];

        let mut store = EventStore::new();
        store.collect(&items);
        let titles: Vec<_> = store.events().iter().map(Event::title).collect();
        assert_eq!(titles, ["c", "a", "b"]);
    }

    #[test]
    fn test_reset_starts_fresh() {
        let items = vec![event_item("a", Some("en"), 1)];

        let mut store = EventStore::new();
        store.collect(&items);
        store.partition_by_language(true);
        assert!(store.is_localized());

        store.reset();
        assert!(store.is_empty());
        assert!(!store.is_localized());

        assert_eq!(store.collect(&items), 1);
    }

    #[test]
    fn test_partition_by_language() {
        let items = vec![
            event_item("a", Some("en"), 1),
            event_item("b", Some("it"), 2),
            event_item("c", Some("en"), 3),
            event_item("d", None, 4),
        ];

        let mut store = EventStore::new();
        store.collect(&items);
        store.partition_by_language(true);

        let localized = store.localized();
        assert_eq!(localized.len(), 2);
        let en: Vec<_> = localized["en"].iter().map(Event::title).collect();
        assert_eq!(en, ["a", "c"]);
        assert_eq!(localized["it"].len(), 1);

        // Every localized event is also in the full list
        for event in localized.values().flatten() {
            assert!(store.events().contains(event));
        }
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_partition_disabled_is_noop() {
        let items = vec![event_item("a", Some("en"), 1)];

        let mut store = EventStore::new();
        store.collect(&items);
        store.partition_by_language(false);
        assert!(!store.is_localized());
    }

    #[test]
    fn test_disabling_partition_drops_previous_view() {
        let items = vec![event_item("a", Some("en"), 1), event_item("b", Some("it"), 2)];

        let mut store = EventStore::new();
        store.collect(&items);
        store.partition_by_language(true);
        assert!(store.is_localized());

        store.partition_by_language(false);
        assert!(!store.is_localized());
        assert_eq!(store.calendar_events("en").len(), 2);
    }

    #[test]
    fn test_partition_twice_does_not_duplicate() {
        let items = vec![event_item("a", Some("en"), 1)];

        let mut store = EventStore::new();
        store.collect(&items);
        store.partition_by_language(true);
        store.partition_by_language(true);
        assert_eq!(store.localized()["en"].len(), 1);
    }

    #[test]
    fn test_calendar_events_prefers_default_language() {
        let items = vec![
            event_item("a", Some("en"), 1),
            event_item("b", Some("it"), 2),
            event_item("c", None, 3),
        ];

        let mut store = EventStore::new();
        store.collect(&items);
        assert_eq!(store.calendar_events("en").len(), 3);

        store.partition_by_language(true);
        let titles: Vec<_> = store.calendar_events("it").iter().map(Event::title).collect();
        assert_eq!(titles, ["b"]);
        assert!(store.calendar_events("de").is_empty());
    }

    #[test]
    fn test_event_serializes_for_templates() {
        let item = event_item("launch", Some("en"), 1);
        let event = Event::from_item(&item).unwrap();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["title"], "launch");
        assert_eq!(json["lang"], "en");
        assert_eq!(json["location"], serde_json::Value::Null);
        assert_eq!(json["event_start"], "2024-06-01 10:00");
        assert_eq!(json["event_end"], "2024-06-01 12:00");
        assert_eq!(json["metadata"]["slug"], "launch");
    }
}
