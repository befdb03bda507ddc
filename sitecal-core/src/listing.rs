//! Sorted event listings for templates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::{Event, EventStore};

/// Template context key the listing is published under.
pub const EVENTS_LIST_KEY: &str = "events_list";

/// Events as handed to the template renderer, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventListing {
    /// No localization in effect.
    All(Vec<Event>),
    /// Language code to that language's events.
    ByLanguage(BTreeMap<String, Vec<Event>>),
}

impl EventListing {
    /// Build the listing from a store, per language when it is localized.
    pub fn from_store(store: &EventStore) -> Self {
        if store.is_localized() {
            let by_lang = store
                .localized()
                .iter()
                .map(|(lang, events)| (lang.clone(), sorted(events)))
                .collect();
            EventListing::ByLanguage(by_lang)
        } else {
            EventListing::All(sorted(store.events()))
        }
    }

    /// Events for `lang`; the whole list when not localized.
    pub fn for_lang(&self, lang: &str) -> &[Event] {
        match self {
            EventListing::All(events) => events,
            EventListing::ByLanguage(by_lang) => {
                by_lang.get(lang).map(Vec::as_slice).unwrap_or_default()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EventListing::All(events) => events.len(),
            EventListing::ByLanguage(by_lang) => by_lang.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap the listing in a template context object under [`EVENTS_LIST_KEY`].
    pub fn to_context(&self) -> serde_json::Result<serde_json::Value> {
        let mut context = serde_json::Map::new();
        context.insert(EVENTS_LIST_KEY.to_string(), serde_json::to_value(self)?);
        Ok(serde_json::Value::Object(context))
    }
}

/// Sort events newest first by (start, end).
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

fn sorted(events: &[Event]) -> Vec<Event> {
    let mut events = events.to_vec();
    sort_events(&mut events);
    events
}
