//! Content items as handed over by the site generator.
//!
//! The generator owns discovery and rendering; this module only models the
//! parts the event pipeline reads: the metadata mapping, the rendered summary
//! and the event window attached during resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

/// Placeholder substituted with the site URL in rendered summaries.
pub const SITEURL_PLACEHOLDER: &str = "{siteurl}";

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<NaiveDateTime> for MetaValue {
    fn from(dt: NaiveDateTime) -> Self {
        MetaValue::DateTime(dt)
    }
}

/// Per-item metadata mapping (string keys, as parsed by the generator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy when constructing items in adapters and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Text value for `key`; `None` if absent or not text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(MetaValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Datetime value for `key`; `None` if absent or not a datetime.
    pub fn get_datetime(&self, key: &str) -> Option<NaiveDateTime> {
        match self.0.get(key) {
            Some(MetaValue::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// Title for log and error messages.
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or("<untitled>")
    }

    pub fn slug(&self) -> Option<&str> {
        self.get_str("slug")
    }

    pub fn lang(&self) -> Option<&str> {
        self.get_str("lang")
    }

    /// `event-location` wins over the generic `location` key.
    pub fn location(&self) -> Option<&str> {
        self.get_str("event-location")
            .or_else(|| self.get_str("location"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Metadata(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Resolved start/end of an event, naive local time of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A content item (article or page) of the site.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    /// Where the generator read the item from; its stable identity.
    pub source: PathBuf,
    pub metadata: Metadata,
    /// Rendered summary as HTML.
    pub summary_html: String,
    /// Set by the resolver when the item carries event metadata.
    pub event: Option<EventWindow>,
}

impl ContentItem {
    pub fn new(source: impl Into<PathBuf>, metadata: Metadata) -> Self {
        ContentItem {
            source: source.into(),
            metadata,
            summary_html: String::new(),
            event: None,
        }
    }

    pub fn with_summary(mut self, summary_html: impl Into<String>) -> Self {
        self.summary_html = summary_html.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn event_start(&self) -> Option<NaiveDateTime> {
        self.event.map(|w| w.start)
    }

    pub fn event_end(&self) -> Option<NaiveDateTime> {
        self.event.map(|w| w.end)
    }

    /// Rendered summary with links made absolute against `site_url`.
    pub fn summary(&self, site_url: &str) -> String {
        self.summary_html
            .replace(SITEURL_PLACEHOLDER, site_url.trim_end_matches('/'))
    }
}
