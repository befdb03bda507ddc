//! Generator lifecycle entry points.
//!
//! A host adapter calls these in order for every generation pass:
//! `on_generator_init`, then `on_content_init` for each content item, then
//! `on_generator_finalized` once all items are known.

use std::path::PathBuf;
use std::sync::Arc;

use crate::content::{ContentItem, EventWindow};
use crate::error::SiteCalResult;
use crate::ics::export_calendar;
use crate::listing::EventListing;
use crate::resolve::resolve_event;
use crate::settings::SiteSettings;
use crate::store::EventStore;

/// What a finished pass produced.
#[derive(Debug)]
pub struct Finalized {
    /// Listing to publish under [`crate::listing::EVENTS_LIST_KEY`].
    pub listing: EventListing,
    /// Calendar file written, if the export is enabled.
    pub calendar: Option<PathBuf>,
}

/// Start of a generation pass: forget the previous pass's events.
pub fn on_generator_init(store: &mut EventStore) {
    store.reset();
}

/// A content item was initialized: resolve its event window.
pub fn on_content_init(item: &mut ContentItem) -> SiteCalResult<Option<EventWindow>> {
    resolve_event(item)
}

/// All content of the pass is ready: collect, partition, export and publish.
pub fn on_generator_finalized<'a, I>(
    store: &mut EventStore,
    items: I,
    settings: &SiteSettings,
) -> SiteCalResult<Finalized>
where
    I: IntoIterator<Item = &'a Arc<ContentItem>>,
{
    store.collect(items);
    store.partition_by_language(settings.localization_enabled());

    let calendar = export_calendar(store.calendar_events(&settings.default_lang), settings)?;
    let listing = EventListing::from_store(store);

    Ok(Finalized { listing, calendar })
}
