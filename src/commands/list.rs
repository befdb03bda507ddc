use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use sitecal_core::{Event, EventListing, EventStore, SiteSettings};

use super::ResolvedContent;
use crate::render::Render;

pub fn run(settings: &SiteSettings, content_dir: &Path, lang: Option<&str>) -> Result<()> {
    let content = ResolvedContent::load(settings, content_dir, false)?;

    let mut store = EventStore::new();
    store.collect(&content.items);
    store.partition_by_language(settings.localization_enabled());
    let listing = EventListing::from_store(&store);

    let sections = sections(&listing, lang);
    if sections.iter().all(|(_, events)| events.is_empty()) {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for (i, (heading, events)) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if let Some(heading) = heading {
            println!("{}", heading.bold());
        }
        for event in *events {
            println!("  {}", event.render());
        }
    }

    Ok(())
}

/// Group the listing for display: one section per language when localized,
/// a single untitled section otherwise.
fn sections<'a>(listing: &'a EventListing, lang: Option<&str>) -> Vec<(Option<String>, &'a [Event])> {
    match (listing, lang) {
        (_, Some(lang)) => vec![(None, listing.for_lang(lang))],
        (EventListing::All(events), None) => vec![(None, events.as_slice())],
        (EventListing::ByLanguage(by_lang), None) => by_lang
            .iter()
            .map(|(lang, events)| (Some(format!("[{lang}]")), events.as_slice()))
            .collect(),
    }
}
