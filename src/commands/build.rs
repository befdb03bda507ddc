use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use sitecal_core::{EventStore, SiteSettings, on_generator_finalized, on_generator_init};

use super::ResolvedContent;

pub fn run(
    settings: &SiteSettings,
    content_dir: &Path,
    context: Option<&Path>,
    skip_invalid: bool,
) -> Result<()> {
    let content = ResolvedContent::load(settings, content_dir, skip_invalid)?;

    for (source, error) in &content.skipped {
        println!("{} {} {}", "!".yellow(), source.display(), error.to_string().dimmed());
    }

    let mut store = EventStore::new();
    on_generator_init(&mut store);
    let finalized = on_generator_finalized(&mut store, &content.items, settings)
        .context("Could not finish the generation pass")?;

    println!(
        "Collected {} from {} items",
        pluralize("event", finalized.listing.len()).bold(),
        content.items.len()
    );

    match &finalized.calendar {
        Some(path) => println!("{} {}", "✓".green(), path.display()),
        None => println!("{}", "Calendar export disabled (events.ics_fname not set)".dimmed()),
    }

    if let Some(path) = context {
        let json = serde_json::to_string_pretty(&finalized.listing.to_context()?)?;
        std::fs::write(path, json)
            .with_context(|| format!("Could not write {}", path.display()))?;
        println!("{} {}", "✓".green(), path.display());
    }

    Ok(())
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_site(dir: &Path) {
        let content = dir.join("content");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(
            content.join("meetup.md"),
            "Title: Meetup\nDate: 2024-05-01\nEvent-Start: 2024-06-01 19:00\nEvent-Duration: 2h\n\nBring snacks.\n",
        )
        .unwrap();
        std::fs::write(
            content.join("broken.md"),
            "Title: Broken\nDate: 2024-05-01\nEvent-Start: 2024-06-01 19:00\n\nNo end.\n",
        )
        .unwrap();
    }

    fn settings(dir: &Path) -> SiteSettings {
        let mut settings = SiteSettings {
            output_path: dir.join("output"),
            site_name: "example.org".to_string(),
            ..Default::default()
        };
        settings.events.ics_fname = Some("events.ics".to_string());
        settings
    }

    #[test]
    fn test_invalid_item_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());

        let err = run(&settings(dir.path()), &dir.path().join("content"), None, false).unwrap_err();
        assert!(format!("{err:#}").contains("broken.md"));
        assert!(!dir.path().join("output/events.ics").exists());
    }

    #[test]
    fn test_skip_invalid_writes_calendar_and_context() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());
        let context = dir.path().join("context.json");

        run(&settings(dir.path()), &dir.path().join("content"), Some(&context), true).unwrap();

        let ics = std::fs::read_to_string(dir.path().join("output/events.ics")).unwrap();
        assert!(ics.contains("UID:meetup@example.org"));
        assert!(!ics.contains("broken"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&context).unwrap()).unwrap();
        assert_eq!(json["events_list"][0]["title"], "Meetup");
        assert_eq!(json["events_list"][0]["event_end"], "2024-06-01 21:00");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("event", 1), "1 event");
        assert_eq!(pluralize("event", 0), "0 events");
    }
}
