//! Terminal rendering for sitecal types.
//!
//! Extension traits that add colored output to sitecal-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use sitecal_core::Event;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!("{} {}", render_window(self).dimmed(), self.title().bold());
        if let Some(location) = self.metadata().location() {
            line.push_str(&format!(" {}", format!("@ {location}").cyan()));
        }
        line
    }
}

/// Format an event's window, e.g. "2024-06-01 19:00-21:00" or
/// "2024-06-01 19:00 → 2024-06-02 02:00" when it spans days.
fn render_window(event: &Event) -> String {
    let start = event.start.format("%Y-%m-%d %H:%M");
    if event.start.date() == event.end.date() {
        format!("{}-{}", start, event.end.format("%H:%M"))
    } else {
        format!("{} → {}", start, event.end.format("%Y-%m-%d %H:%M"))
    }
}
