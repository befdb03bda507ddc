//! Event calendars for static sites.
//!
//! This crate turns event metadata found on content items into:
//! - an iCalendar file with every event of the site (`ics`)
//! - a sorted event listing, optionally per language, for templates (`listing`)
//!
//! Host generators drive it through the three functions in [`hooks`].

pub mod content;
pub mod duration;
pub mod error;
pub mod hooks;
pub mod ics;
pub mod listing;
pub mod markup;
pub mod resolve;
pub mod settings;
pub mod store;
pub mod timestamp;

pub use content::{ContentItem, EventWindow, MetaValue, Metadata};
pub use error::{SiteCalError, SiteCalResult};
pub use hooks::{Finalized, on_content_init, on_generator_finalized, on_generator_init};
pub use listing::{EVENTS_LIST_KEY, EventListing};
pub use settings::SiteSettings;
pub use store::{Event, EventStore};
