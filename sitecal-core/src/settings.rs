//! Site-wide settings consumed from the generator configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::error::{SiteCalError, SiteCalResult};

/// Plugin whose presence turns on per-language partitioning.
pub const I18N_PLUGIN: &str = "i18n_subsites";

pub const DEFAULT_PRODID: &str = "-//sitecal//events//EN";

static DEFAULT_OUTPUT_PATH: &str = "output";

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_prodid() -> String {
    DEFAULT_PRODID.to_string()
}

/// Settings of the site being generated.
///
/// Loaded from a TOML file and `SITECAL_*` environment variables, e.g.
/// `SITECAL_TIMEZONE=Europe/Rome` or `SITECAL_EVENTS__ICS_FNAME=events.ics`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// IANA name of the timezone event times are written in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub site_url: String,

    #[serde(default)]
    pub site_name: String,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Active generator plugins.
    #[serde(default)]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub events: EventsSettings,
}

/// The `[events]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsSettings {
    /// Calendar file name, relative to the output path. Unset or empty
    /// disables the calendar export.
    pub ics_fname: Option<String>,

    #[serde(default = "default_prodid")]
    pub prodid: String,

    /// Overrides plugin-based localization detection when set.
    pub localized: Option<bool>,
}

impl Default for EventsSettings {
    fn default() -> Self {
        EventsSettings {
            ics_fname: None,
            prodid: default_prodid(),
            localized: None,
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            output_path: default_output_path(),
            timezone: default_timezone(),
            site_url: String::new(),
            site_name: String::new(),
            default_lang: default_lang(),
            plugins: Vec::new(),
            events: EventsSettings::default(),
        }
    }
}

impl SiteSettings {
    /// Load settings from `path` (optional file) and the process environment.
    pub fn load(path: &Path) -> SiteCalResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`SiteSettings::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: &Path, env: Option<Map<String, String>>) -> SiteCalResult<Self> {
        let environment = Environment::with_prefix("SITECAL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("plugins")
            .source(env);

        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| SiteCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SiteCalError::Config(e.to_string()))
    }

    /// Output directory with `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.output_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// Where the calendar goes, or `None` when the export is disabled.
    pub fn ics_path(&self) -> Option<PathBuf> {
        self.events
            .ics_fname
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| self.output_dir().join(name))
    }

    /// Whether events are partitioned per language.
    pub fn localization_enabled(&self) -> bool {
        self.events
            .localized
            .unwrap_or_else(|| self.plugins.iter().any(|p| p == I18N_PLUGIN))
    }

    pub fn tz(&self) -> SiteCalResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| SiteCalError::UnknownTimezone(self.timezone.clone()))
    }
}
