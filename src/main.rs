mod commands;
mod content;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitecal_core::SiteSettings;
use tracing_subscriber::EnvFilter;

const LOCAL_CONFIG: &str = "sitecal.toml";

#[derive(Parser)]
#[command(name = "sitecal")]
#[command(about = "Build calendars and event listings from static-site content")]
struct Cli {
    /// Site settings file (default: ./sitecal.toml, then ~/.config/sitecal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a generation pass and write the calendar
    Build {
        /// Directory holding the Markdown content
        content_dir: PathBuf,

        /// Also write the published listing to this JSON file
        #[arg(long)]
        context: Option<PathBuf>,

        /// Skip items whose event metadata is invalid instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Print the events, newest first
    List {
        content_dir: PathBuf,

        /// Only show events in this language
        #[arg(long)]
        lang: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config_path = resolve_config_path(cli.config)?;
    tracing::debug!(path = %config_path.display(), "Loading settings");
    let settings = SiteSettings::load(&config_path)
        .with_context(|| format!("Could not load settings from {}", config_path.display()))?;

    match cli.command {
        Commands::Build {
            content_dir,
            context,
            skip_invalid,
        } => commands::build::run(&settings, &content_dir, context.as_deref(), skip_invalid),
        Commands::List { content_dir, lang } => {
            commands::list::run(&settings, &content_dir, lang.as_deref())
        }
    }
}

/// An explicit path wins; otherwise `./sitecal.toml` if present, else the
/// user config file. Missing files fall back to default settings.
fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Ok(local);
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("sitecal").join("config.toml"))
}
