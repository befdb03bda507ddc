pub mod build;
pub mod list;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sitecal_core::{ContentItem, SiteCalError, SiteSettings, on_content_init};

use crate::content;

/// Content of a site after event resolution, loaded once per command.
pub struct ResolvedContent {
    pub items: Vec<Arc<ContentItem>>,
    /// Items dropped because their event metadata did not resolve.
    pub skipped: Vec<(PathBuf, SiteCalError)>,
}

impl ResolvedContent {
    /// Load every item of `content_dir` and resolve its event window.
    ///
    /// An invalid item aborts the load unless `skip_invalid` is set, in which
    /// case it is left out of the pass and reported in `skipped`.
    pub fn load(settings: &SiteSettings, content_dir: &Path, skip_invalid: bool) -> Result<Self> {
        let loaded = content::load_dir(content_dir, &settings.default_lang)?;

        let mut items = Vec::with_capacity(loaded.len());
        let mut skipped = Vec::new();

        for mut item in loaded {
            match on_content_init(&mut item) {
                Ok(_) => items.push(Arc::new(item)),
                Err(e) if skip_invalid => {
                    tracing::warn!(source = %item.source.display(), error = %e, "Skipping item");
                    skipped.push((item.source, e));
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Invalid event metadata in {}", item.source.display())
                    });
                }
            }
        }

        Ok(ResolvedContent { items, skipped })
    }
}
