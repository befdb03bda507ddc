//! HTML to plain text for calendar fields.

use crate::error::{SiteCalError, SiteCalResult};

/// Wide enough that html2text never wraps a line.
const RENDER_WIDTH: usize = 10_000;

/// Strip tags and decode entities, collapsing whitespace to single spaces.
pub fn strip_tags(html: &str) -> SiteCalResult<String> {
    if !html.contains(['<', '&']) {
        return Ok(collapse_whitespace(html));
    }

    let text = html2text::config::plain_no_decorate()
        .string_from_read(html.as_bytes(), RENDER_WIDTH)
        .map_err(|e| SiteCalError::Markup(e.to_string()))?;

    Ok(collapse_whitespace(&text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(strip_tags("Rust Night").unwrap(), "Rust Night");
        assert_eq!(strip_tags("  Rust \n Night ").unwrap(), "Rust Night");
        assert_eq!(strip_tags("").unwrap(), "");
    }

    #[test]
    fn test_strips_tags() {
        assert_eq!(
            strip_tags("<p>Join us for <em>Rust</em> Night</p>").unwrap(),
            "Join us for Rust Night"
        );
    }

    #[test]
    fn test_paragraphs_become_spaces() {
        assert_eq!(
            strip_tags("<p>First part.</p>\n<p>Second part.</p>").unwrap(),
            "First part. Second part."
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(strip_tags("Tom &amp; Jerry").unwrap(), "Tom & Jerry");
    }
}
