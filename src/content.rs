//! Reading Markdown content files into content items.
//!
//! Files start with a header of `Key: value` lines, ended by the first blank
//! line; the body follows. The body is not rendered: when there is no
//! `Summary` header, the first paragraph is used with its Markdown reduced to
//! plain text.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use sitecal_core::{ContentItem, MetaValue, Metadata};

const EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Header keys holding publication dates.
const DATE_KEYS: [&str; 2] = ["date", "modified"];

/// Load every content file under `dir`, sorted by path.
pub fn load_dir(dir: &Path, default_lang: &str) -> Result<Vec<ContentItem>> {
    let mut paths = Vec::new();
    collect_paths(dir, &mut paths)
        .with_context(|| format!("Could not read content directory {}", dir.display()))?;
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            parse_item(path, &raw, default_lang)
                .with_context(|| format!("Invalid content file {}", path.display()))
        })
        .collect()
}

fn collect_paths(dir: &Path, paths: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_paths(&path, paths)?;
        } else if is_content_file(&path) {
            paths.push(path);
        }
    }
    Ok(())
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Parse one content file.
pub fn parse_item(path: &Path, raw: &str, default_lang: &str) -> Result<ContentItem> {
    let (header, body) = split_header(raw);

    let mut metadata = Metadata::new();
    for (key, value) in header {
        let value = if DATE_KEYS.contains(&key.as_str()) {
            MetaValue::DateTime(parse_date(&value).with_context(|| format!("Bad '{key}' value"))?)
        } else {
            MetaValue::Text(value)
        };
        metadata.insert(key, value);
    }

    if !metadata.contains_key("slug") {
        if let Some(title) = metadata.title() {
            let slug = slug::slugify(title);
            metadata.insert("slug", slug);
        }
    }
    if !metadata.contains_key("lang") {
        metadata.insert("lang", default_lang);
    }

    let summary = match metadata.get_str("summary") {
        Some(summary) => summary.to_string(),
        None => first_paragraph(body),
    };

    Ok(ContentItem::new(path, metadata).with_summary(summary))
}

/// Split `raw` into lower-cased header entries and the body.
fn split_header(raw: &str) -> (Vec<(String, String)>, &str) {
    let mut header = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            return (header, next);
        }
        let Some((key, value)) = line.split_once(':') else {
            // Not a header line: the file has no (more) header
            return (header, rest);
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return (header, rest);
        }

        header.push((key.to_lowercase(), value.trim().to_string()));
        rest = next;
    }

    (header, rest)
}

fn parse_date(value: &str) -> Result<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(NaiveDateTime::from(date));
    }
    bail!("'{value}' is not a date (expected YYYY-MM-DD[ HH:MM[:SS]])")
}

fn first_paragraph(body: &str) -> String {
    let paragraph = body
        .replace("\r\n", "\n")
        .trim_start()
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .lines()
        .map(strip_block_marker)
        .collect::<Vec<_>>()
        .join(" ");
    strip_inline_markdown(&paragraph)
}

/// Drop a leading heading, quote or list marker from a line.
fn strip_block_marker(line: &str) -> &str {
    let line = line.trim();
    let unheaded = line.trim_start_matches('#');
    if unheaded.len() != line.len() && unheaded.starts_with(' ') {
        return unheaded.trim_start();
    }
    for marker in ["> ", "- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    line
}

/// Reduce inline Markdown to its text: links and images keep their label,
/// emphasis and code markers go. `_` inside a word is kept.
fn strip_inline_markdown(text: &str) -> String {
    let delinked = strip_links(text);
    let chars: Vec<char> = delinked.chars().collect();

    let mut out = String::with_capacity(delinked.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '*' | '`' => {}
            '_' => {
                let prev = i.checked_sub(1).map(|j| chars[j]);
                let next = chars.get(i + 1).copied();
                if prev.is_some_and(char::is_alphanumeric) && next.is_some_and(char::is_alphanumeric) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Replace `[label](url)` and `![alt](url)` with the label.
fn strip_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let link = after
            .find("](")
            .and_then(|close| after[close + 2..].find(')').map(|end| (close, close + 2 + end)));
        let Some((close, end)) = link else {
            out.push_str(&rest[..=open]);
            rest = after;
            continue;
        };

        let prefix = &rest[..open];
        out.push_str(prefix.strip_suffix('!').unwrap_or(prefix));
        out.push_str(&after[..close]);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
