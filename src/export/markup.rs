/*!
 * Line-level markup recognition for chapter content.
 *
 * Chapter bodies are stored as lightweight Markdown. Both export formats
 * classify each line the same way before inline runs are split.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown images `![alt](url)`
static MARKDOWN_IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap()
});

/// HTML image tags
static HTML_IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<img\b[^>]*>").unwrap()
});

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})\s+(.*)$").unwrap()
});

static BULLET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*+]\s+(.*)$").unwrap()
});

static NUMBERED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})[.)]\s+(.*)$").unwrap()
});

static TABLE_SEPARATOR_CELL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:?-+:?$").unwrap()
});

static LEADING_SYMBOLS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#+|>)\s*").unwrap()
});

/// What a single source line of chapter content represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Whitespace only
    Blank,
    /// `#`..`######` heading
    Heading {
        /// Number of leading `#`
        level: usize,
        /// Heading text without the markers
        text: &'a str,
    },
    /// `- `, `* ` or `+ ` list item
    Bullet(&'a str),
    /// `1. ` or `1) ` list item
    Numbered {
        /// Item number as written
        number: &'a str,
        /// Item text
        text: &'a str,
    },
    /// `> ` block quote
    Quote(&'a str),
    /// Pipe-table row split into trimmed cells
    TableRow(Vec<&'a str>),
    /// Pipe-table header separator such as `|---|:--:|`
    TableSeparator,
    /// Anything else
    Text(&'a str),
}

fn table_cells(line: &str) -> Option<Vec<&str>> {
    let inner = line.strip_prefix('|')?;
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    Some(inner.split('|').map(str::trim).collect())
}

/// Classify one line of chapter content
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if let Some(cells) = table_cells(trimmed) {
        if cells.iter().all(|c| TABLE_SEPARATOR_CELL_REGEX.is_match(c)) {
            return LineKind::TableSeparator;
        }
        return LineKind::TableRow(cells);
    }

    if let Some(caps) = HEADING_REGEX.captures(trimmed) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len());
        let text = caps.get(2).map_or("", |m| m.as_str()).trim();
        return LineKind::Heading { level, text };
    }

    if let Some(caps) = BULLET_REGEX.captures(trimmed) {
        // A line such as "*emphasis* text" is not a bullet
        let text = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Bullet(text.trim());
    }

    if let Some(caps) = NUMBERED_REGEX.captures(trimmed) {
        return LineKind::Numbered {
            number: caps.get(1).map_or("", |m| m.as_str()),
            text: caps.get(2).map_or("", |m| m.as_str()).trim(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        return LineKind::Quote(rest.trim());
    }

    LineKind::Text(trimmed)
}

/// Remove Markdown and HTML images
pub fn strip_images(text: &str) -> String {
    let text = MARKDOWN_IMAGE_REGEX.replace_all(text, "");
    HTML_IMAGE_REGEX.replace_all(&text, "").into_owned()
}

/// Remove raw markup symbols that would otherwise be printed verbatim
pub fn strip_markup_symbols(text: &str) -> String {
    let text = LEADING_SYMBOLS_REGEX.replace(text.trim(), "");
    text.replace('`', "")
}
