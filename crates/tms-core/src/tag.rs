//! Inline tier marker embedded in markdown documents.
//!
//! The marker is an HTML comment, `<!-- @cortex-tms-tier HOT -->`. Reads are
//! case-insensitive and tolerate any whitespace inside the delimiters; writes
//! always emit the canonical upper-case form.

use crate::tier::Tier;
use regex::Regex;
use std::sync::OnceLock;

pub const TAG_KEYWORD: &str = "@cortex-tms-tier";

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static FRONT_MATTER_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"(?i)<!--\s*@cortex-tms-tier\s+(HOT|WARM|COLD)\s*-->").unwrap()
    })
}

fn front_matter_re() -> &'static Regex {
    FRONT_MATTER_RE.get_or_init(|| Regex::new(r"(?s)\A---\r?\n.*?\r?\n---\r?\n").unwrap())
}

/// Canonical tag line for `tier`, without a trailing newline.
pub fn format_tag(tier: Tier) -> String {
    format!("<!-- {TAG_KEYWORD} {tier} -->")
}

/// Return the tier declared by the first tag in `content`, if any.
pub fn read_tag(content: &str) -> Option<Tier> {
    let caps = tag_re().captures(content)?;
    caps.get(1).and_then(|m| m.as_str().parse().ok())
}

/// Insert or update the tier tag.
///
/// An existing tag is replaced in place. Otherwise the tag goes on its own
/// line directly after a leading front-matter block, or at the very top.
pub fn write_tag(content: &str, tier: Tier) -> String {
    let tag = format_tag(tier);

    if let Some(m) = tag_re().find(content) {
        let mut out = String::with_capacity(content.len() + 4);
        out.push_str(&content[..m.start()]);
        out.push_str(&tag);
        out.push_str(&content[m.end()..]);
        return out;
    }

    let insert_at = front_matter_re().find(content).map(|m| m.end()).unwrap_or(0);
    let mut out = String::with_capacity(content.len() + tag.len() + 1);
    out.push_str(&content[..insert_at]);
    out.push_str(&tag);
    out.push('\n');
    out.push_str(&content[insert_at..]);
    out
}

/// Remove the first tier tag, together with its line break when the tag
/// occupies a whole line.
pub fn strip_tag(content: &str) -> String {
    let Some(m) = tag_re().find(content) else {
        return content.to_string();
    };
    let line_start = content[..m.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let own_line = content[line_start..m.start()].trim().is_empty();
    let rest = &content[m.end()..];
    let line_break = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        0
    };

    let mut out = String::with_capacity(content.len());
    if own_line && (line_break > 0 || rest.is_empty()) {
        out.push_str(&content[..line_start]);
        out.push_str(&rest[line_break..]);
    } else {
        out.push_str(&content[..m.start()]);
        out.push_str(rest);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
