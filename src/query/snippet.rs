//! Snippet shaping
//!
//! Turns a raw highlight fragment into a short display line: a rune-bounded
//! window anchored at the last highlighted term, cleaned of markers and noise
//! characters, escaped for MarkdownV2 and prefixed with a media glyph.

use once_cell::sync::Lazy;
use regex::Regex;

const HIGHLIGHT_OPEN: &str = "<em>";
const HIGHLIGHT_CLOSE: &str = "</em>";

/// Window used when the fragment carries no highlight marker at all.
const UNANCHORED_RUNES: usize = 20;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Strip highlight markers and the cleanup set (hash signs, full-width commas,
/// colons), and collapse all whitespace away.
fn clean(s: &str) -> String {
    let s = s
        .replace(HIGHLIGHT_OPEN, "")
        .replace(HIGHLIGHT_CLOSE, "")
        .replace('#', "")
        .replace('，', "")
        .replace(':', "");
    WHITESPACE.replace_all(&s, "").into_owned()
}

fn take_runes(s: &str, len: usize) -> String {
    s.chars().take(len).collect()
}

/// Compute the display window for one highlight fragment.
///
/// Anchored at the *last* highlight marker: the highlighted term and what
/// follows it fill the window first; any remainder is padded backward from the
/// cleaned prefix, truncating the prefix if it would start mid-window.
pub(crate) fn display_window(fragment: &str, window: usize) -> String {
    let Some(anchor) = fragment.rfind(HIGHLIGHT_OPEN) else {
        return take_runes(&clean(fragment), UNANCHORED_RUNES);
    };

    let prefix = clean(&fragment[..anchor]);
    let suffix = clean(&fragment[anchor..]);

    let suffix_runes: Vec<char> = suffix.chars().collect();
    if suffix_runes.len() >= window {
        return suffix_runes[..window].iter().collect();
    }

    let needed = window - suffix_runes.len();
    let prefix_runes: Vec<char> = prefix.chars().collect();
    let start = prefix_runes.len().saturating_sub(needed);

    prefix_runes[start..]
        .iter()
        .chain(suffix_runes.iter())
        .collect()
}

/// Escape the MarkdownV2 reserved set with a backslash.
pub(crate) fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
            | '|' | '{' | '}' | '.' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Media glyph by priority: video > photo > voice > file > plain text.
pub(crate) fn media_glyph(photos: i64, videos: i64, voices: i64, files: i64) -> &'static str {
    if videos > 0 {
        "🎬"
    } else if photos > 0 {
        "🖼️"
    } else if voices > 0 {
        "🎧"
    } else if files > 0 {
        "📁"
    } else {
        "💬"
    }
}
