use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static GROUP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^S\d+\.GR\d+\s*").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse HTML entity leftovers and whitespace runs, trim.
pub fn clean_text(raw: &str) -> String {
    let s = raw
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");
    WS_RE.replace_all(&s, " ").trim().to_string()
}

/// Canonical subject label: semester/group prefix stripped, entities and
/// whitespace collapsed.
pub fn normalize_subject(raw: &str) -> String {
    let cleaned = clean_text(raw);
    GROUP_PREFIX_RE.replace(&cleaned, "").trim().to_string()
}

/// Per-run duplicate suppression, case-insensitive, first occurrence wins.
/// The portal templates render the same subject in more than one structural
/// location, so later repeats must be dropped silently.
#[derive(Debug, Default)]
pub struct SeenNames(HashSet<String>);

impl SeenNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name was already accepted in this run.
    pub fn insert(&mut self, name: &str) -> bool {
        self.0.insert(name.to_lowercase())
    }
}

// ── Tests ──
